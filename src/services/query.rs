use url::Url;

/// Query parameters the backend recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Limit,
    Offset,
    UserEmail,
    UserId,
    TransactionId,
    RazorpayPaymentId,
    RazorpayOrderId,
    PaymentStatus,
    StartDate,
    EndDate,
    BookingId,
    WorkshopId,
    Days,
    Date,
}

impl Filter {
    pub fn key(&self) -> &'static str {
        match self {
            Filter::Limit => "limit",
            Filter::Offset => "offset",
            Filter::UserEmail => "user_email",
            Filter::UserId => "user_id",
            Filter::TransactionId => "transaction_id",
            Filter::RazorpayPaymentId => "razorpay_payment_id",
            Filter::RazorpayOrderId => "razorpay_order_id",
            Filter::PaymentStatus => "payment_status",
            Filter::StartDate => "start_date",
            Filter::EndDate => "end_date",
            Filter::BookingId => "booking_id",
            Filter::WorkshopId => "workshop_id",
            Filter::Days => "days",
            Filter::Date => "date",
        }
    }
}

/// Ordered, encoded-on-apply query string builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(Filter, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: Filter, value: impl ToString) -> Self {
        self.set(filter, value);
        self
    }

    /// Replaces any earlier value for the same filter.
    pub fn set(&mut self, filter: Filter, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(f, _)| *f == filter) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((filter, value)),
        }
    }

    /// Sets the filter only when the value has non-whitespace content.
    pub fn set_trimmed(&mut self, filter: Filter, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.set(filter, v);
        }
    }

    pub fn get(&self, filter: Filter) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(f, _)| *f == filter)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn apply(&self, mut url: Url) -> Url {
        if !self.pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (filter, value) in &self.pairs {
                query.append_pair(filter.key(), value);
            }
        }
        url
    }
}
