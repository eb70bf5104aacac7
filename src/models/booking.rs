use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::utils::CsvRecord;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct BookingItem {
    pub variant_description: Option<String>,
    pub subvariant_description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub quantity: Option<u32>,
    pub subtotal: Option<f64>,
}

/// Workshop booking as returned by the payments endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct WorkshopBooking {
    pub booking_id: String,
    pub workshop_id: String,
    pub user_id: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    pub created_at: Option<String>,
    pub total_amount: Option<f64>,
    pub items: Option<Vec<BookingItem>>,
}

impl WorkshopBooking {
    pub fn item_count(&self) -> usize {
        self.items.as_ref().map(Vec::len).unwrap_or(0)
    }
}

impl CsvRecord for WorkshopBooking {
    const HEADERS: &'static [&'static str] = &[
        "Booking ID",
        "Buyer Name",
        "Buyer Email",
        "Buyer Phone",
        "Workshop ID",
        "User ID",
        "Created At",
        "Total Amount",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.booking_id.clone(),
            self.buyer_name.clone().unwrap_or_default(),
            self.buyer_email.clone().unwrap_or_default(),
            self.buyer_phone.clone().unwrap_or_default(),
            self.workshop_id.clone(),
            self.user_id.clone().unwrap_or_default(),
            self.created_at.clone().unwrap_or_default(),
            self.total_amount.map(|v| format!("{:.2}", v)).unwrap_or_default(),
        ]
    }
}

/// Free-trial bookings are schemaless documents; every field is shown as-is.
pub type FreeTrialBooking = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum FreeTrialFilter {
    #[field(value = "email_learner")]
    EmailLearner,
    #[field(value = "email_studio")]
    EmailStudio,
    #[field(value = "name_studio")]
    NameStudio,
    #[field(value = "name_class")]
    NameClass,
}

impl FreeTrialFilter {
    /// Document field the filter matches against.
    pub fn field(&self) -> &'static str {
        match self {
            FreeTrialFilter::EmailLearner => "email_learner",
            FreeTrialFilter::EmailStudio => "email_studio",
            FreeTrialFilter::NameStudio => "name_studio",
            FreeTrialFilter::NameClass => "name_class",
        }
    }
}

/// How a workshop booking lookup is keyed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum BookingLookup {
    #[field(value = "booking_id")]
    BookingId,
    #[field(value = "user_id")]
    UserId,
    #[field(value = "workshop_id")]
    WorkshopId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_tolerates_sparse_payload() {
        let booking: WorkshopBooking = serde_json::from_value(serde_json::json!({
            "booking_id": "bk_1",
            "workshop_id": "ws_1",
            "items": [{ "quantity": 2, "subtotal": 500.0 }],
        }))
        .expect("deserialize");

        assert_eq!(booking.item_count(), 1);
        assert_eq!(booking.buyer_name, None);
    }

    #[test]
    fn csv_row_matches_header_width() {
        let booking = WorkshopBooking {
            booking_id: "bk_1".into(),
            workshop_id: "ws_1".into(),
            total_amount: Some(499.0),
            ..Default::default()
        };
        let fields = booking.fields();
        assert_eq!(fields.len(), WorkshopBooking::HEADERS.len());
        assert_eq!(fields[7], "499.00");
    }
}
