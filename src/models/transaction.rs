use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

use crate::utils::CsvRecord;

/// Payment transaction as returned by `payments/transactions`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct Transaction {
    pub transaction_id: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub subtotal: Option<f64>,
    pub booking_fee: Option<f64>,
    pub total_amount: Option<f64>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub error_code: Option<String>,
    pub error_reason: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Info,
    Default,
}

impl StatusTone {
    pub fn for_status(status: Option<&str>) -> Self {
        match status.map(str::to_lowercase).as_deref() {
            Some("success" | "completed" | "paid") => StatusTone::Success,
            Some("pending" | "initiated") => StatusTone::Warning,
            Some("failed" | "cancelled") => StatusTone::Error,
            Some("refunded") => StatusTone::Info,
            _ => StatusTone::Default,
        }
    }
}

/// Indian-grouped rupee amount with two decimals, e.g. `₹1,23,456.50`.
pub fn format_amount(amount: Option<f64>) -> String {
    let Some(amount) = amount else {
        return "N/A".to_string();
    };

    let rendered = format!("{:.2}", amount.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let grouped = if whole.len() <= 3 {
        whole.to_string()
    } else {
        let (head, tail) = whole.split_at(whole.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, fraction)
}

/// Table row handed to the transactions view.
#[derive(Debug, Serialize, Clone, JsonSchema)]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub tone: StatusTone,
    pub subtotal_display: String,
    pub booking_fee_display: String,
    pub total_display: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        TransactionRow {
            tone: StatusTone::for_status(transaction.payment_status.as_deref()),
            subtotal_display: format_amount(transaction.subtotal),
            booking_fee_display: format_amount(transaction.booking_fee),
            total_display: format_amount(transaction.total_amount),
            transaction: transaction.clone(),
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvRecord for Transaction {
    const HEADERS: &'static [&'static str] = &[
        "Transaction ID",
        "User ID",
        "User Email",
        "Payment Status",
        "Payment Method",
        "Subtotal",
        "Booking Fee",
        "Total Amount",
        "Razorpay Payment ID",
        "Razorpay Order ID",
        "Error Code",
        "Error Reason",
        "Created At",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            text(&self.transaction_id),
            text(&self.user_id),
            text(&self.user_email),
            text(&self.payment_status),
            text(&self.payment_method),
            number(self.subtotal),
            number(self.booking_fee),
            number(self.total_amount),
            text(&self.razorpay_payment_id),
            text(&self.razorpay_order_id),
            text(&self.error_code),
            text(&self.error_reason),
            text(&self.created_at),
        ]
    }
}
