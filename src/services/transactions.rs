use chrono::NaiveDate;
use log::{error, info};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::models::{Transaction, TransactionRow};
use crate::services::backend::{ensure_success, field};
use crate::services::dashboard::Dashboard;
use crate::services::query::{Filter, QueryParams};
use crate::utils::csv_export::{self, CsvFile};
use crate::utils::validation::{non_blank, parse_date};
use crate::utils::DashboardError;

pub const PAGE_SIZE: u64 = 50;

const FETCH_FAILED: &str = "Failed to fetch transactions";
const NO_RESULTS: &str = "No transactions found for the given criteria";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSearchField {
    #[default]
    #[field(value = "email")]
    #[serde(rename = "email")]
    UserEmail,
    #[field(value = "user_id")]
    UserId,
    #[field(value = "transaction_id")]
    TransactionId,
    #[field(value = "razorpay_payment_id")]
    RazorpayPaymentId,
    #[field(value = "razorpay_order_id")]
    RazorpayOrderId,
}

impl TransactionSearchField {
    pub fn filter(&self) -> Filter {
        match self {
            TransactionSearchField::UserEmail => Filter::UserEmail,
            TransactionSearchField::UserId => Filter::UserId,
            TransactionSearchField::TransactionId => Filter::TransactionId,
            TransactionSearchField::RazorpayPaymentId => Filter::RazorpayPaymentId,
            TransactionSearchField::RazorpayOrderId => Filter::RazorpayOrderId,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, FromFormField)]
pub enum PaymentStatusFilter {
    #[default]
    #[serde(rename = "all")]
    #[field(value = "all")]
    All,
    Success,
    Pending,
    Failed,
    Refunded,
}

impl PaymentStatusFilter {
    /// Value sent as `payment_status`; "all" sends nothing.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            PaymentStatusFilter::All => None,
            PaymentStatusFilter::Success => Some("Success"),
            PaymentStatusFilter::Pending => Some("Pending"),
            PaymentStatusFilter::Failed => Some("Failed"),
            PaymentStatusFilter::Refunded => Some("Refunded"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionFilters {
    #[serde(default)]
    pub search_field: TransactionSearchField,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub payment_status: PaymentStatusFilter,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl TransactionFilters {
    pub fn params(&self, page: u64) -> Result<QueryParams, DashboardError> {
        let mut params = QueryParams::new()
            .with(Filter::Limit, PAGE_SIZE)
            .with(Filter::Offset, (page.max(1) - 1) * PAGE_SIZE);

        params.set_trimmed(self.search_field.filter(), Some(&self.query));
        if let Some(status) = self.payment_status.param() {
            params.set(Filter::PaymentStatus, status);
        }
        if let Some(start) = non_blank(self.start_date.as_deref()) {
            params.set(Filter::StartDate, parse_date(start)?.format("%Y-%m-%d"));
        }
        if let Some(end) = non_blank(self.end_date.as_deref()) {
            params.set(Filter::EndDate, parse_date(end)?.format("%Y-%m-%d"));
        }
        Ok(params)
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TransactionsView {
    pub environment: Environment,
    pub filters: TransactionFilters,
    pub page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub transactions: Vec<TransactionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Paged, filterable transaction listing.
#[derive(Debug, Default)]
pub struct TransactionsScreen {
    environment: Environment,
    filters: TransactionFilters,
    page: u64,
    total_count: u64,
    transactions: Vec<Transaction>,
    message: Option<String>,
}

impl TransactionsScreen {
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(PAGE_SIZE)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// First visit loads page 1.
    pub async fn ensure_loaded(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        if self.page > 0 {
            return Ok(());
        }
        self.fetch(dashboard, 1).await
    }

    pub async fn fetch(&mut self, dashboard: &Dashboard, page: u64) -> Result<(), DashboardError> {
        let page = page.max(1);
        let params = self.filters.params(page)?;
        self.page = page;
        self.message = None;

        let result = dashboard
            .get(self.environment, &["payments", "transactions"], &params)
            .await
            .and_then(|body| ensure_success(body, FETCH_FAILED))
            .and_then(|body| {
                let transactions: Vec<Transaction> = field(&body, "transactions")?;
                let total_count: u64 = field(&body, "total_count")?;
                Ok((transactions, total_count))
            });

        match result {
            Ok((transactions, total_count)) => {
                info!(
                    "Fetched {} of {} transactions from {}",
                    transactions.len(),
                    total_count,
                    self.environment
                );
                if transactions.is_empty() {
                    self.message = Some(NO_RESULTS.to_string());
                }
                self.transactions = transactions;
                self.total_count = total_count;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching transactions: {}", e);
                self.transactions.clear();
                self.total_count = 0;
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Applies new filters and loads page 1.
    pub async fn search(
        &mut self,
        dashboard: &Dashboard,
        filters: TransactionFilters,
    ) -> Result<(), DashboardError> {
        self.filters = filters;
        self.fetch(dashboard, 1).await
    }

    pub async fn refresh(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        self.fetch(dashboard, self.page).await
    }

    pub async fn change_page(&mut self, dashboard: &Dashboard, page: u64) -> Result<(), DashboardError> {
        self.fetch(dashboard, page).await
    }

    /// Resets filters and page without fetching.
    pub fn clear_filters(&mut self) {
        self.filters = TransactionFilters::default();
        self.page = 1;
    }

    /// Clears results, resets to page 1 and fetches once from the new environment.
    pub async fn switch_environment(
        &mut self,
        dashboard: &Dashboard,
        environment: Environment,
    ) -> Result<(), DashboardError> {
        self.environment = environment;
        self.transactions.clear();
        self.total_count = 0;
        self.fetch(dashboard, 1).await
    }

    pub fn view(&self) -> TransactionsView {
        TransactionsView {
            environment: self.environment,
            filters: self.filters.clone(),
            page: self.page.max(1),
            total_pages: self.total_pages(),
            total_count: self.total_count,
            transactions: self.transactions.iter().map(TransactionRow::from).collect(),
            message: self.message.clone(),
        }
    }

    pub fn export(&self, today: NaiveDate) -> Result<CsvFile, DashboardError> {
        csv_export::export("transactions", self.environment, &self.transactions, today)
    }
}
