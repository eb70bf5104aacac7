use log::{error, info};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::Environment;
use crate::models::{BookingLookup, FreeTrialBooking, FreeTrialFilter, WorkshopBooking};
use crate::services::backend::body_message;
use crate::services::dashboard::Dashboard;
use crate::services::document_store::DocumentStore;
use crate::services::query::{Filter, QueryParams};
use crate::utils::validation::required_query;
use crate::utils::DashboardError;

fn fetch_failed(e: DashboardError) -> DashboardError {
    DashboardError::Network(format!("Failed to fetch: {}", e))
}

fn succeeded(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(true)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, DashboardError> {
    serde_json::from_value(value).map_err(|e| fetch_failed(DashboardError::application(e.to_string())))
}

/// Looks up workshop bookings by booking, user or workshop id.
///
/// Workshop lookups go through the workshop's transactions and keep each
/// transaction's embedded `booking`.
pub async fn lookup_workshop_bookings(
    dashboard: &Dashboard,
    environment: Environment,
    lookup: BookingLookup,
    query: &str,
) -> Result<Vec<WorkshopBooking>, DashboardError> {
    let query = required_query(query)?;

    let bookings = match lookup {
        BookingLookup::BookingId => {
            let params = QueryParams::new().with(Filter::BookingId, query);
            let body = dashboard
                .get(environment, &["payments", "workshop_booking"], &params)
                .await
                .map_err(fetch_failed)?;

            match body.get("booking").filter(|b| succeeded(&body) && !b.is_null()) {
                Some(booking) => vec![decode::<WorkshopBooking>(booking.clone())?],
                None => {
                    return Err(DashboardError::not_found(
                        body_message(&body).unwrap_or_else(|| "Booking not found".to_string()),
                    ));
                }
            }
        }
        BookingLookup::UserId => {
            let params = QueryParams::new().with(Filter::UserId, query);
            let body = dashboard
                .get(environment, &["payments", "workshop_bookings"], &params)
                .await
                .map_err(fetch_failed)?;

            match body.get("bookings").filter(|b| succeeded(&body) && b.is_array()) {
                Some(bookings) => decode::<Vec<WorkshopBooking>>(bookings.clone())?,
                None => return Err(DashboardError::not_found("No bookings found for this user")),
            }
        }
        BookingLookup::WorkshopId => {
            let body = dashboard
                .get(
                    environment,
                    &["payments", "transactions", "workshop", query],
                    &QueryParams::new(),
                )
                .await
                .map_err(fetch_failed)?;

            let bookings = body
                .get("transactions")
                .and_then(Value::as_array)
                .map(|transactions| {
                    transactions
                        .iter()
                        .filter_map(|t| t.get("booking").filter(|b| b.is_object()).cloned())
                        .map(decode::<WorkshopBooking>)
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();

            if bookings.is_empty() {
                return Err(DashboardError::not_found("No bookings for this workshop"));
            }
            bookings
        }
    };

    info!("Found {} workshop bookings by {:?}", bookings.len(), lookup);
    Ok(bookings)
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingRow {
    #[serde(flatten)]
    pub booking: WorkshopBooking,
    pub item_count: usize,
    pub ticket_url: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingsView {
    pub free_trial_filter: FreeTrialFilter,
    pub free_trial_query: String,
    pub free_trials: Vec<FreeTrialBooking>,
    pub lookup: BookingLookup,
    pub query: String,
    pub environment: Environment,
    pub webapp_environment: Environment,
    pub bookings: Vec<BookingRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Free-trial search plus workshop booking lookup.
#[derive(Debug)]
pub struct BookingsScreen {
    free_trial_filter: FreeTrialFilter,
    free_trial_query: String,
    free_trials: Vec<FreeTrialBooking>,
    lookup: BookingLookup,
    query: String,
    environment: Environment,
    webapp_environment: Environment,
    bookings: Vec<WorkshopBooking>,
    error: Option<String>,
}

impl Default for BookingsScreen {
    fn default() -> Self {
        BookingsScreen {
            free_trial_filter: FreeTrialFilter::EmailLearner,
            free_trial_query: String::new(),
            free_trials: Vec::new(),
            lookup: BookingLookup::BookingId,
            query: String::new(),
            environment: Environment::Production,
            webapp_environment: Environment::Production,
            bookings: Vec::new(),
            error: None,
        }
    }
}

impl BookingsScreen {
    /// A blank query leaves the current results alone.
    pub async fn search_free_trials(
        &mut self,
        store: &dyn DocumentStore,
        filter: FreeTrialFilter,
        query: &str,
    ) -> Result<(), DashboardError> {
        self.free_trial_filter = filter;
        self.free_trial_query = query.to_string();

        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        match store.free_trial_bookings(filter, query).await {
            Ok(found) => {
                self.free_trials = found;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching free trial bookings: {}", e);
                self.free_trials.clear();
                Err(e)
            }
        }
    }

    /// Switching the lookup kind clears query, results and error.
    pub fn select_lookup(&mut self, lookup: BookingLookup) {
        self.lookup = lookup;
        self.query.clear();
        self.bookings.clear();
        self.error = None;
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn set_webapp_environment(&mut self, environment: Environment) {
        self.webapp_environment = environment;
    }

    pub async fn search_workshop_bookings(
        &mut self,
        dashboard: &Dashboard,
        query: &str,
    ) -> Result<(), DashboardError> {
        self.query = query.to_string();
        self.bookings.clear();
        self.error = None;

        match lookup_workshop_bookings(dashboard, self.environment, self.lookup, query).await {
            Ok(bookings) => {
                self.bookings = bookings;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn ticket_url(&self, dashboard: &Dashboard, booking_id: &str) -> Url {
        dashboard
            .endpoints
            .webapp_url(self.webapp_environment, &["ticket", booking_id])
    }

    pub fn view(&self, dashboard: &Dashboard) -> BookingsView {
        BookingsView {
            free_trial_filter: self.free_trial_filter,
            free_trial_query: self.free_trial_query.clone(),
            free_trials: self.free_trials.clone(),
            lookup: self.lookup,
            query: self.query.clone(),
            environment: self.environment,
            webapp_environment: self.webapp_environment,
            bookings: self
                .bookings
                .iter()
                .map(|booking| BookingRow {
                    item_count: booking.item_count(),
                    ticket_url: self.ticket_url(dashboard, &booking.booking_id).to_string(),
                    booking: booking.clone(),
                })
                .collect(),
            error: self.error.clone(),
        }
    }
}
