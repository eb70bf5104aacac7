use chrono::NaiveDate;
use log::{debug, error};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::models::WorkshopBooking;
use crate::services::backend::{ensure_success, field};
use crate::services::dashboard::Dashboard;
use crate::services::query::{Filter, QueryParams};
use crate::utils::csv_export::{self, CsvFile};
use crate::utils::validation::{non_blank, parse_date};
use crate::utils::DashboardError;

const FETCH_FAILED: &str = "Failed to fetch bookings";
const NO_RESULTS: &str = "No bookings found for the selected filters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum DateRange {
    #[default]
    #[serde(rename = "7")]
    LastWeek,
    #[serde(rename = "30")]
    LastMonth,
    #[serde(rename = "60")]
    LastTwoMonths,
    #[serde(rename = "custom")]
    Custom,
}

impl DateRange {
    pub fn days(&self) -> Option<u32> {
        match self {
            DateRange::LastWeek => Some(7),
            DateRange::LastMonth => Some(30),
            DateRange::LastTwoMonths => Some(60),
            DateRange::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonitorFilters {
    #[serde(default)]
    pub workshop_id: Option<String>,
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl MonitorFilters {
    pub fn params(&self) -> Result<QueryParams, DashboardError> {
        let mut params = QueryParams::new();
        params.set_trimmed(Filter::WorkshopId, self.workshop_id.as_deref());

        match self.range.days() {
            Some(days) => params.set(Filter::Days, days),
            None => {
                let start = non_blank(self.start_date.as_deref());
                let end = non_blank(self.end_date.as_deref());
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(DashboardError::validation(
                        "Please provide both start and end dates for custom range",
                    ));
                };
                params.set(Filter::StartDate, parse_date(start)?.format("%Y-%m-%d"));
                params.set(Filter::EndDate, parse_date(end)?.format("%Y-%m-%d"));
            }
        }
        Ok(params)
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MonitorRow {
    #[serde(flatten)]
    pub booking: WorkshopBooking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_url: Option<String>,
    pub workshop_url: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MonitorView {
    pub environment: Environment,
    pub filters: MonitorFilters,
    pub total: usize,
    pub bookings: Vec<MonitorRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Recent workshop bookings across all workshops.
#[derive(Debug, Default)]
pub struct MonitorScreen {
    environment: Environment,
    filters: MonitorFilters,
    bookings: Vec<WorkshopBooking>,
    message: Option<String>,
    attempted: bool,
}

impl MonitorScreen {
    pub async fn ensure_loaded(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        if self.attempted {
            return Ok(());
        }
        self.fetch(dashboard).await
    }

    pub async fn fetch(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        self.attempted = true;
        self.message = None;
        let params = match self.filters.params() {
            Ok(params) => params,
            Err(e) => {
                self.message = Some(e.to_string());
                return Err(e);
            }
        };
        debug!("Fetching workshop bookings with {:?}", params);

        let result = dashboard
            .get(self.environment, &["payments", "all_workshop_bookings"], &params)
            .await
            .and_then(|body| ensure_success(body, FETCH_FAILED))
            .and_then(|body| field::<Vec<WorkshopBooking>>(&body, "bookings"));

        match result {
            Ok(bookings) => {
                if bookings.is_empty() {
                    self.message = Some(NO_RESULTS.to_string());
                }
                self.bookings = bookings;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching bookings: {}", e);
                self.bookings.clear();
                self.message = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn apply_filters(
        &mut self,
        dashboard: &Dashboard,
        filters: MonitorFilters,
    ) -> Result<(), DashboardError> {
        self.filters = filters;
        self.fetch(dashboard).await
    }

    pub async fn switch_environment(
        &mut self,
        dashboard: &Dashboard,
        environment: Environment,
    ) -> Result<(), DashboardError> {
        self.environment = environment;
        self.bookings.clear();
        self.fetch(dashboard).await
    }

    pub fn review_url(&self, dashboard: &Dashboard, booking: &WorkshopBooking) -> Option<String> {
        let user_id = non_blank(booking.user_id.as_deref())?;
        let workshop_id = non_blank(Some(booking.workshop_id.as_str()))?;
        Some(
            dashboard
                .endpoints
                .webapp_url(self.environment, &["workshopExperience", user_id, workshop_id])
                .to_string(),
        )
    }

    pub fn workshop_url(&self, dashboard: &Dashboard, workshop_id: &str) -> String {
        dashboard
            .endpoints
            .webapp_url(self.environment, &["workshop", workshop_id])
            .to_string()
    }

    pub fn view(&self, dashboard: &Dashboard) -> MonitorView {
        MonitorView {
            environment: self.environment,
            filters: self.filters.clone(),
            total: self.bookings.len(),
            bookings: self
                .bookings
                .iter()
                .map(|booking| MonitorRow {
                    review_url: self.review_url(dashboard, booking),
                    workshop_url: self.workshop_url(dashboard, &booking.workshop_id),
                    booking: booking.clone(),
                })
                .collect(),
            message: self.message.clone(),
        }
    }

    pub fn export(&self, today: NaiveDate) -> Result<CsvFile, DashboardError> {
        csv_export::export("workshop_bookings", self.environment, &self.bookings, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::fixtures::dashboard;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(DateRange::LastWeek, "days=7")]
    #[case(DateRange::LastMonth, "days=30")]
    #[case(DateRange::LastTwoMonths, "days=60")]
    fn preset_ranges_send_days(#[case] range: DateRange, #[case] query: &str) {
        let filters = MonitorFilters {
            range,
            ..Default::default()
        };
        assert_eq!(filters.params().expect("params").get(Filter::Days), query.strip_prefix("days="));
    }

    #[tokio::test]
    async fn custom_range_without_both_dates_issues_no_request() {
        let (dashboard, api) = dashboard();
        let mut screen = MonitorScreen::default();
        let filters = MonitorFilters {
            range: DateRange::Custom,
            start_date: Some("2024-01-01".into()),
            ..Default::default()
        };

        let err = screen.apply_filters(&dashboard, filters).await.unwrap_err();
        assert_eq!(
            err,
            DashboardError::validation("Please provide both start and end dates for custom range")
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn custom_range_and_workshop_are_sent() {
        let (dashboard, api) = dashboard();
        api.respond(json!({
            "success": true,
            "bookings": [{ "booking_id": "B1", "workshop_id": "W1", "user_id": "U1" }]
        }));
        let mut screen = MonitorScreen::default();
        let filters = MonitorFilters {
            workshop_id: Some(" W1 ".into()),
            range: DateRange::Custom,
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
        };

        screen.apply_filters(&dashboard, filters).await.expect("fetch");

        assert_eq!(
            api.urls(),
            vec!["https://staging.example.com/payments/all_workshop_bookings?workshop_id=W1&start_date=2024-01-01&end_date=2024-01-31"]
        );
        let view = screen.view(&dashboard);
        assert_eq!(
            view.bookings[0].review_url.as_deref(),
            Some("https://app.example.com/workshopExperience/U1/W1")
        );
        assert_eq!(view.bookings[0].workshop_url, "https://app.example.com/workshop/W1");
    }

    #[tokio::test]
    async fn environment_switch_fetches_once_from_new_base() {
        let (dashboard, api) = dashboard();
        api.respond(json!({ "success": true, "bookings": [] }));
        let mut screen = MonitorScreen::default();

        screen
            .switch_environment(&dashboard, Environment::Production)
            .await
            .expect("fetch");

        assert_eq!(
            api.urls(),
            vec!["https://prod.example.com/payments/all_workshop_bookings?days=7"]
        );
        assert_eq!(screen.view(&dashboard).message.as_deref(), Some(NO_RESULTS));
    }

    #[tokio::test]
    async fn failure_clears_results() {
        let (dashboard, api) = dashboard();
        api.respond(json!({ "success": true, "bookings": [{ "booking_id": "B1", "workshop_id": "W1" }] }))
            .respond(json!({ "success": false }));
        let mut screen = MonitorScreen::default();
        screen.fetch(&dashboard).await.expect("first");
        assert!(screen.view(&dashboard).bookings[0].review_url.is_none());

        let err = screen.fetch(&dashboard).await.unwrap_err();
        assert_eq!(err.to_string(), FETCH_FAILED);
        assert!(screen.view(&dashboard).bookings.is_empty());
    }
}
