use chrono::{NaiveDate, Utc};
use log::error;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;

use crate::config::Environment;
use crate::models::{EntityKind, RankedEntity, TrackingReport, TrackingSummary, UserVisitRow};
use crate::services::dashboard::Dashboard;
use crate::services::query::{Filter, QueryParams};
use crate::utils::csv_export::{self, CsvFile};
use crate::utils::DashboardError;

#[derive(Debug, Serialize, JsonSchema)]
pub struct TrackingView {
    pub environment: Environment,
    pub date: NaiveDate,
    pub loaded: bool,
    pub summary: TrackingSummary,
    pub total_visits: u64,
    pub users: Vec<UserVisitRow>,
    pub top_studios: Vec<RankedEntity>,
    pub top_workshops: Vec<RankedEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Daily page-visit analytics. Date or environment changes refetch.
#[derive(Debug)]
pub struct TrackingScreen {
    environment: Environment,
    date: NaiveDate,
    report: Option<TrackingReport>,
    error: Option<String>,
    attempted: bool,
}

impl Default for TrackingScreen {
    fn default() -> Self {
        TrackingScreen {
            environment: Environment::Production,
            date: Utc::now().date_naive(),
            report: None,
            error: None,
            attempted: false,
        }
    }
}

impl TrackingScreen {
    /// A failed fetch clears the report.
    pub async fn fetch(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        self.attempted = true;
        self.error = None;
        let params = QueryParams::new().with(Filter::Date, self.date.format("%Y-%m-%d"));

        let result = dashboard
            .get(self.environment, &["crud", "tracking", "analytics", ""], &params)
            .await
            .and_then(|body| {
                serde_json::from_value::<TrackingReport>(body)
                    .map_err(|e| DashboardError::application(e.to_string()))
            });

        match result {
            Ok(report) => {
                self.report = Some(report);
                Ok(())
            }
            Err(e) => {
                let e = DashboardError::Network(format!("Error fetching tracking data: {}", e));
                error!("{}", e);
                self.report = None;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// First visit loads today's report.
    pub async fn ensure_loaded(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        if self.attempted {
            return Ok(());
        }
        self.fetch(dashboard).await
    }

    pub async fn refresh(&mut self, dashboard: &Dashboard) -> Result<(), DashboardError> {
        self.fetch(dashboard).await
    }

    pub async fn set_date(&mut self, dashboard: &Dashboard, date: NaiveDate) -> Result<(), DashboardError> {
        self.date = date;
        self.fetch(dashboard).await
    }

    pub async fn switch_environment(
        &mut self,
        dashboard: &Dashboard,
        environment: Environment,
    ) -> Result<(), DashboardError> {
        self.environment = environment;
        self.report = None;
        self.fetch(dashboard).await
    }

    pub fn view(&self) -> TrackingView {
        let report = self.report.clone().unwrap_or_default();
        TrackingView {
            environment: self.environment,
            date: self.date,
            loaded: self.report.is_some(),
            total_visits: report.summary.total_visits(),
            users: report.user_rows(),
            top_studios: report.top_entities(EntityKind::Studio),
            top_workshops: report.top_entities(EntityKind::Workshop),
            summary: report.summary,
            error: self.error.clone(),
        }
    }

    pub fn export(&self, today: NaiveDate) -> Result<CsvFile, DashboardError> {
        let rows = self
            .report
            .as_ref()
            .map(TrackingReport::user_rows)
            .unwrap_or_default();
        csv_export::export("page_tracking", self.environment, &rows, today)
    }
}
