use log::error;

use crate::config::Environment;
use crate::models::{RevenuePayload, RevenueTable};
use crate::services::backend::{ensure_success, field};
use crate::services::dashboard::Dashboard;
use crate::services::query::QueryParams;
use crate::utils::validation::required_query;
use crate::utils::DashboardError;

pub const NO_REVENUE: &str = "No revenue data found for this workshop.";

/// Revenue per subvariant for one workshop, with totals and fill rate.
pub async fn workshop_revenue(
    dashboard: &Dashboard,
    environment: Environment,
    workshop_id: &str,
) -> Result<RevenueTable, DashboardError> {
    let workshop_id = required_query(workshop_id)?;

    let payload = dashboard
        .get(
            environment,
            &["payments", "workshop_revenue", workshop_id],
            &QueryParams::new(),
        )
        .await
        .and_then(|body| ensure_success(body, "Failed to fetch revenue data"))
        .and_then(|body| field::<RevenuePayload>(&body, "data"))
        .map_err(|e| {
            error!("Error fetching revenue data for {}: {}", workshop_id, e);
            e
        })?;

    RevenueTable::from_payload(workshop_id, &payload).ok_or_else(|| DashboardError::not_found(NO_REVENUE))
}
