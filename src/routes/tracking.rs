use rocket::State;
use rocket_okapi::openapi;

use crate::config::Environment;
use crate::guards::AdminGuard;
use crate::routes::{ok, today, ApiResult};
use crate::services::tracking::TrackingView;
use crate::services::{Dashboard, Desks};
use crate::utils::validation::parse_date;
use crate::utils::{ApiError, CsvFile};

#[openapi(tag = "Page Tracking")]
#[get("/tracking")]
pub async fn get_tracking(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<TrackingView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.tracking.lock().await;
    screen.ensure_loaded(dashboard).await?;
    ok(screen.view())
}

/// `date` is `YYYY-MM-DD`.
#[openapi(tag = "Page Tracking")]
#[post("/tracking/date?<date>")]
pub async fn set_tracking_date(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    date: String,
) -> ApiResult<TrackingView> {
    let date = parse_date(&date)?;
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.tracking.lock().await;
    screen.set_date(dashboard, date).await?;
    ok(screen.view())
}

#[openapi(tag = "Page Tracking")]
#[post("/tracking/environment?<environment>")]
pub async fn switch_tracking_environment(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    environment: Environment,
) -> ApiResult<TrackingView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.tracking.lock().await;
    screen.switch_environment(dashboard, environment).await?;
    ok(screen.view())
}

#[openapi(tag = "Page Tracking")]
#[post("/tracking/refresh")]
pub async fn refresh_tracking(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<TrackingView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.tracking.lock().await;
    screen.refresh(dashboard).await?;
    ok(screen.view())
}

#[openapi(tag = "Page Tracking")]
#[get("/tracking/export")]
pub async fn export_tracking(desks: &State<Desks>, admin: AdminGuard) -> Result<CsvFile, ApiError> {
    let desk = desks.open(&admin.admin_id);
    let screen = desk.tracking.lock().await;
    Ok(screen.export(today())?)
}
