use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::config::Environment;
use crate::guards::AdminGuard;
use crate::routes::{ok, today, ApiResult};
use crate::services::monitor::{MonitorFilters, MonitorView};
use crate::services::{Dashboard, Desks};
use crate::utils::{ApiError, CsvFile};

#[openapi(tag = "Booking Monitor")]
#[get("/monitor")]
pub async fn get_monitor(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<MonitorView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.monitor.lock().await;
    screen.ensure_loaded(dashboard).await?;
    ok(screen.view(dashboard))
}

#[openapi(tag = "Booking Monitor")]
#[post("/monitor/filters", data = "<filters>")]
pub async fn apply_monitor_filters(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    filters: Json<MonitorFilters>,
) -> ApiResult<MonitorView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.monitor.lock().await;
    screen.apply_filters(dashboard, filters.into_inner()).await?;
    ok(screen.view(dashboard))
}

#[openapi(tag = "Booking Monitor")]
#[post("/monitor/environment?<environment>")]
pub async fn switch_monitor_environment(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    environment: Environment,
) -> ApiResult<MonitorView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.monitor.lock().await;
    screen.switch_environment(dashboard, environment).await?;
    ok(screen.view(dashboard))
}

#[openapi(tag = "Booking Monitor")]
#[get("/monitor/export")]
pub async fn export_monitor(desks: &State<Desks>, admin: AdminGuard) -> Result<CsvFile, ApiError> {
    let desk = desks.open(&admin.admin_id);
    let screen = desk.monitor.lock().await;
    Ok(screen.export(today())?)
}
