use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Serialize;

use crate::guards::AdminGuard;
use crate::routes::{ok, ApiResult};
use crate::services::Dashboard;

#[derive(Debug, Serialize, JsonSchema)]
pub struct LoadingState {
    pub visible: bool,
    pub active: usize,
}

/// Whether any backend request is in flight.
#[openapi(tag = "Loading")]
#[get("/loading")]
pub async fn get_loading(dashboard: &State<Dashboard>, _admin: AdminGuard) -> ApiResult<LoadingState> {
    ok(LoadingState {
        visible: dashboard.loading.is_visible(),
        active: dashboard.loading.active(),
    })
}
