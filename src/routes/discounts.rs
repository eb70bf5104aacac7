use log::info;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Environment;
use crate::guards::SuperAdminGuard;
use crate::models::DiscountDraft;
use crate::routes::ApiResult;
use crate::services::discounts::{create_discount, CREATED_MESSAGE};
use crate::services::Dashboard;
use crate::utils::ApiResponse;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateDiscountDto {
    pub workshop_id: String,
    pub subvariant_id: String,
    #[serde(flatten)]
    pub draft: DiscountDraft,
    #[serde(default)]
    pub environment: Option<Environment>,
}

/// Super admins only.
#[openapi(tag = "Discounts")]
#[post("/discounts", data = "<dto>")]
pub async fn post_discount(
    dashboard: &State<Dashboard>,
    admin: SuperAdminGuard,
    dto: Json<CreateDiscountDto>,
) -> ApiResult<Value> {
    let dto = dto.into_inner();
    let environment = dto.environment.unwrap_or(Environment::Production);
    info!("Admin {} creating discount for {}", admin.admin.admin_id, dto.workshop_id);

    let created = create_discount(
        dashboard,
        environment,
        &dto.workshop_id,
        &dto.subvariant_id,
        dto.draft,
    )
    .await?;
    Ok(Json(ApiResponse::success_with_message(CREATED_MESSAGE.to_string(), created)))
}
