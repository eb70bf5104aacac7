pub mod bookings;
pub mod discounts;
pub mod kyc;
pub mod loading;
pub mod monitor;
pub mod revenue;
pub mod tickets;
pub mod tracking;
pub mod transactions;

use rocket::serde::json::Json;

use crate::utils::{ApiError, ApiResponse};

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
