use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::Deserialize;

use crate::db::DbConn;
use crate::guards::AdminGuard;
use crate::models::{KycCard, KycStatus};
use crate::routes::{ok, ApiResult};
use crate::services::kyc_review::{KycEdit, KycSearchMode};
use crate::services::Desks;
use crate::utils::ApiResponse;

#[openapi(tag = "KYC")]
#[get("/kyc")]
pub async fn get_kyc_cards(desks: &State<Desks>, admin: AdminGuard) -> ApiResult<Vec<KycCard>> {
    ok(desks.open(&admin.admin_id).kyc.cards())
}

/// Replaces the review list with records matching an email or a status.
#[openapi(tag = "KYC")]
#[get("/kyc/search?<mode>&<query>")]
pub async fn search_kyc(
    db: &State<DbConn>,
    desks: &State<Desks>,
    admin: AdminGuard,
    mode: KycSearchMode,
    query: Option<String>,
) -> ApiResult<Vec<KycCard>> {
    let desk = desks.open(&admin.admin_id);
    let store = db.inner().as_ref();
    desk.kyc
        .search(store, mode, query.as_deref().unwrap_or_default())
        .await?;
    ok(desk.kyc.cards())
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditKycDto {
    pub status: Option<KycStatus>,
    pub comments: Option<String>,
}

/// Local edit only; nothing is written until the record is submitted.
#[openapi(tag = "KYC")]
#[put("/kyc/<kyc_id>", data = "<dto>")]
pub async fn edit_kyc(
    desks: &State<Desks>,
    admin: AdminGuard,
    kyc_id: String,
    dto: Json<EditKycDto>,
) -> ApiResult<Vec<KycCard>> {
    let desk = desks.open(&admin.admin_id);
    let dto = dto.into_inner();

    if let Some(status) = dto.status {
        desk.kyc.edit(&kyc_id, KycEdit::Status(status))?;
    }
    if let Some(comments) = dto.comments {
        desk.kyc.edit(&kyc_id, KycEdit::Comments(comments))?;
    }
    ok(desk.kyc.cards())
}

#[openapi(tag = "KYC")]
#[post("/kyc/<kyc_id>/submit")]
pub async fn submit_kyc(
    db: &State<DbConn>,
    desks: &State<Desks>,
    admin: AdminGuard,
    kyc_id: String,
) -> ApiResult<Vec<KycCard>> {
    let desk = desks.open(&admin.admin_id);
    let outcome = desk.kyc.submit(db.inner().clone(), &kyc_id).await?;
    outcome.into_result()?;

    Ok(Json(ApiResponse::success_with_message(
        "KYC status updated".to_string(),
        desk.kyc.cards(),
    )))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rocket::http::{ContentType, Status};
    use serde_json::Value;

    use crate::models::KycStatus;
    use crate::routes::harness::{admin, bearer, launch_with};
    use crate::services::kyc_review::TIMEOUT_MESSAGE;
    use crate::services::testing::{kyc, MemoryStore};

    fn store() -> MemoryStore {
        MemoryStore::with_records(vec![
            kyc("k1", "u1", KycStatus::Submitted),
            kyc("k2", "u2", KycStatus::Submitted),
        ])
        .with_user("dancer@example.com", "u2")
    }

    #[tokio::test]
    async fn search_edit_and_submit() {
        let h = launch_with(store(), Duration::from_secs(5)).await;

        let response = h
            .client
            .get("/api/v1/kyc/search?mode=status&query=Submitted")
            .header(admin())
            .dispatch()
            .await;
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

        let response = h
            .client
            .put("/api/v1/kyc/k2")
            .header(admin())
            .header(ContentType::JSON)
            .body(r#"{"status":"Verification Failed","comments":"blurry"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert!(h.store.merges().is_empty());

        let response = h
            .client
            .post("/api/v1/kyc/k2/submit")
            .header(admin())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let merges = h.store.merges();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].id, "k2");
        assert_eq!(merges[0].status, KycStatus::VerificationFailed);
        assert_eq!(merges[0].comments, "blurry");
    }

    #[tokio::test]
    async fn desks_are_per_admin() {
        let h = launch_with(store(), Duration::from_secs(5)).await;

        h.client
            .get("/api/v1/kyc/search?mode=email&query=dancer@example.com")
            .header(admin())
            .dispatch()
            .await;

        let response = h.client.get("/api/v1/kyc").header(bearer("other", "2")).dispatch().await;
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["data"], Value::Array(vec![]));

        let response = h
            .client
            .post("/api/v1/kyc/k2/submit")
            .header(bearer("other", "2"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[tokio::test]
    async fn slow_write_times_out() {
        let h = launch_with(
            store().with_write_delay(Duration::from_millis(300)),
            Duration::from_millis(20),
        )
        .await;
        h.client
            .get("/api/v1/kyc/search?mode=status&query=Submitted")
            .header(admin())
            .dispatch()
            .await;

        let response = h
            .client
            .post("/api/v1/kyc/k1/submit")
            .header(admin())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::GatewayTimeout);
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["message"], TIMEOUT_MESSAGE);

        let response = h.client.get("/api/v1/kyc").header(admin()).dispatch().await;
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["data"][0]["error"], TIMEOUT_MESSAGE);
        assert_eq!(body["data"][0]["submitting"], false);
    }
}
