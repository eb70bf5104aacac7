use rocket::State;
use rocket_okapi::openapi;

use crate::config::Environment;
use crate::guards::AdminGuard;
use crate::models::RevenueTable;
use crate::routes::{ok, ApiResult};
use crate::services::revenue::workshop_revenue;
use crate::services::Dashboard;

/// Revenue breakdown for a workshop. Defaults to production.
#[openapi(tag = "Revenue")]
#[get("/revenue/<workshop_id>?<environment>")]
pub async fn get_workshop_revenue(
    dashboard: &State<Dashboard>,
    _admin: AdminGuard,
    workshop_id: String,
    environment: Option<Environment>,
) -> ApiResult<RevenueTable> {
    let environment = environment.unwrap_or(Environment::Production);
    ok(workshop_revenue(dashboard, environment, &workshop_id).await?)
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;
    use serde_json::{json, Value};

    use crate::routes::harness::{admin, launch};
    use crate::services::revenue::NO_REVENUE;

    #[tokio::test]
    async fn reads_production_by_default() {
        let h = launch().await;
        h.api.respond(json!({
            "success": true,
            "data": {
                "W1": {
                    "v1": {
                        "variant_description": "Morning",
                        "s1": { "price": 500.0, "capacity": 10, "quantity": 4, "subtotal": 2000.0 }
                    }
                }
            }
        }));

        let response = h.client.get("/api/v1/revenue/W1").header(admin()).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(h.api.urls(), vec!["https://prod.example.com/payments/workshop_revenue/W1"]);

        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["data"]["total_revenue"], 2000.0);
        assert_eq!(body["data"]["total_tickets"], 4);
    }

    #[tokio::test]
    async fn missing_workshop_entry_is_not_found() {
        let h = launch().await;
        h.api.respond(json!({ "success": true, "data": {} }));

        let response = h
            .client
            .get("/api/v1/revenue/W9?environment=local")
            .header(admin())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(h.api.urls(), vec!["http://localhost:8000/payments/workshop_revenue/W9"]);
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["message"], NO_REVENUE);
    }
}
