use log::{error, info};
use serde_json::Value;
use validator::Validate;

use crate::config::Environment;
use crate::models::{DiscountDraft, DiscountRequest};
use crate::services::dashboard::Dashboard;
use crate::utils::validation::required_query;
use crate::utils::DashboardError;

pub const CREATED_MESSAGE: &str = "Discount created successfully!";

/// Validates the draft and creates the discount for one subvariant.
/// Returns the backend's response body.
pub async fn create_discount(
    dashboard: &Dashboard,
    environment: Environment,
    workshop_id: &str,
    subvariant_id: &str,
    draft: DiscountDraft,
) -> Result<Value, DashboardError> {
    draft.validate()?;
    let workshop_id = required_query(workshop_id)?;
    let subvariant_id = required_query(subvariant_id)?;

    let request = DiscountRequest::new(draft, workshop_id.to_string(), subvariant_id.to_string());
    let body = serde_json::to_value(&request)
        .map_err(|e| DashboardError::application(format!("Invalid discount: {}", e)))?;

    match dashboard
        .post(environment, &["crud", "discounts", "create", ""], body)
        .await
    {
        Ok(created) => {
            info!("Discount created for {}/{}", workshop_id, subvariant_id);
            Ok(created)
        }
        Err(e) => {
            error!("Error creating discount: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscountType;
    use crate::services::dashboard::fixtures::dashboard;
    use serde_json::json;

    fn draft() -> DiscountDraft {
        serde_json::from_value(json!({
            "discount_type": "promo_code",
            "discount_value": 10.0,
            "promo_code": " summer10 "
        }))
        .expect("draft")
    }

    #[tokio::test]
    async fn posts_upper_cased_promo_code() {
        let (dashboard, api) = dashboard();
        api.respond(json!({ "id": 7 }));

        let created = create_discount(&dashboard, Environment::Production, "W1", "S1", draft())
            .await
            .expect("create");
        assert_eq!(created, json!({ "id": 7 }));

        let calls = api.calls();
        assert_eq!(calls[0].url.as_str(), "https://prod.example.com/crud/discounts/create/");
        let body = calls[0].body.clone().expect("body");
        assert_eq!(body["promo_code"], "SUMMER10");
        assert_eq!(body["workshop_id"], "W1");
        assert_eq!(body["subvariant_id"], "S1");
        assert_eq!(body["discount_bearer"], "WORKSHOP_OWNER");
        assert_eq!(body["is_active"], true);
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let (dashboard, api) = dashboard();
        let mut draft = draft();
        draft.discount_type = DiscountType::PromoCode;
        draft.promo_code = None;

        let err = create_discount(&dashboard, Environment::Production, "W1", "S1", draft)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn backend_error_is_surfaced() {
        let (dashboard, api) = dashboard();
        api.fail(DashboardError::network("Promo code already exists"));

        let err = create_discount(&dashboard, Environment::Production, "W1", "S1", draft())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Promo code already exists");
    }
}
