use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
    PromoCode,
}

/// Who absorbs the discount cost.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountBearer {
    #[default]
    WorkshopOwner,
    Nritya,
}

fn default_active() -> bool {
    true
}

/// Discount form as submitted by staff.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate, JsonSchema)]
#[validate(schema(function = "validate_promo_code"))]
pub struct DiscountDraft {
    #[serde(default)]
    pub discount_type: DiscountType,
    #[validate(range(min = 0.0, message = "Discount value must not be negative"))]
    pub discount_value: f64,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub max_uses_per_user: Option<u32>,
    #[serde(default)]
    pub discount_bearer: DiscountBearer,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn validate_promo_code(draft: &DiscountDraft) -> Result<(), ValidationError> {
    let blank = draft
        .promo_code
        .as_deref()
        .map(|code| code.trim().is_empty())
        .unwrap_or(true);
    if draft.discount_type == DiscountType::PromoCode && blank {
        let mut error = ValidationError::new("promo_code_required");
        error.message = Some("Promo code is required for promo code discounts".into());
        return Err(error);
    }
    Ok(())
}

/// Body POSTed to `crud/discounts/create/`.
#[derive(Debug, Serialize, Clone, PartialEq, JsonSchema)]
pub struct DiscountRequest {
    #[serde(flatten)]
    pub draft: DiscountDraft,
    pub workshop_id: String,
    pub subvariant_id: String,
}

impl DiscountRequest {
    /// Promo codes are stored upper-cased and trimmed.
    pub fn new(mut draft: DiscountDraft, workshop_id: String, subvariant_id: String) -> Self {
        draft.promo_code = draft
            .promo_code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());
        DiscountRequest {
            draft,
            workshop_id,
            subvariant_id,
        }
    }
}
