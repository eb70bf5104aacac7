use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub enum KycStatus {
    Submitted,
    Verified,
    #[serde(rename = "Under Review")]
    UnderReview,
    Reviewed,
    #[serde(rename = "Verification Failed")]
    VerificationFailed,
}

impl KycStatus {
    pub const ALL: [KycStatus; 5] = [
        KycStatus::Submitted,
        KycStatus::Verified,
        KycStatus::UnderReview,
        KycStatus::Reviewed,
        KycStatus::VerificationFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Submitted => "Submitted",
            KycStatus::Verified => "Verified",
            KycStatus::UnderReview => "Under Review",
            KycStatus::Reviewed => "Reviewed",
            KycStatus::VerificationFailed => "Verification Failed",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's identity verification submission as stored in `UserKyc`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct KycRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_pin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    pub status: KycStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Label/value line shown on a review card.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct KycDetail {
    pub label: &'static str,
    pub value: String,
}

impl KycRecord {
    /// Card detail lines. Status, comments, hash and country are edited or
    /// hidden, so they are left out.
    pub fn details(&self) -> Vec<KycDetail> {
        let fields: [(&'static str, Option<&String>); 12] = [
            ("KYC ID", Some(&self.id)),
            ("UserId", Some(&self.user_id)),
            ("First Name", self.first_name.as_ref()),
            ("Middle & Last Name", self.middle_last_name.as_ref()),
            ("Phone Number", self.phone_number.as_ref()),
            ("Street Address", self.street_address.as_ref()),
            ("City", self.city.as_ref()),
            ("State", self.state.as_ref()),
            ("State", self.state_province.as_ref()),
            ("PIN Code/ZIP", self.zip_pin_code.as_ref()),
            ("Aadhar Number", self.aadhar.as_ref()),
            ("GST Number", self.gstin.as_ref()),
        ];

        fields
            .into_iter()
            .filter_map(|(label, value)| {
                value.map(|v| KycDetail {
                    label,
                    value: v.clone(),
                })
            })
            .collect()
    }
}

/// Review card: the record plus its rendered detail lines.
#[derive(Debug, Serialize, Clone, JsonSchema)]
pub struct KycCard {
    pub record: KycRecord,
    pub details: Vec<KycDetail>,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
