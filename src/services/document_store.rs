use log::warn;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Cursor, Database};
use serde::de::DeserializeOwned;

use crate::models::{FreeTrialBooking, FreeTrialFilter, KycRecord};
use crate::services::kyc_review::KycUpdate;
use crate::utils::DashboardError;

const KYC_COLLECTION: &str = "UserKyc";
const USER_COLLECTION: &str = "User";
const FREE_TRIAL_COLLECTION: &str = "FreeTrialBookings";

/// Document store lookups and merges used by the dashboard.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// KYC records belonging to the user registered under `email`.
    async fn kyc_by_email(&self, email: &str) -> Result<Vec<KycRecord>, DashboardError>;

    async fn kyc_by_status(&self, status: &str) -> Result<Vec<KycRecord>, DashboardError>;

    /// Merges `{status, comments}` into the KYC document and mirrors it onto
    /// the owning user.
    async fn merge_kyc(&self, update: &KycUpdate) -> Result<(), DashboardError>;

    async fn free_trial_bookings(
        &self,
        filter: FreeTrialFilter,
        query: &str,
    ) -> Result<Vec<FreeTrialBooking>, DashboardError>;
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        MongoStore { db }
    }

    fn kycs(&self) -> Collection<KycRecord> {
        self.db.collection::<KycRecord>(KYC_COLLECTION)
    }
}

async fn drain<T: DeserializeOwned>(mut cursor: Cursor<T>) -> Result<Vec<T>, DashboardError> {
    let mut items = Vec::new();
    while cursor
        .advance()
        .await
        .map_err(|e| DashboardError::store(format!("Cursor error: {}", e)))?
    {
        let item = cursor
            .deserialize_current()
            .map_err(|e| DashboardError::store(format!("Deserialization error: {}", e)))?;
        items.push(item);
    }
    Ok(items)
}

fn id_string(value: Option<&Bson>) -> Option<String> {
    match value? {
        Bson::String(s) => Some(s.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

/// Matches `_id` whether it was stored as an ObjectId or as its hex string,
/// the same forms [`id_string`] reads.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [Bson::ObjectId(oid), Bson::String(id.to_string())] } },
        Err(_) => doc! { "_id": id },
    }
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn kyc_by_email(&self, email: &str) -> Result<Vec<KycRecord>, DashboardError> {
        let user = self
            .db
            .collection::<Document>(USER_COLLECTION)
            .find_one(doc! { "email": email }, None)
            .await?;

        let Some(user) = user else {
            return Ok(Vec::new());
        };
        let Some(user_id) = id_string(user.get("UserId")).or_else(|| id_string(user.get("_id"))) else {
            return Ok(Vec::new());
        };

        let cursor = self.kycs().find(doc! { "UserId": user_id }, None).await?;
        drain(cursor).await
    }

    async fn kyc_by_status(&self, status: &str) -> Result<Vec<KycRecord>, DashboardError> {
        let cursor = self.kycs().find(doc! { "status": status }, None).await?;
        drain(cursor).await
    }

    async fn merge_kyc(&self, update: &KycUpdate) -> Result<(), DashboardError> {
        let result = self
            .kycs()
            .update_one(
                id_filter(&update.id),
                doc! { "$set": { "status": update.status.as_str(), "comments": update.comments.as_str() } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(DashboardError::not_found("KYC not found"));
        }

        let mirrored = self
            .db
            .collection::<Document>(USER_COLLECTION)
            .update_one(
                id_filter(&update.user_id),
                doc! { "$set": { "kyc_status": update.status.as_str(), "kyc_comments": update.comments.as_str() } },
                None,
            )
            .await
            .map_err(|e| {
                warn!("KYC {} saved but user {} not updated: {}", update.id, update.user_id, e);
                DashboardError::store(format!("KYC saved but user not updated: {}", e))
            })?;

        if mirrored.matched_count == 0 {
            warn!("KYC {} saved but user {} does not exist", update.id, update.user_id);
            return Err(DashboardError::store(format!(
                "KYC saved but user {} not found",
                update.user_id
            )));
        }

        Ok(())
    }

    async fn free_trial_bookings(
        &self,
        filter: FreeTrialFilter,
        query: &str,
    ) -> Result<Vec<FreeTrialBooking>, DashboardError> {
        let mut criteria = Document::new();
        criteria.insert(filter.field(), query);

        let cursor = self
            .db
            .collection::<Document>(FREE_TRIAL_COLLECTION)
            .find(criteria, None)
            .await?;

        let documents = drain(cursor).await?;
        Ok(documents
            .into_iter()
            .filter_map(|document| match Bson::Document(document).into_relaxed_extjson() {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}
