//! In-memory stand-ins for the backend and the document store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;

use crate::models::{FreeTrialBooking, FreeTrialFilter, KycRecord, KycStatus};
use crate::services::backend::RemoteApi;
use crate::services::document_store::DocumentStore;
use crate::services::kyc_review::KycUpdate;
use crate::utils::DashboardError;

pub fn kyc(id: &str, user_id: &str, status: KycStatus) -> KycRecord {
    KycRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        first_name: Some(format!("Name {}", id)),
        middle_last_name: None,
        phone_number: None,
        street_address: None,
        city: Some("Pune".to_string()),
        state: None,
        state_province: None,
        zip_pin_code: None,
        aadhar: None,
        gstin: None,
        status,
        comments: None,
        hash: None,
        country: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub url: Url,
    pub body: Option<Value>,
}

/// Records every request and answers from a queue; an empty queue answers
/// `{"success": true}`.
#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<VecDeque<Result<Value, DashboardError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, body: Value) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn fail(&self, error: DashboardError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url.to_string()).collect()
    }

    fn answer(&self, method: &'static str, url: Url, body: Option<Value>) -> Result<Value, DashboardError> {
        self.calls.lock().unwrap().push(Call { method, url, body });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "success": true })))
    }
}

#[rocket::async_trait]
impl RemoteApi for FakeApi {
    async fn get_json(&self, url: Url) -> Result<Value, DashboardError> {
        self.answer("GET", url, None)
    }

    async fn post_json(&self, url: Url, body: Value) -> Result<Value, DashboardError> {
        self.answer("POST", url, Some(body))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<KycRecord>>,
    users: Mutex<HashMap<String, String>>,
    free_trials: Mutex<Vec<FreeTrialBooking>>,
    merges: Mutex<Vec<KycUpdate>>,
    write_delay: Option<Duration>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_records(records: Vec<KycRecord>) -> Self {
        MemoryStore {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn with_user(self, email: &str, user_id: &str) -> Self {
        self.users
            .lock()
            .unwrap()
            .insert(email.to_string(), user_id.to_string());
        self
    }

    pub fn with_free_trial(self, booking: Value) -> Self {
        if let Value::Object(map) = booking {
            self.free_trials.lock().unwrap().push(map);
        }
        self
    }

    pub fn merges(&self) -> Vec<KycUpdate> {
        self.merges.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), DashboardError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DashboardError::store("Database error: connection reset"));
        }
        Ok(())
    }
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn kyc_by_email(&self, email: &str) -> Result<Vec<KycRecord>, DashboardError> {
        self.check_read()?;
        let Some(user_id) = self.users.lock().unwrap().get(email).cloned() else {
            return Ok(Vec::new());
        };
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn kyc_by_status(&self, status: &str) -> Result<Vec<KycRecord>, DashboardError> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status.as_str() == status)
            .cloned()
            .collect())
    }

    async fn merge_kyc(&self, update: &KycUpdate) -> Result<(), DashboardError> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DashboardError::store("write refused"));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == update.id)
            .ok_or_else(|| DashboardError::not_found("KYC not found"))?;
        record.status = update.status;
        record.comments = Some(update.comments.clone());
        self.merges.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn free_trial_bookings(
        &self,
        filter: FreeTrialFilter,
        query: &str,
    ) -> Result<Vec<FreeTrialBooking>, DashboardError> {
        self.check_read()?;
        Ok(self
            .free_trials
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.get(filter.field()).and_then(Value::as_str) == Some(query))
            .cloned()
            .collect())
    }
}
