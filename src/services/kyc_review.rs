//! KYC review desk: search, optimistic edits and timeout-bounded submission.
//!
//! Edits land in the local list immediately and stay there until an explicit
//! submit writes `{status, comments}` for that one record. Each record has
//! its own in-flight marker, so a slow write never blocks other cards.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, info, warn};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::models::{KycCard, KycRecord, KycStatus};
use crate::services::document_store::DocumentStore;
use crate::utils::DashboardError;

pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);
pub const TIMEOUT_MESSAGE: &str = "Network issue or server timeout. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum KycSearchMode {
    #[field(value = "email")]
    Email,
    #[field(value = "status")]
    Status,
}

/// A single-field change to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycEdit {
    Status(KycStatus),
    Comments(String),
}

/// Payload of one remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycUpdate {
    pub id: String,
    pub user_id: String,
    pub status: KycStatus,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Success,
    TimedOut,
    Failed(String),
}

impl SubmitOutcome {
    pub fn error_message(&self) -> Option<String> {
        match self {
            SubmitOutcome::Success => None,
            SubmitOutcome::TimedOut => Some(TIMEOUT_MESSAGE.to_string()),
            SubmitOutcome::Failed(reason) => Some(format!("Error updating status: {}", reason)),
        }
    }

    pub fn into_result(self) -> Result<(), DashboardError> {
        match self {
            SubmitOutcome::Success => Ok(()),
            SubmitOutcome::TimedOut => Err(DashboardError::Timeout(TIMEOUT_MESSAGE.to_string())),
            failed @ SubmitOutcome::Failed(_) => Err(DashboardError::Application(
                failed.error_message().unwrap_or_default(),
            )),
        }
    }
}

/// Replaces the edited field on the record with `id`; every other record is
/// returned unchanged.
pub fn apply_edit(records: Vec<KycRecord>, id: &str, edit: &KycEdit) -> Vec<KycRecord> {
    records
        .into_iter()
        .map(|record| {
            if record.id != id {
                return record;
            }
            match edit {
                KycEdit::Status(status) => KycRecord {
                    status: *status,
                    ..record
                },
                KycEdit::Comments(comments) => KycRecord {
                    comments: Some(comments.clone()),
                    ..record
                },
            }
        })
        .collect()
}

/// Local list of records under review plus per-record submission state.
#[derive(Debug, Default)]
pub struct KycWorkspace {
    records: Vec<KycRecord>,
    in_flight: HashSet<String>,
    errors: HashMap<String, String>,
}

impl KycWorkspace {
    /// Swaps in a fresh search result. Writes already in flight keep their markers.
    pub fn replace(&mut self, records: Vec<KycRecord>) {
        self.records = records;
        self.errors.clear();
    }

    pub fn records(&self) -> &[KycRecord] {
        &self.records
    }

    /// Returns false when no record carries `id`.
    pub fn edit(&mut self, id: &str, edit: &KycEdit) -> bool {
        if !self.records.iter().any(|r| r.id == id) {
            return false;
        }
        self.records = apply_edit(std::mem::take(&mut self.records), id, edit);
        true
    }

    pub fn is_submitting(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    /// Idle → Submitting for one record.
    pub fn begin_submit(&mut self, id: &str) -> Result<KycUpdate, DashboardError> {
        let record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| DashboardError::not_found("KYC not found"))?;

        if self.in_flight.contains(id) {
            return Err(DashboardError::Conflict(
                "A submission for this KYC is already in progress".to_string(),
            ));
        }

        let update = KycUpdate {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            status: record.status,
            comments: record.comments.clone().unwrap_or_default(),
        };

        self.in_flight.insert(update.id.clone());
        self.errors.remove(id);
        Ok(update)
    }

    /// Submitting → Idle, recording the outcome's message if any.
    pub fn finish_submit(&mut self, id: &str, outcome: &SubmitOutcome) {
        self.in_flight.remove(id);
        match outcome.error_message() {
            Some(message) => {
                self.errors.insert(id.to_string(), message);
            }
            None => {
                self.errors.remove(id);
            }
        }
    }

    pub fn cards(&self) -> Vec<KycCard> {
        self.records
            .iter()
            .map(|record| KycCard {
                record: record.clone(),
                details: record.details(),
                submitting: self.is_submitting(&record.id),
                error: self.error(&record.id).map(str::to_string),
            })
            .collect()
    }
}

/// Releases the in-flight marker even if the submitting future is dropped.
struct InFlight<'a> {
    review: &'a KycReview,
    id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.review.workspace().in_flight.remove(&self.id);
    }
}

/// Aborts the spawned write when dropped, so a cancelled submit cannot leave
/// an orphaned write behind its cleared in-flight marker.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Shared handle to one desk's KYC workspace.
pub struct KycReview {
    workspace: Mutex<KycWorkspace>,
    timeout: Duration,
}

impl Default for KycReview {
    fn default() -> Self {
        KycReview::new(SUBMIT_TIMEOUT)
    }
}

impl KycReview {
    pub fn new(timeout: Duration) -> Self {
        KycReview {
            workspace: Mutex::new(KycWorkspace::default()),
            timeout,
        }
    }

    fn workspace(&self) -> MutexGuard<'_, KycWorkspace> {
        self.workspace.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cards(&self) -> Vec<KycCard> {
        self.workspace().cards()
    }

    /// Replaces the list with the store's matches. On failure the previous
    /// list is kept.
    pub async fn search(
        &self,
        store: &dyn DocumentStore,
        mode: KycSearchMode,
        query: &str,
    ) -> Result<usize, DashboardError> {
        let result = match mode {
            KycSearchMode::Email => store.kyc_by_email(query).await,
            KycSearchMode::Status => store.kyc_by_status(query).await,
        };

        match result {
            Ok(records) => {
                let count = records.len();
                self.workspace().replace(records);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching KYC data: {}", e);
                Err(e)
            }
        }
    }

    pub fn edit(&self, id: &str, edit: KycEdit) -> Result<(), DashboardError> {
        if self.workspace().edit(id, &edit) {
            Ok(())
        } else {
            Err(DashboardError::not_found("KYC not found"))
        }
    }

    /// Writes the record's current status and comments, racing the write
    /// against the timeout. A write that loses the race, or whose submit is
    /// dropped, is aborted, so its result can never reach the store.
    pub async fn submit(
        &self,
        store: Arc<dyn DocumentStore>,
        id: &str,
    ) -> Result<SubmitOutcome, DashboardError> {
        let update = self.workspace().begin_submit(id)?;
        let _in_flight = InFlight {
            review: self,
            id: update.id.clone(),
        };

        let payload = update.clone();
        // Declared after the marker so it is dropped, and aborted, first.
        let mut write = AbortOnDrop(tokio::spawn(async move { store.merge_kyc(&payload).await }));

        let outcome = match tokio::time::timeout(self.timeout, &mut write.0).await {
            Ok(Ok(Ok(()))) => {
                info!("KYC {} updated to {}", update.id, update.status);
                SubmitOutcome::Success
            }
            Ok(Ok(Err(e))) => {
                error!("KYC {} update failed: {}", update.id, e);
                SubmitOutcome::Failed(e.to_string())
            }
            Ok(Err(join_error)) => {
                error!("KYC {} update task failed: {}", update.id, join_error);
                SubmitOutcome::Failed(join_error.to_string())
            }
            Err(_) => {
                write.0.abort();
                warn!("KYC {} update timed out after {:?}", update.id, self.timeout);
                SubmitOutcome::TimedOut
            }
        };

        self.workspace().finish_submit(&update.id, &outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryStore, kyc};
    use rstest::rstest;
    use std::sync::atomic::Ordering;

    fn records() -> Vec<KycRecord> {
        vec![
            kyc("k1", "u1", KycStatus::Submitted),
            kyc("k2", "u2", KycStatus::UnderReview),
            kyc("k3", "u3", KycStatus::Verified),
        ]
    }

    #[test]
    fn edit_touches_only_the_target() {
        let records = records();
        let edited = apply_edit(records.clone(), "k2", &KycEdit::Status(KycStatus::VerificationFailed));

        assert_eq!(edited[0], records[0]);
        assert_eq!(edited[2], records[2]);
        assert_eq!(edited[1].status, KycStatus::VerificationFailed);
        assert_eq!(edited[1].comments, records[1].comments);
    }

    #[test]
    fn unknown_id_leaves_list_unchanged() {
        let records = records();
        let mut workspace = KycWorkspace::default();
        workspace.replace(records.clone());

        assert!(!workspace.edit("missing", &KycEdit::Comments("x".into())));
        assert_eq!(workspace.records(), records.as_slice());
    }

    #[test]
    fn second_submit_for_same_record_is_rejected() {
        let mut workspace = KycWorkspace::default();
        workspace.replace(records());

        let update = workspace.begin_submit("k1").expect("first submit");
        assert_eq!(update.comments, "");
        assert!(matches!(workspace.begin_submit("k1"), Err(DashboardError::Conflict(_))));
        assert!(workspace.begin_submit("k2").is_ok());
    }

    #[rstest]
    #[case(SubmitOutcome::Success, None)]
    #[case(SubmitOutcome::TimedOut, Some(TIMEOUT_MESSAGE.to_string()))]
    #[case(SubmitOutcome::Failed("boom".into()), Some("Error updating status: boom".to_string()))]
    fn outcome_messages(#[case] outcome: SubmitOutcome, #[case] expected: Option<String>) {
        assert_eq!(outcome.error_message(), expected);
    }

    #[tokio::test]
    async fn search_replaces_list_and_keeps_it_on_failure() {
        let store = MemoryStore::with_records(records());
        let review = KycReview::default();

        let found = review
            .search(&store, KycSearchMode::Status, "Submitted")
            .await
            .expect("search");
        assert_eq!(found, 1);
        assert_eq!(review.cards()[0].record.id, "k1");

        store.fail_reads.store(true, Ordering::SeqCst);
        assert!(review.search(&store, KycSearchMode::Email, "a@b.c").await.is_err());
        assert_eq!(review.cards().len(), 1);
    }

    #[tokio::test]
    async fn submit_writes_once_for_the_edited_record() {
        let store = Arc::new(MemoryStore::with_records(records()));
        let review = KycReview::default();
        review.workspace().replace(records());

        review.edit("k3", KycEdit::Status(KycStatus::Reviewed)).expect("edit");
        review.edit("k3", KycEdit::Comments("docs ok".into())).expect("edit");

        let outcome = review.submit(store.clone(), "k3").await.expect("submit");
        assert_eq!(outcome, SubmitOutcome::Success);

        let merges = store.merges();
        assert_eq!(
            merges,
            vec![KycUpdate {
                id: "k3".into(),
                user_id: "u3".into(),
                status: KycStatus::Reviewed,
                comments: "docs ok".into(),
            }]
        );

        let cards = review.cards();
        assert!(cards.iter().all(|c| !c.submitting && c.error.is_none()));
        assert_eq!(cards[2].record.status, KycStatus::Reviewed);
    }

    #[tokio::test]
    async fn rejected_write_reports_reason() {
        let store = Arc::new(MemoryStore::with_records(records()));
        store.fail_writes.store(true, Ordering::SeqCst);
        let review = KycReview::default();
        review.workspace().replace(records());

        let outcome = review.submit(store, "k1").await.expect("submit");
        assert_eq!(outcome, SubmitOutcome::Failed("write refused".into()));
        assert_eq!(
            review.cards()[0].error.as_deref(),
            Some("Error updating status: write refused")
        );
        assert!(!review.cards()[0].submitting);
    }

    #[tokio::test]
    async fn timeout_wins_and_late_write_is_discarded() {
        let store = Arc::new(
            MemoryStore::with_records(records()).with_write_delay(Duration::from_millis(200)),
        );
        let review = KycReview::new(Duration::from_millis(20));
        review.workspace().replace(records());

        let outcome = review.submit(store.clone(), "k2").await.expect("submit");
        assert_eq!(outcome, SubmitOutcome::TimedOut);

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(store.merges().is_empty());
        let card = &review.cards()[1];
        assert!(!card.submitting);
        assert_eq!(card.error.as_deref(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn dropped_submit_cancels_its_write() {
        let store = Arc::new(
            MemoryStore::with_records(records()).with_write_delay(Duration::from_millis(100)),
        );
        let review = KycReview::new(Duration::from_secs(5));
        review.workspace().replace(records());

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), review.submit(store.clone(), "k1")).await;
        assert!(cancelled.is_err());
        assert!(!review.cards()[0].submitting);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(store.merges().is_empty());

        let outcome = review.submit(store.clone(), "k1").await.expect("resubmit");
        assert_eq!(outcome, SubmitOutcome::Success);
        assert_eq!(store.merges().len(), 1);
    }

    #[tokio::test]
    async fn slow_write_does_not_block_other_records() {
        let store = Arc::new(
            MemoryStore::with_records(records()).with_write_delay(Duration::from_millis(100)),
        );
        let review = Arc::new(KycReview::default());
        review.workspace().replace(records());

        let slow = {
            let review = review.clone();
            let store = store.clone();
            tokio::spawn(async move { review.submit(store, "k1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(review.cards()[0].submitting);
        assert!(matches!(
            review.submit(store.clone(), "k1").await,
            Err(DashboardError::Conflict(_))
        ));

        let other = review.submit(store.clone(), "k2").await.expect("submit");
        assert_eq!(other, SubmitOutcome::Success);

        let first = slow.await.expect("join").expect("submit");
        assert_eq!(first, SubmitOutcome::Success);
        assert_eq!(store.merges().len(), 2);
    }
}
