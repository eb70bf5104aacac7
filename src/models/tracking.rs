use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;
use std::collections::BTreeMap;

use crate::utils::CsvRecord;

const TOP_ENTITY_LIMIT: usize = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct TrackingSummary {
    pub total_users: u64,
    pub total_studio_visits: u64,
    pub total_workshop_visits: u64,
}

impl TrackingSummary {
    pub fn total_visits(&self) -> u64 {
        self.total_studio_visits + self.total_workshop_visits
    }
}

/// Entities a single user visited on the tracked day.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct UserVisits {
    #[serde(rename = "ST")]
    pub studios: Vec<String>,
    #[serde(rename = "WK")]
    pub workshops: Vec<String>,
}

/// Body of `crud/tracking/analytics/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct TrackingReport {
    pub summary: TrackingSummary,
    pub users_data: BTreeMap<String, UserVisits>,
    /// `ST_<id>` / `WK_<id>` → visit count. Counts may arrive as strings.
    pub analytics: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum EntityKind {
    #[serde(rename = "ST")]
    Studio,
    #[serde(rename = "WK")]
    Workshop,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Studio => "ST",
            EntityKind::Workshop => "WK",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct RankedEntity {
    pub rank: usize,
    pub entity_id: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct UserVisitRow {
    pub user_id: String,
    pub studio_visits: usize,
    pub workshop_visits: usize,
    pub total_visits: usize,
    pub studios: Vec<String>,
    pub workshops: Vec<String>,
}

fn visit_count(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl TrackingReport {
    /// Most visited entities of one kind, highest count first, at most ten.
    pub fn top_entities(&self, kind: EntityKind) -> Vec<RankedEntity> {
        let prefix = format!("{}_", kind.prefix());
        let mut ranked: Vec<(String, u64)> = self
            .analytics
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .map(|id| (id.to_string(), visit_count(value)))
            })
            .collect();

        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(TOP_ENTITY_LIMIT)
            .enumerate()
            .map(|(index, (entity_id, count))| RankedEntity {
                rank: index + 1,
                entity_id,
                count,
            })
            .collect()
    }

    pub fn user_rows(&self) -> Vec<UserVisitRow> {
        self.users_data
            .iter()
            .map(|(user_id, visits)| UserVisitRow {
                user_id: user_id.clone(),
                studio_visits: visits.studios.len(),
                workshop_visits: visits.workshops.len(),
                total_visits: visits.studios.len() + visits.workshops.len(),
                studios: visits.studios.clone(),
                workshops: visits.workshops.clone(),
            })
            .collect()
    }
}

impl CsvRecord for UserVisitRow {
    const HEADERS: &'static [&'static str] =
        &["User ID", "Studio Visits", "Workshop Visits", "Total Visits"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.studio_visits.to_string(),
            self.workshop_visits.to_string(),
            self.total_visits.to_string(),
        ]
    }
}
