use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars::JsonSchema;

/// Raw revenue payload: workshop id → variant id → variant body.
/// A variant body mixes `variant_description` with subvariant objects.
pub type RevenuePayload = IndexMap<String, IndexMap<String, IndexMap<String, serde_json::Value>>>;

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct SubvariantRevenue {
    #[serde(default)]
    subvariant_description: Option<String>,
    price: f64,
    #[serde(default)]
    capacity: u64,
    #[serde(default)]
    quantity: u64,
    #[serde(default)]
    subtotal: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SoldLevel {
    Full,
    High,
    Ok,
}

impl SoldLevel {
    pub fn classify(sold: u64, capacity: u64) -> Self {
        if sold == capacity {
            SoldLevel::Full
        } else if sold * 5 > capacity * 4 {
            SoldLevel::High
        } else {
            SoldLevel::Ok
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, JsonSchema)]
pub struct RevenueRow {
    pub variant_id: String,
    pub variant_description: Option<String>,
    pub subvariant_id: String,
    pub subvariant_description: Option<String>,
    pub price: f64,
    pub capacity: u64,
    pub sold: u64,
    pub revenue: f64,
    pub level: SoldLevel,
}

#[derive(Debug, Serialize, Clone, PartialEq, JsonSchema)]
pub struct RevenueTable {
    pub workshop_id: String,
    pub rows: Vec<RevenueRow>,
    pub total_revenue: f64,
    pub total_tickets: u64,
    pub total_capacity: u64,
    /// Percentage with one decimal; zero when there is no capacity.
    pub fill_rate: f64,
}

impl RevenueTable {
    /// Builds the table for one workshop, `None` when the payload has no entry for it.
    pub fn from_payload(workshop_id: &str, payload: &RevenuePayload) -> Option<Self> {
        let variants = payload.get(workshop_id)?;
        let mut rows = Vec::new();

        for (variant_id, variant) in variants {
            let variant_description = variant
                .get("variant_description")
                .and_then(|v| v.as_str())
                .map(str::to_string);

            for (subvariant_id, value) in variant {
                if !value.is_object() || value.get("price").is_none() {
                    continue;
                }
                let Ok(sub) = serde_json::from_value::<SubvariantRevenue>(value.clone()) else {
                    continue;
                };
                rows.push(RevenueRow {
                    variant_id: variant_id.clone(),
                    variant_description: variant_description.clone(),
                    subvariant_id: subvariant_id.clone(),
                    subvariant_description: sub.subvariant_description,
                    price: sub.price,
                    capacity: sub.capacity,
                    sold: sub.quantity,
                    revenue: sub.subtotal,
                    level: SoldLevel::classify(sub.quantity, sub.capacity),
                });
            }
        }

        let total_revenue = rows.iter().map(|r| r.revenue).sum();
        let total_tickets = rows.iter().map(|r| r.sold).sum();
        let total_capacity = rows.iter().map(|r| r.capacity).sum();

        Some(RevenueTable {
            workshop_id: workshop_id.to_string(),
            rows,
            total_revenue,
            total_tickets,
            total_capacity,
            fill_rate: fill_rate(total_tickets, total_capacity),
        })
    }
}

fn fill_rate(tickets: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let percent = tickets as f64 / capacity as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn payload() -> RevenuePayload {
        serde_json::from_value(json!({
            "ws_1": {
                "v2": {
                    "variant_description": "Evening batch",
                    "s1": { "subvariant_description": "Early bird", "price": 400.0, "capacity": 10, "quantity": 10, "subtotal": 4000.0 },
                },
                "v1": {
                    "variant_description": "Morning batch",
                    "s1": { "subvariant_description": "Regular", "price": 500.0, "capacity": 20, "quantity": 17, "subtotal": 8500.0 },
                    "s2": { "subvariant_description": "VIP", "price": 900.0, "capacity": 5, "quantity": 1, "subtotal": 900.0 },
                    "notes": "ignored",
                },
            }
        }))
        .expect("deserialize")
    }

    #[test]
    fn rows_keep_payload_order_and_totals_add_up() {
        let table = RevenueTable::from_payload("ws_1", &payload()).expect("workshop present");

        let ids: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.variant_id.as_str(), r.subvariant_id.as_str()))
            .collect();
        assert_eq!(ids, vec![("v2", "s1"), ("v1", "s1"), ("v1", "s2")]);
        assert_eq!(table.total_revenue, 13400.0);
        assert_eq!(table.total_tickets, 28);
        assert_eq!(table.total_capacity, 35);
        assert_eq!(table.fill_rate, 80.0);
    }

    #[test]
    fn missing_workshop_yields_none() {
        assert!(RevenueTable::from_payload("ws_2", &payload()).is_none());
    }

    #[rstest]
    #[case(10, 10, SoldLevel::Full)]
    #[case(17, 20, SoldLevel::High)]
    #[case(16, 20, SoldLevel::Ok)]
    #[case(0, 0, SoldLevel::Full)]
    fn sold_level_thresholds(#[case] sold: u64, #[case] capacity: u64, #[case] level: SoldLevel) {
        assert_eq!(SoldLevel::classify(sold, capacity), level);
    }

    #[test]
    fn fill_rate_is_zero_without_capacity() {
        assert_eq!(fill_rate(3, 0), 0.0);
        assert_eq!(fill_rate(1, 3), 33.3);
    }
}
