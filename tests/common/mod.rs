//! Common test utilities

use chrono::NaiveDate;
use gridbase_core::{FieldMeta, FieldType, FilterConfig, MemoryStore, Operator, TableRow};
use serde_json::{json, Map, Value};

/// Fixed "today" used by every relative-date assertion.
#[allow(dead_code)] // Test utility for integration tests
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

/// Field metadata for the shared `deals` fixture table.
#[allow(dead_code)]
pub fn deal_fields() -> Vec<FieldMeta> {
    vec![
        FieldMeta::new("title", FieldType::Text),
        FieldMeta::new("stage", FieldType::SingleSelect).with_choices(&["Lead", "Qualified", "Won"]),
        FieldMeta::new("tags", FieldType::MultiSelect).with_choices(&["hot", "west", "east"]),
        FieldMeta::new("amount", FieldType::Number),
        FieldMeta::new("close_date", FieldType::Date),
        FieldMeta::new("archived", FieldType::Checkbox),
        FieldMeta::new("forecast", FieldType::Formula),
    ]
}

/// Build a row from field/value pairs.
#[allow(dead_code)]
pub fn row(id: &str, pairs: &[(&str, Value)]) -> TableRow {
    let data: Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect();
    TableRow::new(id, data)
}

/// A store pre-seeded with the `deals` fixture.
#[allow(dead_code)] // Test utility for integration tests
pub fn seeded_deals_store() -> MemoryStore {
    let store = MemoryStore::new().with_today(test_today());
    store.seed(
        "deals",
        vec![
            row(
                "d1",
                &[
                    ("title", json!("Acme renewal")),
                    ("stage", json!("Won")),
                    ("tags", json!(["hot", "west"])),
                    ("amount", json!(120)),
                    ("close_date", json!("2024-06-15")),
                    ("archived", json!(false)),
                ],
            ),
            row(
                "d2",
                &[
                    ("title", json!("Globex pilot")),
                    ("stage", json!("Lead")),
                    ("tags", json!(["east"])),
                    ("amount", json!(45)),
                    ("close_date", json!("2024-06-17T09:00:00Z")),
                    ("archived", json!(false)),
                ],
            ),
            row(
                "d3",
                &[
                    ("title", json!("Initech expansion")),
                    ("stage", json!("Qualified")),
                    ("tags", json!([])),
                    ("amount", json!(300)),
                    ("close_date", json!("2024-07-02")),
                    ("archived", json!(true)),
                ],
            ),
            row(
                "d4",
                &[
                    ("title", json!("Umbrella intro")),
                    ("stage", json!("Lead")),
                    ("tags", json!(["hot"])),
                    ("amount", json!(10)),
                    ("close_date", json!(null)),
                    ("archived", json!(false)),
                ],
            ),
        ],
    );
    store.set_table_fields("deals", deal_fields());
    store
}

/// Shorthand for an equality condition.
#[allow(dead_code)]
pub fn eq(field: &str, value: Value) -> FilterConfig {
    FilterConfig::new(field, Operator::Equal, value)
}
