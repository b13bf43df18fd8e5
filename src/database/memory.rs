//! In-process data store
//!
//! Keeps tables as JSON rows in memory and evaluates queries the way the
//! hosted store does: generated ids, column defaults, unique constraints.
//! Used for local runs and for exercising the consoles without a backend.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use super::query::{cell_text, Query};
use super::store::DataStore;
use super::tables;
use crate::utils::errors::{StoreError, StoreResult};
use crate::utils::helpers::generate_uuid;

/// Operation kinds, recorded for inspection and used for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Insert,
    Upsert,
    Update,
    Delete,
}

#[derive(Debug, Default, Clone)]
struct TableSchema {
    unique: Vec<Vec<String>>,
    timestamps: Vec<String>,
    defaults: Map<String, Value>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    schema: HashMap<String, TableSchema>,
    failures: HashSet<(StoreOp, String)>,
    log: Vec<(StoreOp, String)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Empty store without schema information
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the defaults and constraints of the StallBoard tables
    pub fn with_schema() -> Self {
        let store = Self::new();
        store.define(tables::ORGANIZERS, &["created_at"], &[], serde_json::json!({"is_approved": false}));
        store.define(tables::ORGANIZER_MEMBERS, &["joined_at"], &[&["organizer_id", "line_user_id"]], Value::Null);
        store.define(
            tables::ORGANIZER_INVITATIONS,
            &["created_at"],
            &[&["code"]],
            serde_json::json!({"status": "active"}),
        );
        store.define(
            tables::EVENTS,
            &["created_at"],
            &[],
            serde_json::json!({"is_published": false, "additional_image_urls": []}),
        );
        store.define(tables::EXHIBITORS, &["created_at"], &[&["line_user_id"]], Value::Null);
        store.define(
            tables::EVENT_APPLICATIONS,
            &["applied_at"],
            &[&["event_id", "exhibitor_id"]],
            serde_json::json!({"status": "pending"}),
        );
        store.define(tables::FORM_DRAFTS, &["updated_at"], &[&["user_id", "form_type"]], Value::Null);
        store
    }

    /// Register defaults, generated timestamps and unique keys for a table
    pub fn define(&self, table: &str, timestamps: &[&str], unique: &[&[&str]], defaults: Value) {
        let schema = TableSchema {
            unique: unique
                .iter()
                .map(|cols| cols.iter().map(|c| c.to_string()).collect())
                .collect(),
            timestamps: timestamps.iter().map(|c| c.to_string()).collect(),
            defaults: match defaults {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };
        self.lock().schema.insert(table.to_string(), schema);
    }

    /// Insert rows directly, bypassing failure injection and the operation log
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut inner = self.lock();
        let schema = inner.schema.get(table).cloned().unwrap_or_default();
        let prepared: Vec<Value> = rows.into_iter().map(|row| prepare_row(&schema, row)).collect();
        inner.tables.entry(table.to_string()).or_default().extend(prepared);
    }

    /// Snapshot of a table's rows
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Make every `op` on `table` fail until cleared
    pub fn fail_on(&self, op: StoreOp, table: &str) {
        self.lock().failures.insert((op, table.to_string()));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Operations performed so far, in order
    pub fn operations(&self) -> Vec<(StoreOp, String)> {
        self.lock().log.clone()
    }

    /// Number of `op` calls against `table`
    pub fn count(&self, op: StoreOp, table: &str) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|(o, t)| *o == op && t == table)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn begin(&mut self, op: StoreOp, table: &str) -> StoreResult<()> {
        self.log.push((op, table.to_string()));
        if self.failures.contains(&(op, table.to_string())) {
            return Err(StoreError::RequestFailed(format!(
                "injected failure for {:?} on {}",
                op, table
            )));
        }
        Ok(())
    }

    fn check_unique(&self, table: &str, candidate: &Value, skip: Option<usize>) -> StoreResult<()> {
        let Some(schema) = self.schema.get(table) else {
            return Ok(());
        };
        let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);

        for key in &schema.unique {
            let clash = rows.iter().enumerate().any(|(idx, row)| {
                Some(idx) != skip
                    && key.iter().all(|col| {
                        let value = cell_text(candidate, col);
                        value.is_some() && value == cell_text(row, col)
                    })
            });
            if clash {
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                });
            }
        }
        Ok(())
    }

    fn insert_row(&mut self, table: &str, payload: Value) -> StoreResult<Value> {
        let schema = self.schema.get(table).cloned().unwrap_or_default();
        let row = prepare_row(&schema, payload);
        self.check_unique(table, &row, None)?;
        self.tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(row)
    }
}

fn prepare_row(schema: &TableSchema, payload: Value) -> Value {
    let mut row = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    row.entry("id").or_insert_with(|| Value::String(generate_uuid()));
    for (column, value) in &schema.defaults {
        row.entry(column.clone()).or_insert_with(|| value.clone());
    }
    for column in &schema.timestamps {
        row.entry(column.clone())
            .or_insert_with(|| serde_json::to_value(Utc::now()).unwrap_or(Value::Null));
    }

    Value::Object(row)
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Value>> {
        let mut inner = self.lock();
        inner.begin(StoreOp::Select, &query.table)?;

        let mut rows: Vec<Value> = inner
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();

        query.sort(&mut rows);
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, payload: Value) -> StoreResult<Value> {
        let mut inner = self.lock();
        inner.begin(StoreOp::Insert, table)?;
        inner.insert_row(table, payload)
    }

    async fn upsert(&self, table: &str, payload: Value, on_conflict: &[&str]) -> StoreResult<Value> {
        let mut inner = self.lock();
        inner.begin(StoreOp::Upsert, table)?;

        let existing = inner.tables.get(table).and_then(|rows| {
            rows.iter().position(|row| {
                on_conflict
                    .iter()
                    .all(|col| cell_text(row, col).is_some() && cell_text(row, col) == cell_text(&payload, col))
            })
        });

        match existing {
            Some(idx) => {
                let rows = inner.tables.entry(table.to_string()).or_default();
                merge(&mut rows[idx], &payload);
                Ok(rows[idx].clone())
            }
            None => inner.insert_row(table, payload),
        }
    }

    async fn update(&self, query: &Query, payload: Value) -> StoreResult<Vec<Value>> {
        let mut inner = self.lock();
        inner.begin(StoreOp::Update, &query.table)?;

        let matching: Vec<usize> = inner
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .enumerate()
                    .filter(|(_, row)| query.matches(row))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .unwrap_or_default();

        for &idx in &matching {
            let mut candidate = inner.tables[&query.table][idx].clone();
            merge(&mut candidate, &payload);
            inner.check_unique(&query.table, &candidate, Some(idx))?;
        }

        let rows = inner.tables.entry(query.table.clone()).or_default();
        let mut updated = Vec::with_capacity(matching.len());
        for idx in matching {
            merge(&mut rows[idx], &payload);
            updated.push(rows[idx].clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> StoreResult<usize> {
        let mut inner = self.lock();
        inner.begin(StoreOp::Delete, &query.table)?;

        let Some(rows) = inner.tables.get_mut(&query.table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !query.matches(row));
        Ok(before - rows.len())
    }
}
