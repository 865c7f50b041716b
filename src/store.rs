//! Progress Store
//!
//! Completion state keyed by item id, loaded once from storage and written
//! back in full on every change.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::ProgressResult;
use crate::models::{CompletionRecord, ProgressMap};
use crate::storage::KeyValueStorage;

pub struct ProgressStore<S> {
    storage: S,
    storage_key: String,
    progress: ProgressMap,
    /// Stored entries that are not records of this version, written back untouched
    foreign: Map<String, Value>,
}

impl<S: KeyValueStorage> ProgressStore<S> {
    /// Read the persisted map under `storage_key`.
    ///
    /// Never fails: a missing, unreadable or malformed payload yields an
    /// empty map. Object entries that are not valid records are kept aside
    /// and saved back as they were.
    pub fn load(storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let (progress, foreign) = match storage.get_item(&storage_key) {
            Ok(Some(payload)) => parse_progress(&payload),
            Ok(None) => (ProgressMap::new(), Map::new()),
            Err(e) => {
                warn!("[progress] Failed to read {}: {}", storage_key, e);
                (ProgressMap::new(), Map::new())
            }
        };
        debug!(
            "[progress] Loaded {} completed items, {} foreign entries",
            progress.len(),
            foreign.len()
        );
        Self {
            storage,
            storage_key,
            progress,
            foreign,
        }
    }

    /// Mark or unmark an item and persist the whole map.
    ///
    /// The in-memory change is kept even when the write fails; the error is
    /// returned to the caller.
    pub fn toggle_item(&mut self, item_id: &str, completed: bool) -> ProgressResult<()> {
        self.toggle_item_at(item_id, completed, Utc::now())
    }

    pub fn toggle_item_at(
        &mut self,
        item_id: &str,
        completed: bool,
        now: DateTime<Utc>,
    ) -> ProgressResult<()> {
        self.foreign.remove(item_id);
        if completed {
            self.progress
                .insert(item_id.to_string(), CompletionRecord::completed_at(now));
        } else {
            self.progress.remove(item_id);
        }
        self.save()
    }

    /// Independent copy of the current records.
    ///
    /// Foreign entries are not part of the snapshot.
    pub fn get_progress(&self) -> ProgressMap {
        self.progress.clone()
    }

    /// A record, or any truthy foreign entry, counts as completed
    pub fn is_completed(&self, item_id: &str) -> bool {
        self.progress.contains_key(item_id) || self.foreign.get(item_id).is_some_and(is_truthy)
    }

    pub fn completed_count(&self) -> usize {
        self.progress.len() + self.foreign.values().filter(|value| is_truthy(value)).count()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn save(&self) -> ProgressResult<()> {
        let mut entries = self.foreign.clone();
        for (item_id, record) in &self.progress {
            entries.insert(item_id.clone(), serde_json::to_value(record)?);
        }
        let payload = serde_json::to_string(&entries)?;
        self.storage.set_item(&self.storage_key, &payload)?;
        Ok(())
    }
}

/// Split a stored payload into valid records and entries kept verbatim
fn parse_progress(payload: &str) -> (ProgressMap, Map<String, Value>) {
    let entries = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(entries)) => entries,
        Ok(other) => {
            warn!("[progress] Ignoring non-object payload ({})", json_kind(&other));
            return (ProgressMap::new(), Map::new());
        }
        Err(e) => {
            warn!("[progress] Ignoring malformed payload: {}", e);
            return (ProgressMap::new(), Map::new());
        }
    };

    let mut progress = ProgressMap::new();
    let mut foreign = Map::new();
    for (item_id, value) in entries {
        match serde_json::from_value::<CompletionRecord>(value.clone()) {
            Ok(record) => {
                progress.insert(item_id, record);
            }
            Err(e) => {
                debug!("[progress] Keeping unrecognized entry {}: {}", item_id, e);
                foreign.insert(item_id, value);
            }
        }
    }
    (progress, foreign)
}

/// JavaScript truthiness
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
