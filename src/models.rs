//! Progress Models
//!
//! Data structures persisted under the progress storage key.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Completion state of a tracked item.
///
/// Only one state exists today; the field is kept so the payload can grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    #[default]
    Completed,
}

/// Persisted fact that an item was marked completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// ISO-8601 timestamp, kept verbatim as read from storage
    pub completed_at: String,
    pub status: CompletionStatus,
    /// Fields written by other versions, kept so saves don't erase them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompletionRecord {
    /// Record completed at `at`, formatted like `2024-01-01T00:00:00.000Z`
    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self {
            completed_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            status: CompletionStatus::Completed,
            extra: Map::new(),
        }
    }
}

/// Item id -> completion record. Presence means completed.
pub type ProgressMap = BTreeMap<String, CompletionRecord>;

/// ECMAScript `WhiteSpace` and `LineTerminator` code points
fn is_js_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\u{9}'..='\u{D}'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Trim with the same character set as `String.prototype.trim`,
/// so ids match the ones saved by earlier builds of the site.
pub fn js_trim(text: &str) -> &str {
    text.trim_matches(is_js_whitespace)
}

/// Derive an item id from its display title.
///
/// Lowercases, trims, then collapses every run of characters outside
/// `[a-z0-9]` into a single `-`. Edge hyphens are kept.
pub fn generate_id(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut id = String::with_capacity(lowered.len());
    let mut in_run = false;
    for ch in js_trim(&lowered).chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            id.push(ch);
            in_run = false;
        } else if !in_run {
            id.push('-');
            in_run = true;
        }
    }
    id
}
