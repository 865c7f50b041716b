//! Progress Configuration
//!
//! Selectors, storage key and timings. Every field has a default so a page
//! can override only what differs.

use serde::Deserialize;

use crate::error::ProgressError;

/// Id of the optional `<script type="application/json">` override block
pub const CONFIG_ELEMENT_ID: &str = "progress-manager-config";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressConfig {
    /// localStorage key holding the serialized progress map
    pub storage_key: String,
    /// Elements eligible for a completion toggle
    pub card_selector: String,
    /// Title element looked up inside each card
    pub title_selector: String,
    /// Preferred insertion point inside a card
    pub body_selector: String,
    /// Id of the injected `<style>` block
    pub style_element_id: String,
    /// Lifetime of the celebration element
    pub celebration_delay_ms: u32,
    /// Cards whose trimmed title is shorter than this are skipped
    pub min_title_len: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            storage_key: "skillwise_user_progress".to_string(),
            card_selector: ".course-card, .card".to_string(),
            title_selector: ".title-lg, .course-title, h3".to_string(),
            body_selector: "div:nth-child(2)".to_string(),
            style_element_id: "progress-manager-styles".to_string(),
            celebration_delay_ms: 1000,
            min_title_len: 2,
        }
    }
}

impl ProgressConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, ProgressError> {
        serde_json::from_str(json).map_err(|e| ProgressError::Config(e.to_string()))
    }
}
