//! SkillWise Progress
//!
//! Lets visitors mark course cards as completed. State lives in
//! `localStorage` and is reflected by a checkbox injected into each card.
//!
//! Layers:
//! - models/store: completion records and their persistence
//! - surface: what the tracker needs from a page (traits)
//! - tracker: card binding and toggle handling
//! - dom: the `web_sys` surface

pub mod config;
pub mod dom;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod surface;
pub mod tracker;

#[cfg(test)]
mod testing;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

pub use config::ProgressConfig;
pub use error::{ProgressError, ProgressResult, StorageError};
pub use models::{generate_id, CompletionRecord, CompletionStatus, ProgressMap};
pub use storage::{KeyValueStorage, LocalStorage, MemoryStorage};
pub use store::ProgressStore;
pub use tracker::ProgressTracker;

use config::CONFIG_ELEMENT_ID;
use dom::DomSurface;

/// Bind the progress tracker to the current page.
///
/// Runs immediately when the document is parsed, otherwise on
/// `DOMContentLoaded`. Without usable `localStorage` progress is kept in
/// memory for the lifetime of the page.
pub fn start() {
    let config = page_config();
    match LocalStorage::open() {
        Ok(storage) => start_with(storage, config),
        Err(e) => {
            warn!("[progress] {}; progress will not persist", e);
            start_with(MemoryStorage::new(), config);
        }
    }
}

fn start_with<S: KeyValueStorage + 'static>(storage: S, config: ProgressConfig) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        warn!("[progress] No document, tracker not started");
        return;
    };

    let page = document.clone();
    let run = move || {
        let store = ProgressStore::load(storage, config.storage_key.clone());
        let surface = DomSurface::new(page, config.clone());
        let tracker = ProgressTracker::new(store, surface, config);
        tracker.init();
    };

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(run);
        if let Err(err) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        {
            warn!(
                "[progress] Failed to wait for DOMContentLoaded: {}",
                storage::js_error_message(&err)
            );
        }
    } else {
        run();
    }
}

/// Config override from `<script type="application/json" id="progress-manager-config">`
fn page_config() -> ProgressConfig {
    let override_json = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());

    let Some(json) = override_json else {
        return ProgressConfig::default();
    };
    match ProgressConfig::from_json(&json) {
        Ok(config) => {
            info!("[progress] Using page config override");
            config
        }
        Err(e) => {
            warn!("[progress] {}; using defaults", e);
            ProgressConfig::default()
        }
    }
}
