//! Progress Tracker
//!
//! Binds completion toggles to cards on a page surface and routes toggle
//! changes into the progress store.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::config::ProgressConfig;
use crate::error::ProgressResult;
use crate::models::{generate_id, js_trim, ProgressMap};
use crate::storage::KeyValueStorage;
use crate::store::ProgressStore;
use crate::surface::{toggle_label, CelebrationHandle, ChangeHandler, PageSurface};

/// Shared handle; clones see the same store and surface
pub struct ProgressTracker<S, P> {
    inner: Rc<TrackerInner<S, P>>,
}

struct TrackerInner<S, P> {
    store: RefCell<ProgressStore<S>>,
    surface: P,
    config: ProgressConfig,
    celebrations: RefCell<Vec<CelebrationHandle>>,
}

impl<S, P> Clone for ProgressTracker<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, P> ProgressTracker<S, P>
where
    S: KeyValueStorage + 'static,
    P: PageSurface + 'static,
{
    pub fn new(store: ProgressStore<S>, surface: P, config: ProgressConfig) -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                store: RefCell::new(store),
                surface,
                config,
                celebrations: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Inject styles and bind every titled card. Returns how many cards were newly bound.
    pub fn init(&self) -> usize {
        let surface = &self.inner.surface;
        surface.inject_styles();

        let mut bound = 0;
        for card in surface.cards() {
            let Some(title) = surface.title(&card) else {
                debug!("[tracker] Skipping card without title");
                continue;
            };
            // Length in UTF-16 units, as the browser reports it
            if js_trim(&title).encode_utf16().count() < self.inner.config.min_title_len {
                debug!("[tracker] Skipping card with short title {:?}", title);
                continue;
            }
            let item_id = generate_id(&title);
            if self.bind_card(&card, &item_id) {
                bound += 1;
            }
        }

        info!(
            "[tracker] Bound {} cards, {} items completed",
            bound,
            self.inner.store.borrow().completed_count()
        );
        bound
    }

    /// Inject a toggle for `item_id` into `card`.
    ///
    /// Returns `false` without touching the card when it already has a
    /// toggle or rendering fails.
    pub fn bind_card(&self, card: &P::Card, item_id: &str) -> bool {
        let surface = &self.inner.surface;
        if surface.has_toggle(card) {
            return false;
        }

        let completed = self.inner.store.borrow().is_completed(item_id);
        let tracker = self.clone();
        let handler_card = card.clone();
        let handler_id = item_id.to_string();
        let on_change: ChangeHandler<P::Toggle> = Rc::new(move |toggle: &P::Toggle, checked: bool| {
            if let Err(e) = tracker.handle_change(&handler_card, toggle, &handler_id, checked) {
                error!("[tracker] Failed to save progress for {}: {}", handler_id, e);
            }
        });

        match surface.render_toggle(card, completed, on_change) {
            Ok(_) => {
                if completed {
                    surface.set_completed_marker(card, true);
                }
                debug!("[tracker] Bound {} (completed={})", item_id, completed);
                true
            }
            Err(e) => {
                warn!("[tracker] Could not render toggle for {}: {}", item_id, e);
                false
            }
        }
    }

    /// Snapshot of the store
    pub fn progress(&self) -> ProgressMap {
        self.inner.store.borrow().get_progress()
    }

    /// Change state without going through a rendered toggle
    pub fn toggle_item(&self, item_id: &str, completed: bool) -> ProgressResult<()> {
        self.inner.store.borrow_mut().toggle_item(item_id, completed)
    }

    pub fn pending_celebrations(&self) -> usize {
        self.inner
            .celebrations
            .borrow()
            .iter()
            .filter(|handle| handle.is_pending())
            .count()
    }

    /// Cancel every scheduled celebration removal (page teardown)
    pub fn cancel_celebrations(&self) {
        let handles: Vec<CelebrationHandle> = self.inner.celebrations.borrow_mut().drain(..).collect();
        for handle in handles {
            handle.cancel();
        }
    }

    fn handle_change(
        &self,
        card: &P::Card,
        toggle: &P::Toggle,
        item_id: &str,
        completed: bool,
    ) -> ProgressResult<()> {
        self.inner.store.borrow_mut().toggle_item(item_id, completed)?;

        let surface = &self.inner.surface;
        surface.set_label(toggle, toggle_label(completed));
        surface.set_completed_marker(card, completed);
        if completed {
            let handle = surface.celebrate(toggle, self.inner.config.celebration_delay_ms);
            let mut celebrations = self.inner.celebrations.borrow_mut();
            celebrations.retain(CelebrationHandle::is_pending);
            celebrations.push(handle);
        }
        Ok(())
    }
}
