//! Page Surface Capabilities
//!
//! What the tracker needs from a rendering surface: find cards, read their
//! titles, inject and update toggles. The browser implementation lives in
//! `dom`; tests use an in-memory fake.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::ProgressResult;

pub const LABEL_COMPLETED: &str = "Completed";
pub const LABEL_INCOMPLETE: &str = "Mark as Completed";

/// Label shown next to the checkbox
pub fn toggle_label(completed: bool) -> &'static str {
    if completed {
        LABEL_COMPLETED
    } else {
        LABEL_INCOMPLETE
    }
}

/// Called with the toggle that changed and its new checked state
pub type ChangeHandler<T> = Rc<dyn Fn(&T, bool)>;

/// Enumerates trackable cards
pub trait CardSource {
    type Card: Clone + 'static;

    fn cards(&self) -> Vec<Self::Card>;
}

/// Reads a card's display title
pub trait TitleExtractor: CardSource {
    /// Raw title text, `None` when the card has no title element
    fn title(&self, card: &Self::Card) -> Option<String>;
}

/// Builds and updates the completion toggle inside a card
pub trait ToggleRenderer: CardSource {
    type Toggle: Clone + 'static;

    /// Whether the card already carries a toggle container
    fn has_toggle(&self, card: &Self::Card) -> bool;

    /// Inject a toggle reflecting `checked` and wire `on_change` to it
    fn render_toggle(
        &self,
        card: &Self::Card,
        checked: bool,
        on_change: ChangeHandler<Self::Toggle>,
    ) -> ProgressResult<Self::Toggle>;

    fn set_label(&self, toggle: &Self::Toggle, text: &str);

    fn set_completed_marker(&self, card: &Self::Card, completed: bool);

    /// Show the transient celebration, removed after `delay_ms`
    fn celebrate(&self, toggle: &Self::Toggle, delay_ms: u32) -> CelebrationHandle;

    /// Add the shared stylesheet once
    fn inject_styles(&self);
}

/// Everything the tracker needs
pub trait PageSurface: TitleExtractor + ToggleRenderer {}

impl<T: TitleExtractor + ToggleRenderer> PageSurface for T {}

/// Pending removal of a celebration element.
///
/// Dropping the handle or calling `cancel` stops a removal that has not run
/// yet. The surface clears the shared flag when its timer fires.
pub struct CelebrationHandle {
    pending: Rc<Cell<bool>>,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl CelebrationHandle {
    pub fn new(pending: Rc<Cell<bool>>, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            pending,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a celebration that never got scheduled
    pub fn finished() -> Self {
        Self {
            pending: Rc::new(Cell::new(false)),
            cancel: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if self.pending.replace(false) {
            if let Some(cancel) = self.cancel.take() {
                cancel();
            }
        }
    }
}

impl Drop for CelebrationHandle {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for CelebrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CelebrationHandle")
            .field("pending", &self.is_pending())
            .finish()
    }
}
