//! In-memory page surface for tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::{ProgressError, ProgressResult};
use crate::surface::{
    toggle_label, CardSource, CelebrationHandle, ChangeHandler, TitleExtractor, ToggleRenderer,
};

/// Card with an optional title, marker classes and injected toggles
#[derive(Clone)]
pub struct FakeCard(Rc<RefCell<CardState>>);

struct CardState {
    title: Option<String>,
    has_body: bool,
    broken: bool,
    classes: BTreeSet<String>,
    toggles: Vec<FakeToggle>,
}

impl FakeCard {
    fn with_title(title: Option<String>) -> Self {
        Self(Rc::new(RefCell::new(CardState {
            title,
            has_body: false,
            broken: false,
            classes: BTreeSet::new(),
            toggles: Vec::new(),
        })))
    }

    pub fn titled(title: &str) -> Self {
        Self::with_title(Some(title.to_string()))
    }

    pub fn untitled() -> Self {
        Self::with_title(None)
    }

    /// Card has a body element to insert into
    pub fn with_body(self) -> Self {
        self.0.borrow_mut().has_body = true;
        self
    }

    /// Rendering a toggle into this card fails
    pub fn broken(self) -> Self {
        self.0.borrow_mut().broken = true;
        self
    }

    pub fn toggle_count(&self) -> usize {
        self.0.borrow().toggles.len()
    }

    pub fn toggle(&self, index: usize) -> FakeToggle {
        self.0.borrow().toggles[index].clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.contains(class)
    }
}

/// Checkbox + label + celebration slot
#[derive(Clone)]
pub struct FakeToggle(Rc<RefCell<ToggleState>>);

struct ToggleState {
    checked: bool,
    label: String,
    in_body: bool,
    confetti: usize,
    handler: ChangeHandler<FakeToggle>,
}

impl FakeToggle {
    pub fn checked(&self) -> bool {
        self.0.borrow().checked
    }

    pub fn label(&self) -> String {
        self.0.borrow().label.clone()
    }

    pub fn in_body(&self) -> bool {
        self.0.borrow().in_body
    }

    pub fn confetti(&self) -> usize {
        self.0.borrow().confetti
    }
}

struct FakeTimer {
    due_ms: u64,
    pending: Rc<Cell<bool>>,
    toggle: FakeToggle,
}

/// Surface over `FakeCard`s with a manual clock for celebration timers
#[derive(Clone, Default)]
pub struct FakeSurface {
    cards: Rc<RefCell<Vec<FakeCard>>>,
    style_injections: Rc<Cell<usize>>,
    styles_present: Rc<Cell<bool>>,
    now_ms: Rc<Cell<u64>>,
    timers: Rc<RefCell<Vec<FakeTimer>>>,
    scheduled: Rc<Cell<usize>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(&self, card: FakeCard) -> FakeCard {
        self.cards.borrow_mut().push(card.clone());
        card
    }

    /// Number of style blocks actually added
    pub fn style_injections(&self) -> usize {
        self.style_injections.get()
    }

    /// Total celebrations ever scheduled
    pub fn scheduled_celebrations(&self) -> usize {
        self.scheduled.get()
    }

    /// Simulate the user setting the checkbox and the change event firing
    pub fn change(&self, toggle: &FakeToggle, checked: bool) {
        let handler = {
            let mut state = toggle.0.borrow_mut();
            state.checked = checked;
            Rc::clone(&state.handler)
        };
        handler(toggle, checked);
    }

    /// Advance the clock, firing due timers that were not cancelled
    pub fn advance(&self, ms: u64) {
        let now = self.now_ms.get() + ms;
        self.now_ms.set(now);

        let due: Vec<FakeTimer> = {
            let mut timers = self.timers.borrow_mut();
            let (due, waiting): (Vec<FakeTimer>, Vec<FakeTimer>) =
                timers.drain(..).partition(|timer| timer.due_ms <= now);
            *timers = waiting;
            due
        };
        for timer in due {
            if timer.pending.replace(false) {
                let mut state = timer.toggle.0.borrow_mut();
                state.confetti = state.confetti.saturating_sub(1);
            }
        }
    }
}

impl CardSource for FakeSurface {
    type Card = FakeCard;

    fn cards(&self) -> Vec<FakeCard> {
        self.cards.borrow().clone()
    }
}

impl TitleExtractor for FakeSurface {
    fn title(&self, card: &FakeCard) -> Option<String> {
        card.0.borrow().title.clone()
    }
}

impl ToggleRenderer for FakeSurface {
    type Toggle = FakeToggle;

    fn has_toggle(&self, card: &FakeCard) -> bool {
        !card.0.borrow().toggles.is_empty()
    }

    fn render_toggle(
        &self,
        card: &FakeCard,
        checked: bool,
        on_change: ChangeHandler<FakeToggle>,
    ) -> ProgressResult<FakeToggle> {
        let mut state = card.0.borrow_mut();
        if state.broken {
            return Err(ProgressError::Surface("card is detached".to_string()));
        }
        let toggle = FakeToggle(Rc::new(RefCell::new(ToggleState {
            checked,
            label: toggle_label(checked).to_string(),
            in_body: state.has_body,
            confetti: 0,
            handler: on_change,
        })));
        state.toggles.push(toggle.clone());
        Ok(toggle)
    }

    fn set_label(&self, toggle: &FakeToggle, text: &str) {
        toggle.0.borrow_mut().label = text.to_string();
    }

    fn set_completed_marker(&self, card: &FakeCard, completed: bool) {
        let mut state = card.0.borrow_mut();
        if completed {
            state.classes.insert("course-completed".to_string());
        } else {
            state.classes.remove("course-completed");
        }
    }

    fn celebrate(&self, toggle: &FakeToggle, delay_ms: u32) -> CelebrationHandle {
        toggle.0.borrow_mut().confetti += 1;
        self.scheduled.set(self.scheduled.get() + 1);

        let pending = Rc::new(Cell::new(true));
        self.timers.borrow_mut().push(FakeTimer {
            due_ms: self.now_ms.get() + u64::from(delay_ms),
            pending: Rc::clone(&pending),
            toggle: toggle.clone(),
        });
        CelebrationHandle::new(pending, || {})
    }

    fn inject_styles(&self) {
        if self.styles_present.replace(true) {
            return;
        }
        self.style_injections.set(self.style_injections.get() + 1);
    }
}
