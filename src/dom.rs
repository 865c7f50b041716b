//! DOM Surface
//!
//! `web_sys` implementation of the page capabilities: cards are elements
//! matched by the configured selectors, toggles are injected checkboxes.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlInputElement, NodeList};

use crate::config::ProgressConfig;
use crate::error::{ProgressError, ProgressResult};
use crate::storage::js_error_message;
use crate::surface::{
    toggle_label, CardSource, CelebrationHandle, ChangeHandler, TitleExtractor, ToggleRenderer,
};

pub const TOGGLE_CONTAINER_CLASS: &str = "progress-toggle-container";
pub const CHECKBOX_LABEL_CLASS: &str = "progress-checkbox-label";
pub const CHECKBOX_CLASS: &str = "progress-checkbox";
pub const COMPLETED_CLASS: &str = "course-completed";
pub const CONFETTI_CLASS: &str = "completion-confetti";
const CONFETTI_TEXT: &str = "🎉";

#[derive(Clone)]
pub struct DomSurface {
    document: Document,
    config: Rc<ProgressConfig>,
}

/// Injected toggle: the container and the label text span
#[derive(Clone)]
pub struct DomToggle {
    container: Element,
    text: Element,
}

impl DomSurface {
    pub fn new(document: Document, config: ProgressConfig) -> Self {
        Self {
            document,
            config: Rc::new(config),
        }
    }

    fn create(&self, tag: &str, class: &str) -> ProgressResult<Element> {
        let element = self.document.create_element(tag).map_err(dom_error)?;
        element.set_class_name(class);
        Ok(element)
    }

    fn create_checkbox(&self, checked: bool) -> ProgressResult<HtmlInputElement> {
        let checkbox = self
            .create("input", CHECKBOX_CLASS)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| ProgressError::Surface("input is not an HtmlInputElement".to_string()))?;
        checkbox.set_type("checkbox");
        checkbox.set_checked(checked);
        Ok(checkbox)
    }
}

impl CardSource for DomSurface {
    type Card = Element;

    fn cards(&self) -> Vec<Element> {
        match self.document.query_selector_all(&self.config.card_selector) {
            Ok(list) => elements(&list),
            Err(err) => {
                warn!("[dom] Bad card selector {:?}: {}", self.config.card_selector, js_error_message(&err));
                Vec::new()
            }
        }
    }
}

impl TitleExtractor for DomSurface {
    fn title(&self, card: &Element) -> Option<String> {
        card.query_selector(&self.config.title_selector)
            .ok()
            .flatten()?
            .text_content()
    }
}

impl ToggleRenderer for DomSurface {
    type Toggle = DomToggle;

    fn has_toggle(&self, card: &Element) -> bool {
        matches!(
            card.query_selector(&format!(".{}", TOGGLE_CONTAINER_CLASS)),
            Ok(Some(_))
        )
    }

    fn render_toggle(
        &self,
        card: &Element,
        checked: bool,
        on_change: ChangeHandler<DomToggle>,
    ) -> ProgressResult<DomToggle> {
        let container = self.create("div", TOGGLE_CONTAINER_CLASS)?;
        let label = self.create("label", CHECKBOX_LABEL_CLASS)?;
        let checkbox = self.create_checkbox(checked)?;
        let text = self.document.create_element("span").map_err(dom_error)?;
        text.set_text_content(Some(toggle_label(checked)));

        let toggle = DomToggle {
            container: container.clone(),
            text: text.clone(),
        };

        let handler_toggle = toggle.clone();
        let input = checkbox.clone();
        let on_input_change = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
            on_change(&handler_toggle, input.checked());
        });
        checkbox
            .add_event_listener_with_callback("change", on_input_change.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        on_input_change.forget();

        label.append_child(&checkbox).map_err(dom_error)?;
        label.append_child(&text).map_err(dom_error)?;
        container.append_child(&label).map_err(dom_error)?;

        // Prefer the card's text block, else the end of the card
        let host = match card.query_selector(&self.config.body_selector) {
            Ok(Some(body)) => body,
            _ => card.clone(),
        };
        host.append_child(&container).map_err(dom_error)?;
        Ok(toggle)
    }

    fn set_label(&self, toggle: &DomToggle, text: &str) {
        toggle.text.set_text_content(Some(text));
    }

    fn set_completed_marker(&self, card: &Element, completed: bool) {
        let classes = card.class_list();
        let result = if completed {
            classes.add_1(COMPLETED_CLASS)
        } else {
            classes.remove_1(COMPLETED_CLASS)
        };
        if let Err(err) = result {
            warn!("[dom] Failed to update completed marker: {}", js_error_message(&err));
        }
    }

    fn celebrate(&self, toggle: &DomToggle, delay_ms: u32) -> CelebrationHandle {
        let confetti = match self.create("span", CONFETTI_CLASS) {
            Ok(el) => el,
            Err(e) => {
                warn!("[dom] Skipping celebration: {}", e);
                return CelebrationHandle::finished();
            }
        };
        confetti.set_text_content(Some(CONFETTI_TEXT));
        if let Err(err) = toggle.container.append_child(&confetti) {
            warn!("[dom] Skipping celebration: {}", js_error_message(&err));
            return CelebrationHandle::finished();
        }

        let pending = Rc::new(Cell::new(true));
        let fired = Rc::clone(&pending);
        // remove() on a detached element is a no-op
        let timeout = Timeout::new(delay_ms, move || {
            fired.set(false);
            confetti.remove();
        });
        CelebrationHandle::new(pending, move || drop(timeout))
    }

    fn inject_styles(&self) {
        let style_id = &self.config.style_element_id;
        if self.document.get_element_by_id(style_id).is_some() {
            return;
        }

        let style = match self.document.create_element("style") {
            Ok(style) => style,
            Err(err) => {
                warn!("[dom] Failed to create style block: {}", js_error_message(&err));
                return;
            }
        };
        style.set_id(style_id);
        style.set_text_content(Some(PROGRESS_STYLES));

        let result = match (self.document.head(), self.document.document_element()) {
            (Some(head), _) => head.append_child(&style),
            (None, Some(root)) => root.append_child(&style),
            (None, None) => {
                warn!("[dom] No document element for styles");
                return;
            }
        };
        if let Err(err) = result {
            warn!("[dom] Failed to inject styles: {}", js_error_message(&err));
        }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn dom_error(err: JsValue) -> ProgressError {
    ProgressError::Surface(js_error_message(&err))
}

const PROGRESS_STYLES: &str = r#"
.progress-toggle-container {
  margin-top: 15px;
  padding-top: 10px;
  border-top: 1px dashed #e0e0e0;
}
.progress-checkbox-label {
  display: flex;
  align-items: center;
  gap: 8px;
  cursor: pointer;
  font-weight: 600;
  color: #555;
  font-size: 0.9rem;
  user-select: none;
}
.progress-checkbox-label:hover {
  color: #28a745;
}
.progress-checkbox {
  accent-color: #28a745;
  width: 18px;
  height: 18px;
  cursor: pointer;
}
.course-completed {
  border: 2px solid #28a745 !important;
  background: linear-gradient(to bottom right, #ffffff, #f0fff4) !important;
  position: relative;
}
.course-completed::after {
  content: '\2713';
  position: absolute;
  top: -10px;
  right: -10px;
  background: #28a745;
  color: white;
  width: 30px;
  height: 30px;
  border-radius: 50%;
  display: flex;
  align-items: center;
  justify-content: center;
  font-weight: bold;
  box-shadow: 0 4px 6px rgba(0,0,0,0.1);
  z-index: 10;
  animation: popIn 0.3s cubic-bezier(0.175, 0.885, 0.32, 1.275);
}
.completion-confetti {
  position: absolute;
  left: 50%;
  top: 50%;
  font-size: 2rem;
  pointer-events: none;
  animation: floatUp 1s ease-out forwards;
}
@keyframes floatUp {
  0% { transform: translate(-50%, 0) scale(0.5); opacity: 1; }
  100% { transform: translate(-50%, -100px) scale(1.5); opacity: 0; }
}
@keyframes popIn {
  from { transform: scale(0); }
  to { transform: scale(1); }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_cover_injected_classes() {
        for class in [
            TOGGLE_CONTAINER_CLASS,
            CHECKBOX_LABEL_CLASS,
            CHECKBOX_CLASS,
            COMPLETED_CLASS,
            CONFETTI_CLASS,
        ] {
            assert!(PROGRESS_STYLES.contains(&format!(".{}", class)), "missing {}", class);
        }
    }
}
