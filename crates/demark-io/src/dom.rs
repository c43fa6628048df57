//! Element lookup and rendering for the mask editing page.
//!
//! [`Page`] looks every element of the page contract up once, at
//! startup. A missing element aborts startup with a [`DomError`];
//! after that, handlers work on the cached elements and never look
//! anything up again.

use std::collections::HashMap;

use demark_control::controls::MODE_SELECT_ID;
use demark_control::{
    ColorFilters, Layout, MaskAction, Slider, SliderGroup, SliderValue, ThresholdBounds,
    Visibility,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlProgressElement,
    HtmlSelectElement,
};

pub const MASK_IMAGE_ID: &str = "mask";
pub const PROGRESS_BAR_ID: &str = "progress-bar";
pub const START_BUTTON_ID: &str = "start_button";
pub const DONE_BUTTON_ID: &str = "done_button";
pub const THRESHOLD_PANEL_ID: &str = "threshold-sliders-div";
pub const COLOR_PANEL_ID: &str = "color-filtering-sliders-div";
/// Class shared by the erode, dilate and reset buttons.
pub const MASK_ACTIONS_SELECTOR: &str = ".new-buttons";

/// Errors that can occur when binding to or updating the page.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("no global window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    /// The page has no element matching the id or selector.
    #[error("element {0} not found")]
    Missing(String),

    /// The element exists but has an unexpected type.
    #[error("element {id} is not {expected}")]
    WrongType { id: String, expected: &'static str },

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// The page's document.
///
/// # Errors
///
/// Returns [`DomError::NoWindow`] or [`DomError::NoDocument`] outside a
/// browser page.
pub fn document() -> Result<Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

/// Look up a required element by id and cast it.
fn element<T: JsCast>(
    document: &Document,
    id: &str,
    expected: &'static str,
) -> Result<T, DomError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| DomError::Missing(format!("#{id}")))?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongType {
            id: format!("#{id}"),
            expected,
        })
}

/// Attach `handler` to `event` on `target` for the page lifetime.
///
/// # Errors
///
/// Returns [`DomError::JsError`] if `addEventListener` throws.
pub fn listen(
    target: &web_sys::EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), DomError> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget(); // leak — listeners live as long as the page
    Ok(())
}

fn apply_visibility(element: &HtmlElement, visibility: Visibility) -> Result<(), DomError> {
    let style = element.style();
    style.set_property("display", visibility.css_display())?;
    if let Some(direction) = visibility.flex_direction() {
        style.set_property("flex-direction", direction)?;
    }
    Ok(())
}

/// A range input and the optional element echoing its value.
struct SliderControl {
    input: HtmlInputElement,
    label: Option<Element>,
}

/// Every element the controller reads from or writes to.
pub struct Page {
    heading: Element,
    mask: HtmlImageElement,
    progress_bar: HtmlProgressElement,
    sliders: HashMap<Slider, SliderControl>,
    mode: HtmlSelectElement,
    threshold_panel: HtmlElement,
    color_panel: HtmlElement,
    mask_actions: Vec<HtmlElement>,
    mask_buttons: HashMap<MaskAction, HtmlElement>,
    done_button: HtmlElement,
    start_button: HtmlElement,
}

impl Page {
    /// Look up the page contract.
    ///
    /// Threshold value labels are required; color value labels are
    /// picked up when present.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Missing`] or [`DomError::WrongType`] for the
    /// first element that does not match the contract.
    pub fn bind(document: &Document) -> Result<Self, DomError> {
        let mut sliders = HashMap::with_capacity(Slider::ALL.len());
        for slider in Slider::ALL {
            let input = element(document, slider.input_id(), "an <input>")?;
            let label = match slider.group() {
                SliderGroup::Threshold => {
                    Some(element(document, slider.label_id(), "an element")?)
                }
                SliderGroup::Color => document.get_element_by_id(slider.label_id()),
            };
            sliders.insert(slider, SliderControl { input, label });
        }

        let heading = document
            .query_selector("h1")?
            .ok_or_else(|| DomError::Missing("h1".into()))?;

        let nodes = document.query_selector_all(MASK_ACTIONS_SELECTOR)?;
        let mut mask_actions = Vec::with_capacity(nodes.length() as usize);
        for i in 0..nodes.length() {
            if let Some(node) = nodes.get(i) {
                let button = node
                    .dyn_into::<HtmlElement>()
                    .map_err(|_| DomError::WrongType {
                        id: MASK_ACTIONS_SELECTOR.into(),
                        expected: "an HTML element",
                    })?;
                mask_actions.push(button);
            }
        }

        let mut mask_buttons = HashMap::with_capacity(MaskAction::ALL.len());
        for action in MaskAction::ALL {
            mask_buttons.insert(
                action,
                element(document, action.button_id(), "an HTML element")?,
            );
        }

        Ok(Self {
            heading,
            mask: element(document, MASK_IMAGE_ID, "an <img>")?,
            progress_bar: element(document, PROGRESS_BAR_ID, "a <progress>")?,
            sliders,
            mode: element(document, MODE_SELECT_ID, "a <select>")?,
            threshold_panel: element(document, THRESHOLD_PANEL_ID, "an HTML element")?,
            color_panel: element(document, COLOR_PANEL_ID, "an HTML element")?,
            mask_actions,
            mask_buttons,
            done_button: element(document, DONE_BUTTON_ID, "an HTML element")?,
            start_button: element(document, START_BUTTON_ID, "an HTML element")?,
        })
    }

    #[must_use]
    pub fn slider_value(&self, slider: Slider) -> SliderValue {
        self.sliders
            .get(&slider)
            .map(|control| SliderValue::new(control.input.value()))
            .unwrap_or_default()
    }

    /// Copy the slider's value into its label, if it has one.
    pub fn show_value(&self, slider: Slider) {
        if let Some(control) = self.sliders.get(&slider)
            && let Some(label) = &control.label
        {
            label.set_text_content(Some(&control.input.value()));
        }
    }

    #[must_use]
    pub fn threshold_bounds(&self) -> ThresholdBounds {
        ThresholdBounds {
            th_min: self.slider_value(Slider::ThMin),
            th_max: self.slider_value(Slider::ThMax),
        }
    }

    #[must_use]
    pub fn color_filters(&self) -> ColorFilters {
        ColorFilters {
            r_min: self.slider_value(Slider::RMin),
            r_max: self.slider_value(Slider::RMax),
            g_min: self.slider_value(Slider::GMin),
            g_max: self.slider_value(Slider::GMax),
            b_min: self.slider_value(Slider::BMin),
            b_max: self.slider_value(Slider::BMax),
            sharpen: self.slider_value(Slider::Sharpen),
            mode: SliderValue::new(self.mode.value()),
        }
    }

    /// Show and hide panels to match `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::JsError`] if a style update throws.
    pub fn render(&self, layout: &Layout) -> Result<(), DomError> {
        self.heading.set_text_content(Some(layout.heading));
        apply_visibility(&self.threshold_panel, layout.threshold_panel)?;
        for button in &self.mask_actions {
            apply_visibility(button, layout.mask_actions)?;
        }
        apply_visibility(&self.color_panel, layout.color_panel)?;
        apply_visibility(&self.progress_bar, layout.progress_bar)?;
        apply_visibility(&self.start_button, layout.start_button)?;
        Ok(())
    }

    /// The input element of `slider`, for attaching listeners.
    #[must_use]
    pub fn slider_input(&self, slider: Slider) -> Option<&HtmlInputElement> {
        self.sliders.get(&slider).map(|control| &control.input)
    }

    #[must_use]
    pub fn mask_button(&self, action: MaskAction) -> Option<&HtmlElement> {
        self.mask_buttons.get(&action)
    }

    #[must_use]
    pub const fn mode_select(&self) -> &HtmlSelectElement {
        &self.mode
    }

    #[must_use]
    pub const fn mask_image(&self) -> &HtmlImageElement {
        &self.mask
    }

    #[must_use]
    pub const fn progress_bar(&self) -> &HtmlProgressElement {
        &self.progress_bar
    }

    #[must_use]
    pub const fn done_button(&self) -> &HtmlElement {
        &self.done_button
    }

    #[must_use]
    pub const fn start_button(&self) -> &HtmlElement {
        &self.start_button
    }
}
