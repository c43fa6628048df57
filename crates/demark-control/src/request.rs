//! Server endpoints and JSON request bodies.
//!
//! Slider values travel exactly as the range input reports them, so
//! every body field is a JSON string (`{"th_min":"10",...}`). Field
//! order in the serialized body follows declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// `POST` threshold bounds, answered with a PNG of the threshold mask.
pub const UPDATE_THRESHOLDS: &str = "/update_thresholds";
/// `POST` color filters, answered with a PNG of the filtered page.
pub const UPDATE_COLOR_FILTERS: &str = "/update_color_filters";
/// `POST` erode the working mask by one step.
pub const ERODE_MASK: &str = "/erode_mask";
/// `POST` dilate the working mask by one step.
pub const DILATE_MASK: &str = "/dilate_mask";
/// `POST` restore the working mask to the threshold mask.
pub const RESET_DILATE_ERODE_MASK: &str = "/reset_dilate_erode_mask";
/// `POST` start the background watermark removal over every page.
pub const START_LONG_TASK: &str = "/start_long_task";
/// `GET` the current eroded/dilated mask.
pub const GET_DILATE_ERODE_MASK: &str = "/get_dilate_erode_mask/";

/// The raw value of a range input or select.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SliderValue(String);

impl SliderValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SliderValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SliderValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SliderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /update_thresholds`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub th_min: SliderValue,
    pub th_max: SliderValue,
}

/// Body of `POST /update_color_filters`.
///
/// `mode` selects how matched pixels are replaced server side
/// (`"0"` fills with the dominant color, anything else inpaints).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorFilters {
    pub r_min: SliderValue,
    pub r_max: SliderValue,
    pub g_min: SliderValue,
    pub g_max: SliderValue,
    pub b_min: SliderValue,
    pub b_max: SliderValue,
    pub sharpen: SliderValue,
    pub mode: SliderValue,
}

/// A request whose response is an image payload shown in the mask view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRequest {
    Thresholds(ThresholdBounds),
    ColorFilters(ColorFilters),
}

impl ImageRequest {
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::Thresholds(_) => UPDATE_THRESHOLDS,
            Self::ColorFilters(_) => UPDATE_COLOR_FILTERS,
        }
    }

    /// Serialize the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Encode`] if serialization fails.
    pub fn body(&self) -> Result<String, ControlError> {
        let body = match self {
            Self::Thresholds(bounds) => serde_json::to_string(bounds)?,
            Self::ColorFilters(filters) => serde_json::to_string(filters)?,
        };
        Ok(body)
    }
}

/// A bodiless mask mutation acknowledged with JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskAction {
    Erode,
    Dilate,
    Reset,
}

impl MaskAction {
    pub const ALL: [Self; 3] = [Self::Erode, Self::Dilate, Self::Reset];

    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Erode => ERODE_MASK,
            Self::Dilate => DILATE_MASK,
            Self::Reset => RESET_DILATE_ERODE_MASK,
        }
    }

    /// Id of the button that triggers this action.
    #[must_use]
    pub const fn button_id(self) -> &'static str {
        match self {
            Self::Erode => "erode_button",
            Self::Dilate => "dilate_button",
            Self::Reset => "reset_button",
        }
    }

    /// Image endpoint to show once the server acknowledges the action.
    #[must_use]
    pub const fn refresh_endpoint(self) -> &'static str {
        GET_DILATE_ERODE_MASK
    }
}

impl fmt::Display for MaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Erode => "erode",
            Self::Dilate => "dilate",
            Self::Reset => "reset",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn color_filters() -> ColorFilters {
        ColorFilters {
            r_min: "1".into(),
            r_max: "2".into(),
            g_min: "3".into(),
            g_max: "4".into(),
            b_min: "5".into(),
            b_max: "6".into(),
            sharpen: "5".into(),
            mode: "rgb".into(),
        }
    }

    #[test]
    fn threshold_body_is_exact() {
        let request = ImageRequest::Thresholds(ThresholdBounds {
            th_min: "10".into(),
            th_max: "200".into(),
        });
        assert_eq!(request.endpoint(), "/update_thresholds");
        assert_eq!(request.body().unwrap(), r#"{"th_min":"10","th_max":"200"}"#);
    }

    #[test]
    fn color_body_has_every_field_in_input_order() {
        let request = ImageRequest::ColorFilters(color_filters());
        assert_eq!(request.endpoint(), "/update_color_filters");
        assert_eq!(
            request.body().unwrap(),
            r#"{"r_min":"1","r_max":"2","g_min":"3","g_max":"4","b_min":"5","b_max":"6","sharpen":"5","mode":"rgb"}"#,
        );
    }

    #[test]
    fn color_body_parses_back_to_eight_fields() {
        let body = ImageRequest::ColorFilters(color_filters()).body().unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert_eq!(object["mode"], "rgb");
        assert_eq!(object["sharpen"], "5");
    }

    #[test]
    fn mask_actions_post_to_distinct_endpoints() {
        let mut seen = std::collections::HashSet::new();
        for action in MaskAction::ALL {
            assert!(
                seen.insert(action.endpoint()),
                "{action} shares an endpoint with another action"
            );
            assert_eq!(action.refresh_endpoint(), "/get_dilate_erode_mask/");
        }
    }

    #[test]
    fn reset_restores_through_its_own_endpoint() {
        assert_eq!(MaskAction::Reset.endpoint(), "/reset_dilate_erode_mask");
        assert_eq!(MaskAction::Reset.button_id(), "reset_button");
    }
}
