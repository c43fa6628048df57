//! Slider identifiers and the page element ids they map to.

use std::fmt;

/// Element id of the fill-mode `<select>`.
pub const MODE_SELECT_ID: &str = "mode_select";

/// Which server update a slider drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderGroup {
    /// Grayscale threshold bounds, posted to `/update_thresholds`.
    Threshold,
    /// Color bounds and sharpening, posted to `/update_color_filters`.
    Color,
}

/// A range input on the mask editing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    ThMin,
    ThMax,
    RMin,
    RMax,
    GMin,
    GMax,
    BMin,
    BMax,
    Sharpen,
}

impl Slider {
    /// All sliders, threshold bounds first then color bounds in request order.
    pub const ALL: [Self; 9] = [
        Self::ThMin,
        Self::ThMax,
        Self::RMin,
        Self::RMax,
        Self::GMin,
        Self::GMax,
        Self::BMin,
        Self::BMax,
        Self::Sharpen,
    ];

    /// Base name shared by the input id, the label id and the JSON field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ThMin => "th_min",
            Self::ThMax => "th_max",
            Self::RMin => "r_min",
            Self::RMax => "r_max",
            Self::GMin => "g_min",
            Self::GMax => "g_max",
            Self::BMin => "b_min",
            Self::BMax => "b_max",
            Self::Sharpen => "sharpen",
        }
    }

    /// Id of the `<input type="range">` element.
    #[must_use]
    pub const fn input_id(self) -> &'static str {
        match self {
            Self::ThMin => "th_min_slider",
            Self::ThMax => "th_max_slider",
            Self::RMin => "r_min_slider",
            Self::RMax => "r_max_slider",
            Self::GMin => "g_min_slider",
            Self::GMax => "g_max_slider",
            Self::BMin => "b_min_slider",
            Self::BMax => "b_max_slider",
            Self::Sharpen => "sharpen_slider",
        }
    }

    /// Id of the element showing the slider's current value.
    ///
    /// Threshold pages always carry these labels; color labels are
    /// optional and skipped when the page has none.
    #[must_use]
    pub const fn label_id(self) -> &'static str {
        match self {
            Self::ThMin => "th_min_value",
            Self::ThMax => "th_max_value",
            Self::RMin => "r_min_value",
            Self::RMax => "r_max_value",
            Self::GMin => "g_min_value",
            Self::GMax => "g_max_value",
            Self::BMin => "b_min_value",
            Self::BMax => "b_max_value",
            Self::Sharpen => "sharpen_value",
        }
    }

    #[must_use]
    pub const fn group(self) -> SliderGroup {
        match self {
            Self::ThMin | Self::ThMax => SliderGroup::Threshold,
            _ => SliderGroup::Color,
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
