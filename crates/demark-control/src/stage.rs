//! Mask editing stages and the visibility of their control panels.
//!
//! The editor moves strictly forward through three stages:
//!
//! ```text
//! ThresholdSelection --done--> ErodeDilate --done--> ColorFiltering --done--> (launch ready)
//! ```
//!
//! [`StageMachine::done`] is the only transition function. The page's
//! single "done" handler calls it and then re-renders every panel from
//! [`StageMachine::layout`], so no stage-specific handler ever needs to
//! be rebound. The page is served in the threshold selection layout, so
//! that stage has no layout of its own and the page is left untouched
//! until the first "done".

use std::fmt;

/// A phase of the mask editing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Picking the grayscale threshold bounds.
    ThresholdSelection,
    /// Eroding and dilating the threshold mask.
    ErodeDilate,
    /// Tuning the color bounds, sharpening and fill mode.
    ColorFiltering,
}

impl Stage {
    /// Stages in workflow order.
    pub const ALL: [Self; 3] = [
        Self::ThresholdSelection,
        Self::ErodeDilate,
        Self::ColorFiltering,
    ];

    /// Page heading while the stage is active.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::ThresholdSelection => "Mask thresholding",
            Self::ErodeDilate => "Erode/Dilate mask",
            Self::ColorFiltering => "Color filtering",
        }
    }

    /// The stage a "done" click moves to, or `None` for the last stage.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ThresholdSelection => Some(Self::ErodeDilate),
            Self::ErodeDilate => Some(Self::ColorFiltering),
            Self::ColorFiltering => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ThresholdSelection => "threshold selection",
            Self::ErodeDilate => "erode/dilate",
            Self::ColorFiltering => "color filtering",
        })
    }
}

/// How a panel is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// `display: flex`.
    Flex,
    /// `display: flex; flex-direction: column`.
    Column,
}

impl Visibility {
    /// Value for the CSS `display` property.
    #[must_use]
    pub const fn css_display(self) -> &'static str {
        match self {
            Self::Hidden => "none",
            Self::Flex | Self::Column => "flex",
        }
    }

    /// Value for the CSS `flex-direction` property, if one is set.
    #[must_use]
    pub const fn flex_direction(self) -> Option<&'static str> {
        match self {
            Self::Column => Some("column"),
            Self::Hidden | Self::Flex => None,
        }
    }

    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Visibility of every stage-dependent element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub heading: &'static str,
    /// `#threshold-sliders-div`.
    pub threshold_panel: Visibility,
    /// Every `.new-buttons` element (erode, dilate, reset).
    pub mask_actions: Visibility,
    /// `#color-filtering-sliders-div`.
    pub color_panel: Visibility,
    /// `#progress-bar`.
    pub progress_bar: Visibility,
    /// `#start_button`.
    pub start_button: Visibility,
}

impl Layout {
    /// Number of stage control panels currently shown.
    #[must_use]
    pub fn visible_stage_panels(&self) -> usize {
        [self.threshold_panel, self.mask_actions, self.color_panel]
            .into_iter()
            .filter(|v| v.is_visible())
            .count()
    }
}

/// Side effect a transition asks the controller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Render the color-filtered page with the current control values.
    SendColorFilters,
}

/// Outcome of a "done" click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the next stage.
    Advanced { from: Stage, to: Stage },
    /// Color filtering finished; the launch controls are shown.
    /// `first` is `false` for repeated clicks.
    LaunchReady { first: bool },
}

impl Transition {
    /// Effects to run after the layout has been re-rendered.
    ///
    /// Entering erode/dilate has none: the mask image keeps the
    /// threshold mask the user just picked.
    #[must_use]
    pub const fn effects(self) -> &'static [Effect] {
        match self {
            Self::Advanced {
                to: Stage::ColorFiltering,
                ..
            } => &[Effect::SendColorFilters],
            Self::Advanced { .. } | Self::LaunchReady { .. } => &[],
        }
    }
}

/// The current stage plus whether the launch controls were revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageMachine {
    stage: Stage,
    launch_ready: bool,
}

impl Default for StageMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StageMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: Stage::ThresholdSelection,
            launch_ready: false,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether the start button may post the background task.
    #[must_use]
    pub const fn launch_ready(&self) -> bool {
        self.launch_ready
    }

    /// Erode, dilate and reset only act while their buttons are shown.
    #[must_use]
    pub const fn accepts_mask_actions(&self) -> bool {
        matches!(self.stage, Stage::ErodeDilate)
    }

    /// Handle a click on the "done" button.
    pub fn done(&mut self) -> Transition {
        match self.stage.next() {
            Some(to) => {
                let from = self.stage;
                self.stage = to;
                Transition::Advanced { from, to }
            }
            None => {
                let first = !self.launch_ready;
                self.launch_ready = true;
                Transition::LaunchReady { first }
            }
        }
    }

    /// Layout to render, or `None` while the page is still in the
    /// threshold selection layout it was served with.
    #[must_use]
    pub const fn layout(&self) -> Option<Layout> {
        use Visibility::{Column, Flex, Hidden};

        let (threshold_panel, mask_actions, color_panel) = match self.stage {
            Stage::ThresholdSelection => return None,
            Stage::ErodeDilate => (Hidden, Flex, Hidden),
            Stage::ColorFiltering if self.launch_ready => (Hidden, Hidden, Hidden),
            Stage::ColorFiltering => (Hidden, Hidden, Column),
        };
        let launch = if self.launch_ready { Flex } else { Hidden };

        Some(Layout {
            heading: self.stage.heading(),
            threshold_panel,
            mask_actions,
            color_panel,
            progress_bar: launch,
            start_button: launch,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn layout_of(machine: &StageMachine) -> Layout {
        machine.layout().expect("every stage after the first has a layout")
    }

    #[test]
    fn starts_in_threshold_selection() {
        let machine = StageMachine::new();
        assert_eq!(machine.stage(), Stage::ThresholdSelection);
        assert!(!machine.launch_ready());
        assert!(!machine.accepts_mask_actions());
    }

    #[test]
    fn served_page_is_left_alone_until_first_done() {
        let mut machine = StageMachine::new();
        assert_eq!(machine.layout(), None, "heading and panels stay as served");

        machine.done();
        let layout = layout_of(&machine);
        assert_eq!(layout.heading, "Erode/Dilate mask");
        assert_eq!(layout.threshold_panel, Visibility::Hidden);
        assert_eq!(layout.mask_actions, Visibility::Flex);
        assert_eq!(layout.color_panel, Visibility::Hidden);
        assert_eq!(layout.progress_bar, Visibility::Hidden);
        assert_eq!(layout.start_button, Visibility::Hidden);
    }

    #[test]
    fn transitions_are_strictly_linear() {
        let mut machine = StageMachine::new();
        assert_eq!(
            machine.done(),
            Transition::Advanced {
                from: Stage::ThresholdSelection,
                to: Stage::ErodeDilate
            }
        );
        assert!(machine.accepts_mask_actions());
        assert_eq!(
            machine.done(),
            Transition::Advanced {
                from: Stage::ErodeDilate,
                to: Stage::ColorFiltering
            }
        );
        assert!(!machine.accepts_mask_actions());
        for _ in 0..5 {
            machine.done();
            assert_eq!(machine.stage(), Stage::ColorFiltering);
        }
    }

    #[test]
    fn stage_entry_effects() {
        let mut machine = StageMachine::new();
        assert!(
            machine.done().effects().is_empty(),
            "entering erode/dilate must keep the chosen threshold mask"
        );
        assert_eq!(machine.done().effects(), &[Effect::SendColorFilters]);
        assert!(machine.done().effects().is_empty());
        assert!(machine.done().effects().is_empty());
    }

    #[test]
    fn color_filtering_done_reveals_launch_controls_on_every_click() {
        let mut machine = StageMachine::new();
        machine.done();
        machine.done();
        assert_eq!(layout_of(&machine).color_panel, Visibility::Column);

        assert_eq!(machine.done(), Transition::LaunchReady { first: true });
        let after_first = layout_of(&machine);
        assert_eq!(after_first.color_panel, Visibility::Hidden);
        assert_eq!(after_first.progress_bar, Visibility::Flex);
        assert_eq!(after_first.start_button, Visibility::Flex);
        assert!(machine.launch_ready());

        assert_eq!(machine.done(), Transition::LaunchReady { first: false });
        assert_eq!(
            layout_of(&machine),
            after_first,
            "repeat clicks must not change the layout"
        );
    }

    #[test]
    fn at_most_one_stage_panel_is_visible() {
        let mut machine = StageMachine::new();
        for _ in 0..6 {
            machine.done();
            assert!(
                layout_of(&machine).visible_stage_panels() <= 1,
                "more than one panel visible in {}",
                machine.stage()
            );
        }
    }

    #[test]
    fn headings_follow_the_stage() {
        let mut machine = StageMachine::new();
        let mut headings = Vec::new();
        machine.done();
        headings.push(layout_of(&machine).heading);
        machine.done();
        headings.push(layout_of(&machine).heading);
        assert_eq!(headings, vec!["Erode/Dilate mask", "Color filtering"]);
        assert_eq!(Stage::ThresholdSelection.heading(), "Mask thresholding");
    }

    #[test]
    fn next_never_goes_backward() {
        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            assert_eq!(stage.next(), Stage::ALL.get(i + 1).copied());
        }
    }

    #[test]
    fn column_layout_sets_flex_direction() {
        assert_eq!(Visibility::Column.css_display(), "flex");
        assert_eq!(Visibility::Column.flex_direction(), Some("column"));
        assert_eq!(Visibility::Hidden.css_display(), "none");
        assert_eq!(Visibility::Flex.flex_direction(), None);
    }
}
