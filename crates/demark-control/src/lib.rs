//! demark-control: Mask editor control logic (sans-IO).
//!
//! Everything the browser controller decides without touching the
//! browser: which stage is active and what its panels look like,
//! debouncing of slider input, request bodies and endpoints, which
//! image response wins, and the Socket.IO framing of the progress
//! channel.
//!
//! This crate has **no I/O dependencies**. All DOM, `fetch` and
//! WebSocket work lives in `demark-io`.

pub mod config;
pub mod controls;
pub mod debounce;
pub mod display;
pub mod error;
pub mod progress;
pub mod request;
pub mod stage;

pub use config::ControllerConfig;
pub use controls::{Slider, SliderGroup};
pub use debounce::{Debouncer, Scheduler};
pub use display::{DisplayUpdate, DisplayedImage, Freshness, ImageSource, Ticket};
pub use error::ControlError;
pub use progress::{ChannelAction, ProgressChannel};
pub use request::{ColorFilters, ImageRequest, MaskAction, SliderValue, ThresholdBounds};
pub use stage::{Effect, Layout, Stage, StageMachine, Transition, Visibility};
