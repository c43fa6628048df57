//! demark-io: Browser I/O for the mask editor.
//!
//! Binds the controller from `demark-control` to an existing page:
//! element lookup and rendering, `fetch` requests, object URLs for
//! image payloads, `setTimeout`-backed debouncing and the Socket.IO
//! progress WebSocket.
//!
//! All modules require a browser environment (`wasm32-unknown-unknown`
//! target).

pub mod config;
pub mod controller;
pub mod dom;
pub mod http;
pub mod image;
pub mod progress;
pub mod timer;

pub use controller::Controller;
pub use dom::DomError;
pub use http::RequestError;
