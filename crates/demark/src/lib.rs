//! Entry point of the demark mask editor.
//!
//! Compiles to a WASM module loaded by the mask editing page. On
//! instantiation it installs the console logger and panic hook, reads
//! the optional `#demark-config` block, and starts the
//! [`Controller`] once the document has been parsed.

use std::str::FromStr;

use demark_control::ControllerConfig;
use demark_io::{Controller, dom};
use wasm_bindgen::prelude::*;

/// Module entry point, called when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let document = match dom::document() {
        Ok(document) => document,
        Err(e) => {
            web_sys::console::error_1(&format!("demark: {e}").into());
            return;
        }
    };

    let (config, config_error) = match demark_io::config::load(&document) {
        Ok(config) => (config, None),
        Err(e) => (ControllerConfig::default(), Some(e)),
    };
    init_logging(&config.log_level);
    if let Some(e) = config_error {
        log::error!("{e}; using defaults");
    }

    if document.ready_state() == "loading" {
        let ready = document.clone();
        let listened = dom::listen(&document, "DOMContentLoaded", move |_| {
            launch(&ready, &config);
        });
        if let Err(e) = listened {
            log::error!("failed to wait for the document: {e}");
        }
    } else {
        launch(&document, &config);
    }
}

fn launch(document: &web_sys::Document, config: &ControllerConfig) {
    match Controller::start(document, config) {
        // Listeners keep the controller alive for the page lifetime.
        Ok(_) => log::info!("mask editor ready"),
        Err(e) => log::error!("failed to start mask editor: {e}"),
    }
}

fn init_logging(level: &str) {
    let level = log::Level::from_str(level).unwrap_or_else(|_| {
        let warning = format!("demark: unknown log level {level:?}, using info");
        web_sys::console::warn_1(&warning.into());
        log::Level::Info
    });
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(level);
}
