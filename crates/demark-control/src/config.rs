//! Controller configuration.
//!
//! Every field has a default, so a page without a configuration
//! element (or with a partial one) gets the stock behaviour.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// Element id of the optional `<script type="application/json">` block
/// holding a serialized [`ControllerConfig`].
pub const CONFIG_ELEMENT_ID: &str = "demark-config";

/// Tunables of the browser controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Quiet period before a threshold update is posted.
    pub threshold_debounce_ms: u32,

    /// Quiet period before a color filter update is posted.
    pub color_debounce_ms: u32,

    /// Socket.IO event carrying `{"progress": n}`.
    pub progress_event: String,

    /// Path of the Socket.IO endpoint on the page's host.
    pub socket_path: String,

    /// Maximum log level written to the browser console
    /// (`error`, `warn`, `info`, `debug` or `trace`).
    pub log_level: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            threshold_debounce_ms: 10,
            color_debounce_ms: 75,
            progress_event: "progress_update".to_string(),
            socket_path: "/socket.io/".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfig`] if the JSON does not
    /// parse or a value fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ControlError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ControlError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfig`] for zero debounce
    /// intervals, an empty event name, or a socket path not starting
    /// with `/`.
    pub fn validate(&self) -> Result<(), ControlError> {
        if self.threshold_debounce_ms == 0 {
            return Err(ControlError::InvalidConfig(
                "threshold_debounce_ms must be positive".into(),
            ));
        }
        if self.color_debounce_ms == 0 {
            return Err(ControlError::InvalidConfig(
                "color_debounce_ms must be positive".into(),
            ));
        }
        if self.progress_event.is_empty() {
            return Err(ControlError::InvalidConfig(
                "progress_event must not be empty".into(),
            ));
        }
        if !self.socket_path.starts_with('/') {
            return Err(ControlError::InvalidConfig(format!(
                "socket_path must start with '/', got {:?}",
                self.socket_path
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn threshold_debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.threshold_debounce_ms))
    }

    #[must_use]
    pub fn color_debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.color_debounce_ms))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_behaviour() {
        let config = ControllerConfig::default();
        assert_eq!(config.threshold_debounce(), Duration::from_millis(10));
        assert_eq!(config.color_debounce(), Duration::from_millis(75));
        assert_eq!(config.progress_event, "progress_update");
        assert_eq!(config.socket_path, "/socket.io/");
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = ControllerConfig::from_json(r#"{"color_debounce_ms": 200}"#).unwrap();
        assert_eq!(config.color_debounce_ms, 200);
        assert_eq!(config.threshold_debounce_ms, 10);
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let err = ControllerConfig::from_json(r#"{"threshold_debounce_ms": 0}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid controller configuration: threshold_debounce_ms must be positive"
        );
    }

    #[test]
    fn relative_socket_path_is_rejected() {
        let config = ControllerConfig {
            socket_path: "socket.io".into(),
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = ControllerConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ControlError::InvalidConfig(_)));
    }
}
