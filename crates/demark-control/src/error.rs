//! Error type shared by the control crate.

/// Errors produced by the sans-IO control logic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// Controller configuration is invalid.
    #[error("invalid controller configuration: {0}")]
    InvalidConfig(String),

    /// A push-channel frame could not be decoded.
    #[error("malformed push-channel frame: {0}")]
    Protocol(String),

    /// A request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ControlError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config_display() {
        let err = ControlError::InvalidConfig("color_debounce_ms must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid controller configuration: color_debounce_ms must be positive",
        );
    }

    #[test]
    fn error_protocol_display() {
        let err = ControlError::Protocol("empty frame".to_string());
        assert_eq!(err.to_string(), "malformed push-channel frame: empty frame");
    }
}
