//! Error types shared across Gazemouse crates.

use std::path::PathBuf;

/// Top-level error type for Gazemouse operations.
#[derive(Debug, thiserror::Error)]
pub enum GazemouseError {
    #[error("Invalid blendshape frame: {message}")]
    InvalidFrame { message: String },

    #[error("Device acquisition failed: {message}")]
    DeviceAcquisition { message: String },

    #[error("Overlay error: {message}")]
    Overlay { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GazemouseError.
pub type GazemouseResult<T> = Result<T, GazemouseError>;

impl GazemouseError {
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: msg.into(),
        }
    }

    pub fn device_acquisition(msg: impl Into<String>) -> Self {
        Self::DeviceAcquisition {
            message: msg.into(),
        }
    }

    pub fn overlay(msg: impl Into<String>) -> Self {
        Self::Overlay {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the error should stop the detector loop.
    ///
    /// Unsupported capabilities only disable a feature.
    pub fn is_fatal_to_detector(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_is_not_fatal() {
        assert!(!GazemouseError::unsupported("zoom").is_fatal_to_detector());
        assert!(GazemouseError::device_acquisition("no camera").is_fatal_to_detector());
    }

    #[test]
    fn test_display_messages() {
        let err = GazemouseError::invalid_frame("missing jawOpen");
        assert_eq!(err.to_string(), "Invalid blendshape frame: missing jawOpen");
    }
}
