//! Error handling for Squeeze
//!
//! The real-time core (gain stages, meter aggregation) never fails; errors
//! only arise at the boundary: configuration, file I/O and the CLI.

use thiserror::Error;

/// Result type alias for Squeeze operations
pub type Result<T> = std::result::Result<T, SqueezeError>;

/// Main error type for Squeeze operations
#[derive(Error, Debug)]
pub enum SqueezeError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Configuration Errors
    #[error("Invalid parameter {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SqueezeError {
    /// Shorthand for an out-of-range parameter
    pub fn invalid_parameter(
        param: &str,
        value: impl ToString,
        expected: &str,
    ) -> Self {
        SqueezeError::InvalidParameter {
            param: param.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SqueezeError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SqueezeError::InvalidAudio { .. } => "INVALID_AUDIO",
            SqueezeError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SqueezeError::EmptyAudio => "EMPTY_AUDIO",
            SqueezeError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SqueezeError::Io(_) => "IO_ERROR",
            SqueezeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SqueezeError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            SqueezeError::InvalidAudio { .. } => vec![
                "Try converting the file to 16/24-bit PCM or 32-bit float WAV",
                "The file may be corrupted - try re-exporting from source",
            ],
            SqueezeError::UnsupportedFormat { .. } => vec![
                "Convert to a mono or stereo WAV file",
            ],
            SqueezeError::InvalidParameter { .. } => vec![
                "Check the configuration file against 'squeeze-cli init-config'",
                "Values outside the documented range are rejected, not clamped",
            ],
            SqueezeError::Serialization(_) => vec![
                "The configuration file is not valid JSON",
            ],
            _ => vec![],
        }
    }
}
