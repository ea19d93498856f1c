use std::path::PathBuf;

use thiserror::Error;

/// Playback errors using thiserror for structured error handling.
///
/// Every variant aborts only the single requested operation. The registry is
/// left consistent and nothing is retried.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No sound file matches reference: {reference}")]
    Unresolved { reference: String },

    #[error("Sound file disappeared before playback: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to create stream for {}", path.display())]
    StreamCreation {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}

impl AudioError {
    /// Engine error code, when the failure came from the engine
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            AudioError::StreamCreation { source, .. } => Some(source.code),
            _ => None,
        }
    }
}

/// Rejection reported by a stream engine when it cannot create a stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine error {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Host command lines that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{value}' for {name}")]
    InvalidArgument { name: &'static str, value: String },
}

/// Result alias for playback operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = AudioError::Unresolved {
            reference: "wind.ogg".to_string(),
        };
        assert_eq!(err.to_string(), "No sound file matches reference: wind.ogg");

        let err = ConfigError::Invalid("duplicate group".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: duplicate group");

        let err = CommandError::InvalidArgument {
            name: "fade",
            value: "-1".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid argument '-1' for fade");
    }

    #[test]
    fn test_stream_creation_keeps_engine_code() {
        let err = AudioError::StreamCreation {
            path: PathBuf::from("/sounds/rain.ogg"),
            source: EngineError::new(41, "unsupported format"),
        };

        assert_eq!(err.engine_code(), Some(41));
        assert!(err.source().is_some());
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("engine error 41: unsupported format".to_string())
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }
}
