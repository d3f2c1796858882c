//! Error types for framescope.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for framescope operations.
#[derive(Error, Debug)]
pub enum FramescopeError {
    /// A mesh file could not be read or parsed.
    #[error("failed to load mesh from {}: {message}", path.display())]
    Load {
        /// The file path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The mesh file extension is not one of the supported formats.
    #[error("unsupported mesh format '{extension}' for {}", path.display())]
    UnsupportedFormat {
        /// The file path.
        path: PathBuf,
        /// The offending extension.
        extension: String,
    },

    /// A file could not be written.
    #[error("failed to save {}: {message}", path.display())]
    Save {
        /// The file path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// An action was requested before the state it needs exists.
    #[error("{0}")]
    Precondition(&'static str),

    /// The field builder failed.
    #[error("field builder failed: {0}")]
    Builder(String),

    /// A parameter edit was rejected.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No parameter with this name exists in the given mode.
    #[error("unknown parameter '{name}' for {mode} mode")]
    UnknownParameter {
        /// Mode whose record was edited.
        mode: String,
        /// The unknown name.
        name: String,
    },

    /// A control command could not be parsed.
    #[error("invalid command '{0}', type 'help' for the command list")]
    InvalidCommand(String),

    /// The mesh topology or geometry is unusable.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl FramescopeError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: impl Into<String>,
        value: T,
        reason: &'static str,
    ) -> Self {
        FramescopeError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason,
        }
    }

    /// Wraps any displayable failure as a load error for `path`.
    pub fn load(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        FramescopeError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error ends the process instead of a single command.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FramescopeError::Load { .. } | FramescopeError::UnsupportedFormat { .. }
        )
    }
}

/// A specialized Result type for framescope operations.
pub type Result<T> = std::result::Result<T, FramescopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_load_errors_are_fatal() {
        assert!(FramescopeError::load("a.obj", "boom").is_fatal());
        assert!(FramescopeError::UnsupportedFormat {
            path: "a.xyz".into(),
            extension: "xyz".into(),
        }
        .is_fatal());
        assert!(!FramescopeError::Precondition("no field computed").is_fatal());
        assert!(!FramescopeError::Builder("diverged".into()).is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = FramescopeError::invalid_param("order", 0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: order = 0 (must be positive)"
        );
        let err = FramescopeError::load("mesh.off", "truncated header");
        assert_eq!(
            err.to_string(),
            "failed to load mesh from mesh.off: truncated header"
        );
    }
}
