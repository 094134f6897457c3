//! Error types for vizkit.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for vizkit data operations.
#[derive(Error, Debug)]
pub enum VizError {
    /// A file could not be opened.
    #[error("Could not open file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was opened but its contents could not be read completely.
    #[error("Error reading file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// A file was read but its contents are malformed.
    #[error("parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The file describes a dataset or encoding that is not supported.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A cell references a point that does not exist.
    #[error("cell references point {index}, dataset has {points} points")]
    PointIndex { index: usize, points: usize },

    /// Grid dimensions are unusable (zero or too small for the operation).
    #[error("invalid dimensions {0:?}")]
    InvalidDimensions([usize; 3]),

    /// A required data array is not present.
    #[error("missing data array '{0}'")]
    MissingArray(String),

    /// I/O error without a known path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VizError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for vizkit data operations.
pub type Result<T> = std::result::Result<T, VizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_message_names_file() {
        let err = VizError::Open {
            path: PathBuf::from("/nowhere/field.vec"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err
            .to_string()
            .starts_with("Could not open file /nowhere/field.vec"));
    }

    #[test]
    fn test_read_error_message_names_file() {
        let err = VizError::read("a.vec", "short read");
        assert_eq!(err.to_string(), "Error reading file a.vec: short read");
    }
}
