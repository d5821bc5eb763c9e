//! Error handling for Layerpaint
//!
//! Only construction, lookup and I/O failures are errors. "No change",
//! capacity drops and the end of a replay are ordinary outcomes and are
//! reported through return values instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Layerpaint operations
pub type Result<T> = std::result::Result<T, PaintError>;

/// Main error type for Layerpaint operations
#[derive(Error, Debug)]
pub enum PaintError {
    // Construction Errors
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Cell ({column}, {row}) is outside the {width}x{height} canvas")]
    CellOutOfBounds {
        column: usize,
        row: usize,
        width: usize,
        height: usize,
    },

    // Catalog Errors
    #[error("Unknown layer: {name}")]
    UnknownLayer { name: String },

    #[error("Duplicate layer name in catalog: {name}")]
    DuplicateLayer { name: String },

    #[error("The process-wide layer catalog is already installed")]
    CatalogAlreadyInstalled,

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Script Errors
    #[error("Script error on line {line}: {reason}")]
    ScriptParse { line: usize, reason: String },
}

impl PaintError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PaintError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            PaintError::CellOutOfBounds { .. } => "CELL_OUT_OF_BOUNDS",
            PaintError::UnknownLayer { .. } => "UNKNOWN_LAYER",
            PaintError::DuplicateLayer { .. } => "DUPLICATE_LAYER",
            PaintError::CatalogAlreadyInstalled => "CATALOG_ALREADY_INSTALLED",
            PaintError::InvalidConfig { .. } => "INVALID_CONFIG",
            PaintError::FileReadError { .. } => "FILE_READ_ERROR",
            PaintError::Json(_) => "JSON_ERROR",
            PaintError::ScriptParse { .. } => "SCRIPT_PARSE_ERROR",
        }
    }

    /// Check if the caller can correct the input and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaintError::CellOutOfBounds { .. }
                | PaintError::UnknownLayer { .. }
                | PaintError::InvalidConfig { .. }
                | PaintError::ScriptParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PaintError::UnknownLayer {
            name: "glitter".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_LAYER");
        assert_eq!(err.to_string(), "Unknown layer: glitter");
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = PaintError::CellOutOfBounds {
            column: 7,
            row: 1,
            width: 5,
            height: 5,
        };
        assert_eq!(err.to_string(), "Cell (7, 1) is outside the 5x5 canvas");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_catalog_errors_not_recoverable() {
        assert!(!PaintError::CatalogAlreadyInstalled.is_recoverable());
    }
}
