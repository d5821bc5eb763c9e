//! Session configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::brush::Brush;
use crate::color::Rgb;
use crate::error::{PaintError, Result};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::replay::DEFAULT_REPLAY_CAPACITY;
use crate::store::CompositionPolicy;

/// Default canvas width and height.
const DEFAULT_CANVAS_SIZE: usize = 5;

/// Everything needed to start a paint session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Composition policy of every cell
    pub policy: CompositionPolicy,

    /// Number of columns
    pub width: usize,

    /// Number of rows
    pub height: usize,

    /// Maximum depth of each undo/redo stack
    pub history_capacity: usize,

    /// Maximum number of replay log entries
    pub replay_capacity: usize,

    /// Per-cell layer limit for accumulate canvases (default: 100 per catalog layer)
    pub accumulate_capacity: Option<usize>,

    /// Initial brush size
    pub brush_size: usize,

    /// Color under every cell
    pub background: Rgb,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: CompositionPolicy::default(),
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            accumulate_capacity: None,
            brush_size: Brush::DEFAULT_SIZE,
            background: Rgb::BLACK,
        }
    }
}

impl SessionConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PaintError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: SessionConfig = serde_json::from_str(&content)?;
        config.validate()?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values no session can be built from
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(PaintError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.width == 0 || self.height == 0 {
            return invalid("canvas width and height must be positive");
        }
        if self.history_capacity == 0 {
            return invalid("history_capacity must be positive");
        }
        if self.replay_capacity == 0 {
            return invalid("replay_capacity must be positive");
        }
        if self.accumulate_capacity == Some(0) {
            return invalid("accumulate_capacity must be positive");
        }
        if self.brush_size > Brush::MAX_SIZE {
            return invalid("brush_size exceeds the maximum brush size");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 10_000);
        assert_eq!(config.brush_size, 2);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{ "policy": "sequence", "width": 8,
                        "background": { "r": 10, "g": 20, "b": 30 } }"#;
        write!(file, "{}", json).unwrap();

        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.policy, CompositionPolicy::Sequence);
        assert_eq!(config.width, 8);
        assert_eq!(config.height, 5);
        assert_eq!(config.background, Rgb::new(10, 20, 30));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionConfig::load(Path::new("/nonexistent/layerpaint.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_READ_ERROR");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "width": 0 }}"#).unwrap();
        let err = SessionConfig::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = SessionConfig::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "JSON_ERROR");
    }

    #[test]
    fn test_validate_brush_and_capacities() {
        let mut config = SessionConfig {
            brush_size: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.brush_size = 0;
        config.accumulate_capacity = Some(0);
        assert!(config.validate().is_err());
    }
}
