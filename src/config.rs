//! Interpreter configuration
//!
//! Pass-through switches consulted by the control-sequence handlers. Every
//! field has a default, so a partial JSON document is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a [`crate::Terminal`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VtConfig {
    /// Initial column count
    pub columns: usize,
    /// Initial row count
    pub rows: usize,
    /// Recognize 8-bit C1 control codes
    pub enable_8bit_control: bool,
    /// Honor DECCOLM (80/132 column switching)
    pub allow_column_width_changes: bool,
    /// Honor `CSI 3 J` (clear scrollback)
    pub enable_csi_j3: bool,
    /// Log unknown sequences at warn level instead of trace
    pub warn_unimplemented: bool,
    /// Honor OSC 52 clipboard writes
    pub enable_clipboard_write: bool,
    /// Honor `CSI ? 12 h/l` (cursor blink)
    pub enable_dec12: bool,
    /// Maximum lifetime of an unterminated OSC/DCS/PM/APC string
    pub osc_time_limit_ms: u64,
    /// Mouse reports treat alt as meta
    pub alt_is_meta: bool,
    /// East-Asian ambiguous characters occupy two columns
    pub ambiguous_wide: bool,
    /// Bold text in palette colors 0-7 renders with 8-15
    pub bold_as_bright: bool,
    /// Start in the UTF-8 coding system instead of ISO-2022
    pub utf8_default: bool,
}

impl Default for VtConfig {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
            enable_8bit_control: false,
            allow_column_width_changes: false,
            enable_csi_j3: true,
            warn_unimplemented: false,
            enable_clipboard_write: true,
            enable_dec12: false,
            osc_time_limit_ms: 20_000,
            alt_is_meta: false,
            ambiguous_wide: false,
            bold_as_bright: true,
            utf8_default: false,
        }
    }
}

impl VtConfig {
    /// Config with a given grid size and every other field defaulted
    pub fn with_size(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid size must be non-zero, got {}x{}",
                self.columns, self.rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = VtConfig::default();
        assert_eq!((config.columns, config.rows), (80, 24));
        assert!(!config.enable_8bit_control);
        assert!(config.enable_csi_j3);
        assert!(config.enable_clipboard_write);
        assert_eq!(config.osc_time_limit_ms, 20_000);
    }

    #[test]
    fn test_partial_json() {
        let config = VtConfig::from_json(r#"{"columns": 132, "enable_8bit_control": true}"#)
            .unwrap();
        assert_eq!(config.columns, 132);
        assert_eq!(config.rows, 24);
        assert!(config.enable_8bit_control);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let err = VtConfig::from_json(r#"{"rows": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = VtConfig::from_json("{columns").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"osc_time_limit_ms": 500}}"#).unwrap();

        let config = VtConfig::load(file.path()).unwrap();
        assert_eq!(config.osc_time_limit_ms, 500);
    }
}
