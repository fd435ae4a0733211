//! # Application Configuration
//!
//! Settings for one receipt: which printer, which image, what text.
//! Loaded from a JSON file; every field has a default so an empty object
//! (or no file at all) prints the stock test receipt.
//!
//! ```json
//! {
//!   "device": "74:F0:7D:E5:91:F7",
//!   "image": "logo.png",
//!   "alignment": "center",
//!   "lines": ["Test in Bixolon SPP-R200III", "", "Thank you!"],
//!   "timestamp": true
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceHandle;
use crate::error::PrintError;
use crate::protocol::text::Alignment;
use crate::render::Binarization;

fn default_alignment() -> Alignment {
    Alignment::Center
}

fn default_lines() -> Vec<String> {
    vec![
        "Test in Bixolon SPP-R200III".to_string(),
        String::new(),
        "Thank you!".to_string(),
    ]
}

fn default_trailing_feed() -> u8 {
    3
}

fn default_connect_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceHandle,

    /// Image printed above the text. No image means a text-only receipt.
    #[serde(default)]
    pub image: Option<PathBuf>,

    /// Horizontal placement of the image.
    #[serde(default = "default_alignment")]
    pub alignment: Alignment,

    /// Receipt text, one entry per printed line.
    #[serde(default = "default_lines")]
    pub lines: Vec<String>,

    /// Blank lines fed after the text so it clears the tear bar.
    #[serde(default = "default_trailing_feed")]
    pub trailing_feed: u8,

    /// Append a local date/time line after the text.
    #[serde(default)]
    pub timestamp: bool,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub binarization: Binarization,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceHandle::default(),
            image: None,
            alignment: default_alignment(),
            lines: default_lines(),
            trailing_feed: default_trailing_feed(),
            timestamp: false,
            connect_timeout_secs: default_connect_timeout(),
            binarization: Binarization::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.
    ///
    /// A relative `image` path is resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PrintError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PrintError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let mut config = Self::from_json(&text).map_err(|e| match e {
            PrintError::Config(msg) => PrintError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if let (Some(image), Some(dir)) = (config.image.as_ref(), path.parent()) {
            if image.is_relative() {
                config.image = Some(dir.join(image));
            }
        }
        Ok(config)
    }

    /// Parse a JSON config string.
    pub fn from_json(text: &str) -> Result<Self, PrintError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| PrintError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every job fail.
    pub fn validate(&self) -> Result<(), PrintError> {
        if self.connect_timeout_secs == 0 {
            return Err(PrintError::Config(
                "connect_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.device.address(), "74:F0:7D:E5:91:F7");
        assert_eq!(config.alignment, Alignment::Center);
        assert_eq!(config.lines[0], "Test in Bixolon SPP-R200III");
        assert_eq!(config.trailing_feed, 3);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.binarization, Binarization::Threshold);
    }

    #[test]
    fn test_parse_fields() {
        let config = AppConfig::from_json(
            r#"{
                "device": "aa:bb:cc:dd:ee:ff",
                "alignment": "right",
                "lines": ["hi"],
                "trailing_feed": 1,
                "timestamp": true,
                "binarization": "bayer"
            }"#,
        )
        .unwrap();
        assert_eq!(config.device.address(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.alignment, Alignment::Right);
        assert_eq!(config.lines, vec!["hi".to_string()]);
        assert_eq!(config.trailing_feed, 1);
        assert!(config.timestamp);
        assert_eq!(config.binarization, Binarization::Bayer);
    }

    #[test]
    fn test_invalid_device_is_config_error() {
        let err = AppConfig::from_json(r#"{"device": "not-a-mac"}"#).unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(AppConfig::from_json(r#"{"devcie": "x"}"#).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::from_json(r#"{"connect_timeout_secs": 0}"#).unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }

    #[test]
    fn test_load_resolves_image_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"image": "logo.png"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.image, Some(dir.path().join("logo.png")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/receipt.json").unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }
}
