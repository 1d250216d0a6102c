//! Deck configuration.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration:
//!
//! ```yaml
//! min_slides: 3
//! max_slides: 20
//! call_timeout_secs: 45
//! plan_timeout_secs: 120
//! vendor: gemini
//! slide_width_emu: 12192000
//! slide_height_emu: 6858000
//! ```
use crate::common::error::{Error, Result};
use crate::generation::ImageVendor;
use crate::ooxml::pptx::SlideSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Orchestrator and export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Smallest slide count a plan may request
    pub min_slides: u32,
    /// Largest slide count a plan may request
    pub max_slides: u32,
    /// Bound on each generate or edit call
    pub call_timeout_secs: u64,
    /// Bound on the planning call
    pub plan_timeout_secs: u64,
    pub vendor: ImageVendor,
    pub slide_width_emu: i64,
    pub slide_height_emu: i64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            min_slides: 3,
            max_slides: 20,
            call_timeout_secs: 45,
            plan_timeout_secs: 120,
            vendor: ImageVendor::default(),
            slide_width_emu: SlideSize::WIDESCREEN.width_emu,
            slide_height_emu: SlideSize::WIDESCREEN.height_emu,
        }
    }
}

impl DeckConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: DeckConfig = if yaml.trim().is_empty() {
            DeckConfig::default()
        } else {
            serde_saphyr::from_str(yaml)
                .map_err(|e| Error::Config(format!("YAML parse error: {}", e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.min_slides == 0 {
            return Err(Error::Config("min_slides must be > 0".to_string()));
        }
        if self.min_slides > self.max_slides {
            return Err(Error::Config(format!(
                "min_slides ({}) must not exceed max_slides ({})",
                self.min_slides, self.max_slides
            )));
        }
        if self.call_timeout_secs == 0 {
            return Err(Error::Config("call_timeout_secs must be > 0".to_string()));
        }
        if self.plan_timeout_secs == 0 {
            return Err(Error::Config("plan_timeout_secs must be > 0".to_string()));
        }
        if self.slide_width_emu <= 0 || self.slide_height_emu <= 0 {
            return Err(Error::Config(format!(
                "slide size must be positive, got {}x{}",
                self.slide_width_emu, self.slide_height_emu
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    #[inline]
    pub fn plan_timeout(&self) -> Duration {
        Duration::from_secs(self.plan_timeout_secs)
    }

    #[inline]
    pub fn slide_count_range(&self) -> RangeInclusive<u32> {
        self.min_slides..=self.max_slides
    }

    #[inline]
    pub fn slide_size(&self) -> SlideSize {
        SlideSize::new(self.slide_width_emu, self.slide_height_emu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DeckConfig::from_yaml_str("").unwrap();
        assert_eq!(config, DeckConfig::default());
        assert_eq!(config.slide_count_range(), 3..=20);
        assert_eq!(config.call_timeout(), Duration::from_secs(45));
        assert_eq!(config.plan_timeout(), Duration::from_secs(120));
        assert_eq!(config.slide_size(), SlideSize::new(12192000, 6858000));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = DeckConfig::from_yaml_str("max_slides: 8\nvendor: openai\n").unwrap();
        assert_eq!(config.max_slides, 8);
        assert_eq!(config.min_slides, 3);
        assert_eq!(config.vendor, ImageVendor::OpenAi);
    }

    #[test]
    fn test_validation_errors() {
        for yaml in [
            "min_slides: 0",
            "min_slides: 9\nmax_slides: 4",
            "call_timeout_secs: 0",
            "plan_timeout_secs: 0",
            "slide_width_emu: -1",
            "vendor: dalle",
            "unknown_key: 1",
        ] {
            assert!(
                matches!(DeckConfig::from_yaml_str(yaml), Err(Error::Config(_))),
                "accepted {:?}",
                yaml
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "call_timeout_secs: 5").unwrap();
        writeln!(file, "slide_width_emu: 9144000").unwrap();

        let config = DeckConfig::load(file.path()).unwrap();
        assert_eq!(config.call_timeout(), Duration::from_secs(5));
        assert_eq!(config.slide_size().width_emu, 9144000);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DeckConfig::load(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
