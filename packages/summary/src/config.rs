//! Tunables for the overview engine, loadable from TOML.
//!
//! ```toml
//! allocation_bin_minutes = 10
//!
//! [thresholds]
//! day_max_days = 180
//! week_max_days = 365
//! month_max_days = 1826
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SummaryError;
use crate::bucket::BucketThresholds;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Engine configuration. Every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Span thresholds for granularity selection.
    pub thresholds: BucketThresholds,
    /// Width of the time-of-day bins used by the allocation breakdown.
    pub allocation_bin_minutes: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            thresholds: BucketThresholds::default(),
            allocation_bin_minutes: 10,
        }
    }
}

impl SummaryConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Config`] if the document is malformed or the
    /// values are invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, SummaryError> {
        let config: Self = toml::from_str(s).map_err(|e| SummaryError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Config`] if the file cannot be read, is
    /// malformed, or holds invalid values.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SummaryError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        log::debug!("Loaded summary config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Checks the thresholds and that the allocation bin evenly divides a day.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Config`] on the first invalid value.
    pub fn validate(&self) -> Result<(), SummaryError> {
        self.thresholds.validate()?;
        if self.allocation_bin_minutes == 0 || MINUTES_PER_DAY % self.allocation_bin_minutes != 0 {
            return Err(SummaryError::Config {
                message: format!(
                    "allocation_bin_minutes must divide {MINUTES_PER_DAY}, got {}",
                    self.allocation_bin_minutes
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SummaryConfig::from_toml_str("").unwrap();
        assert_eq!(config, SummaryConfig::default());
    }

    #[test]
    fn partial_thresholds_keep_other_defaults() {
        let config = SummaryConfig::from_toml_str(
            "allocation_bin_minutes = 15\n[thresholds]\nday_max_days = 90\n",
        )
        .unwrap();
        assert_eq!(config.allocation_bin_minutes, 15);
        assert_eq!(config.thresholds.day_max_days, 90);
        assert_eq!(config.thresholds.week_max_days, 365);
    }

    #[test]
    fn rejects_bin_that_does_not_divide_a_day() {
        let err = SummaryConfig::from_toml_str("allocation_bin_minutes = 7").unwrap_err();
        assert!(matches!(err, SummaryError::Config { .. }));

        let err = SummaryConfig::from_toml_str("allocation_bin_minutes = 0").unwrap_err();
        assert!(matches!(err, SummaryError::Config { .. }));
    }

    #[test]
    fn rejects_threshold_too_large_for_a_duration() {
        let err = SummaryConfig::from_toml_str(
            "[thresholds]\nday_max_days = 180\nweek_max_days = 365\nmonth_max_days = 200000000000000\n",
        )
        .unwrap_err();
        assert!(matches!(err, SummaryError::Config { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = SummaryConfig::from_toml_str("thresholds = [").unwrap_err();
        assert!(matches!(err, SummaryError::Config { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = SummaryConfig::load(Path::new("/nonexistent/cfs_summary.toml")).unwrap_err();
        assert!(matches!(err, SummaryError::Config { .. }));
    }
}
