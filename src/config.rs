//! Service configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! max_tags_per_option = 5
//! max_duration_minutes = 1440
//! pick_delay_ms = 800
//!
//! [session]
//! ttl_hours = 168
//! refresh_window_hours = 24
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DecisionError, DecisionResult, ValidationError};
use crate::option::{Weight, MAX_DURATION_MINUTES};
use crate::tags::MAX_TAGS_PER_OPTION;

/// Session lifetime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a freshly issued session stays valid.
    pub ttl_hours: u32,
    /// Sessions with less than this remaining are extended on use.
    pub refresh_window_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 7 * 24,
            refresh_window_hours: 24,
        }
    }
}

impl SessionConfig {
    /// Session lifetime as a chrono duration.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ttl_hours))
    }

    /// Refresh window as a chrono duration.
    #[must_use]
    pub fn refresh_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.refresh_window_hours))
    }
}

/// Catalog limits and presentation pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Tags kept per option; extra tags are dropped.
    pub max_tags_per_option: usize,
    /// Upper bound for a declared duration.
    pub max_duration_minutes: u32,
    /// Longest accepted option name, in characters.
    pub max_name_len: usize,
    /// Artificial delay the presentation layer applies before showing a
    /// pick. The engine never sleeps.
    pub pick_delay_ms: u64,
    /// Session lifetime settings, the `[session]` table.
    pub session: SessionConfig,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            max_tags_per_option: MAX_TAGS_PER_OPTION,
            max_duration_minutes: MAX_DURATION_MINUTES,
            max_name_len: 200,
            pick_delay_ms: 800,
            session: SessionConfig::default(),
        }
    }
}

impl DecisionConfig {
    /// Parse a TOML document and validate it.
    ///
    /// # Errors
    /// Returns a configuration error for malformed TOML, or a validation
    /// error for inconsistent values.
    pub fn from_toml_str(content: &str) -> DecisionResult<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| DecisionError::config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or parsed,
    /// or a validation error for inconsistent values.
    pub fn load(path: impl AsRef<Path>) -> DecisionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DecisionError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Rejects settings the catalog cannot honour.
    ///
    /// # Errors
    /// `InvalidConfig` naming the first inconsistent field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidConfig {
            reason: reason.to_string(),
        };

        if self.max_tags_per_option == 0 {
            return Err(invalid("max_tags_per_option must be at least 1"));
        }
        if self.max_duration_minutes == 0 || self.max_duration_minutes > MAX_DURATION_MINUTES {
            return Err(invalid("max_duration_minutes must be within 1-1440"));
        }
        if self.max_name_len == 0 {
            return Err(invalid("max_name_len must be at least 1"));
        }
        if self.session.ttl_hours == 0 {
            return Err(invalid("session.ttl_hours must be at least 1"));
        }
        if self.session.refresh_window_hours > self.session.ttl_hours {
            return Err(invalid("session.refresh_window_hours cannot exceed ttl_hours"));
        }
        Ok(())
    }

    /// UI pacing delay.
    #[must_use]
    pub const fn pick_delay(&self) -> Duration {
        Duration::from_millis(self.pick_delay_ms)
    }

    /// Weight range accepted by the catalog, for display.
    #[must_use]
    pub const fn weight_range(&self) -> (u8, u8) {
        (Weight::MIN, Weight::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = DecisionConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, DecisionConfig::default());
        assert_eq!(cfg.max_tags_per_option, 5);
        assert_eq!(cfg.max_duration_minutes, 1440);
        assert_eq!(cfg.pick_delay(), Duration::from_millis(800));
        assert_eq!(cfg.session.ttl(), chrono::Duration::days(7));
        assert_eq!(cfg.weight_range(), (1, 10));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = DecisionConfig::from_toml_str(
            "pick_delay_ms = 0\n[session]\nrefresh_window_hours = 2\n",
        )
        .unwrap();
        assert_eq!(cfg.pick_delay_ms, 0);
        assert_eq!(cfg.session.refresh_window_hours, 2);
        assert_eq!(cfg.session.ttl_hours, 168);
        assert_eq!(cfg.max_tags_per_option, 5);
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let err = DecisionConfig::from_toml_str("max_tags_per_option = 0").unwrap_err();
        assert!(err.is_validation());

        let err = DecisionConfig::from_toml_str("max_duration_minutes = 2000").unwrap_err();
        assert!(err.is_validation());

        let err = DecisionConfig::from_toml_str(
            "[session]\nttl_hours = 1\nrefresh_window_hours = 2\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("refresh_window_hours"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = DecisionConfig::from_toml_str("max_tags_per_option = \"five\"").unwrap_err();
        assert!(matches!(err, DecisionError::Config { .. }));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_name_len = 64").unwrap();
        let cfg = DecisionConfig::load(file.path()).unwrap();
        assert_eq!(cfg.max_name_len, 64);

        let err = DecisionConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, DecisionError::Config { .. }));
    }
}
