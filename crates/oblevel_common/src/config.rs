//! User configuration.
//!
//! TOML file at `~/.config/oblevel/config.toml` (XDG), overridable with
//! `$OBLEVEL_CONFIG`. Everything is optional; a missing file means
//! defaults.

use crate::error::{ObLevelError, Result};
use crate::rules::Ruleset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database file; defaults to the XDG data dir.
    pub database: Option<PathBuf>,
    /// Ruleset overrides for variant editions.
    #[serde(default)]
    pub rules: RulesOverride,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesOverride {
    pub major_increase_threshold: Option<u32>,
    pub multiplier_cap: Option<u32>,
    pub max_major_skills: Option<usize>,
}

impl Config {
    /// Resolve and load the config file, tolerating its absence.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| ObLevelError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// `$OBLEVEL_CONFIG` wins; otherwise the XDG config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("OBLEVEL_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("oblevel").join("config.toml"))
    }

    /// Database location: explicit config, else XDG data dir.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database {
            return path.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oblevel")
            .join("oblevels.db")
    }

    /// Defaults with any configured overrides applied.
    pub fn ruleset(&self) -> Ruleset {
        let base = Ruleset::default();
        Ruleset {
            major_increase_threshold: self
                .rules
                .major_increase_threshold
                .unwrap_or(base.major_increase_threshold),
            multiplier_cap: self.rules.multiplier_cap.unwrap_or(base.multiplier_cap),
            max_major_skills: self.rules.max_major_skills.unwrap_or(base.max_major_skills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ruleset(), Ruleset::default());
        assert!(config.database.is_none());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            database = "/tmp/test.db"

            [rules]
            major_increase_threshold = 12
            "#,
        )
        .unwrap();
        let rules = config.ruleset();
        assert_eq!(rules.major_increase_threshold, 12);
        assert_eq!(rules.multiplier_cap, 5);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/test.db"));
    }
}
