use super::types::WalkpoolConfig;
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::path::Path;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Environment prefix; `__` separates nested keys
pub const ENV_PREFIX: &str = "WALKPOOL_";

impl WalkpoolConfig {
    /// Load defaults and environment overrides
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Load defaults, then `custom_config` (if given), then environment
    /// variables, each layer overriding the previous one
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(path) = custom_config {
            tracing::trace!("CONFIG LOAD: Merging {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::from_figment(figment)
    }

    /// Load defaults overlaid with a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::string(toml));
        Self::from_figment(figment)
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: WalkpoolConfig = figment
            .extract()
            .context("Invalid walkpool configuration")?;

        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPolicy;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults_match_struct_defaults() {
        let config = WalkpoolConfig::from_toml_str("").unwrap();
        assert_eq!(config, WalkpoolConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = WalkpoolConfig::from_toml_str(
            r#"
[pool]
max_threads = 4

[walk]
follow_symlinks = true
on_error = "skip"
"#,
        )
        .unwrap();

        assert_eq!(config.pool.max_threads, 4);
        assert_eq!(config.pool.job_queue_capacity, 1);
        assert!(config.walk.follow_symlinks);
        assert!(!config.walk.detect_cycles);
        assert_eq!(config.walk.on_error, ErrorPolicy::Skip);
    }

    #[test]
    fn test_custom_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("walkpool.toml");
        fs::write(&path, "[walk]\ndetect_cycles = true\n").unwrap();

        let config = WalkpoolConfig::load_with_custom_config(Some(&path)).unwrap();
        assert!(config.walk.detect_cycles);
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let result = WalkpoolConfig::from_toml_str("[walk]\non_error = \"retry\"\n");
        assert!(result.is_err());
    }
}
