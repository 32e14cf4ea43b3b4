//! Configuration loading
//!
//! Files are parsed by extension (`.toml`, `.yaml`/`.yml`, `.json`), then
//! environment overrides are applied, then the result is validated. This
//! happens once at startup; the loaded value is injected from there.

use crate::config::TroveConfig;
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "TROVE_LOG_LEVEL";
/// Environment variable overriding `search.base_url` (and enabling search)
pub const ENV_SEARCH_URL: &str = "TROVE_SEARCH_URL";
/// Environment variable overriding `paging.default_limit`
pub const ENV_DEFAULT_LIMIT: &str = "TROVE_DEFAULT_LIMIT";
/// Environment variable overriding `paging.max_limit`
pub const ENV_MAX_LIMIT: &str = "TROVE_MAX_LIMIT";

/// Serialized configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML
    Toml,
    /// YAML
    Yaml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads [`TroveConfig`] from files or strings
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse, override from the environment, and validate a config file.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<TroveConfig, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), ?format, "loading configuration");

        let mut config = Self::parse(&contents, format)?;
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration text. No environment overrides.
    pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<TroveConfig, ConfigError> {
        let config = Self::parse(contents, format)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str, format: ConfigFormat) -> Result<TroveConfig, ConfigError> {
        match format {
            ConfigFormat::Json => Ok(serde_json::from_str(contents)?),
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(contents)?),
            #[cfg(not(feature = "yaml"))]
            ConfigFormat::Yaml => Err(ConfigError::UnsupportedFormat("yaml".to_string())),
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => Ok(toml::from_str(contents)?),
            #[cfg(not(feature = "toml"))]
            ConfigFormat::Toml => Err(ConfigError::UnsupportedFormat("toml".to_string())),
        }
    }

    /// Apply `TROVE_*` environment overrides.
    pub fn apply_env_overrides(config: &mut TroveConfig) -> Result<(), ConfigError> {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Ok(url) = std::env::var(ENV_SEARCH_URL) {
            config.search.base_url = Some(url);
            config.search.enabled = true;
        }
        if let Ok(raw) = std::env::var(ENV_DEFAULT_LIMIT) {
            config.paging.default_limit = parse_limit(ENV_DEFAULT_LIMIT, &raw)?;
        }
        if let Ok(raw) = std::env::var(ENV_MAX_LIMIT) {
            config.paging.max_limit = parse_limit(ENV_MAX_LIMIT, &raw)?;
        }
        Ok(())
    }
}

fn parse_limit(var: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(var, format!("'{}' is not a non-negative integer", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
    }

    #[test]
    fn test_parse_json() {
        let config = ConfigLoader::load_from_str(
            r#"{"paging": {"default_limit": 5, "max_limit": 25}}"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(config.paging.default_limit, 5);
        assert_eq!(config.paging.max_limit, 25);
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = ConfigLoader::load_from_str("{ not json", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "json", .. }));
    }
}
