//! Test utilities for configuration testing.

use crate::{ConfigFormat, EndpointConfig, PagingConfig, TroveConfig};
use std::io::Write;
use tempfile::NamedTempFile;

/// Test configuration builder.
pub struct TestConfigBuilder {
    config: TroveConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    /// Start from defaults.
    pub fn new() -> Self {
        Self {
            config: TroveConfig::default(),
        }
    }

    /// Set global paging limits.
    pub fn paging(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.config.paging = PagingConfig::new(default_limit, max_limit);
        self
    }

    /// Add an endpoint.
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.config.endpoints.push(endpoint);
        self
    }

    /// Enable search against `base_url`.
    pub fn search(mut self, base_url: impl Into<String>) -> Self {
        self.config.search.enabled = true;
        self.config.search.base_url = Some(base_url.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> TroveConfig {
        self.config
    }
}

/// Temporary configuration files.
pub struct TempConfig;

impl TempConfig {
    /// Write `config` to a temp file with the extension matching `format`.
    ///
    /// Keep the returned handle alive for as long as the file is needed.
    pub fn create_temp_file_with_format(config: &TroveConfig, format: ConfigFormat) -> NamedTempFile {
        let (suffix, content) = match format {
            ConfigFormat::Json => (".json", serde_json::to_string_pretty(config).unwrap()),
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => (".yaml", serde_yaml::to_string(config).unwrap()),
            #[cfg(not(feature = "yaml"))]
            ConfigFormat::Yaml => (".json", serde_json::to_string_pretty(config).unwrap()),
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => (".toml", toml::to_string_pretty(config).unwrap()),
            #[cfg(not(feature = "toml"))]
            ConfigFormat::Toml => (".json", serde_json::to_string_pretty(config).unwrap()),
        };

        let mut temp_file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigLoader;

    #[test]
    fn test_builder() {
        let config = TestConfigBuilder::new()
            .paging(20, 200)
            .endpoint(EndpointConfig::new("catalog", ["classes"]))
            .search("http://search.local")
            .build();

        assert!(config.validate().is_ok());
        assert_eq!(config.paging.max_limit, 200);
        assert!(config.search.enabled);
    }

    #[test]
    fn test_temp_file_round_trip() {
        let config = TestConfigBuilder::new().paging(7, 70).build();
        let file = TempConfig::create_temp_file_with_format(&config, ConfigFormat::Json);

        let content = std::fs::read_to_string(file.path()).unwrap();
        let loaded = ConfigLoader::load_from_str(&content, ConfigFormat::Json).unwrap();
        assert_eq!(loaded, config);
    }
}
