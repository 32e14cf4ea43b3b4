//! Configuration errors

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents did not parse in the expected format
    #[error("Failed to parse {format} configuration: {message}")]
    Parse {
        /// Format that was being parsed
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// A field holds a value that fails validation
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: String,
        /// Why the value was rejected
        value: String,
    },

    /// No parser is available for the requested format
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            format: "json",
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse {
            format: "yaml",
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse {
            format: "toml",
            message: err.to_string(),
        }
    }
}
