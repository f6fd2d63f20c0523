//! Codec configuration.
//!
//! Configuration is loaded from environment variables with defaults that
//! match the ids FireCMS has always written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::COLLECTION_PATH_SEPARATOR;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings for [`CollectionTreeCodec`](crate::codec::CollectionTreeCodec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Separator joining path segments into composite collection ids.
    pub separator: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            separator: COLLECTION_PATH_SEPARATOR.to_string(),
        }
    }
}

impl CodecConfig {
    /// Create a configuration with a custom separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FIRECMS_COLLECTION_PATH_SEPARATOR`: composite id separator (default: `::`)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            separator: std::env::var("FIRECMS_COLLECTION_PATH_SEPARATOR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(default.separator),
        }
    }

    /// Validate the configuration.
    ///
    /// The separator must be non-empty and must not contain `/`, which
    /// already separates segments inside a collection path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "separator".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.separator.contains('/') {
            return Err(ConfigError::InvalidValue {
                key: "separator".to_string(),
                message: "must not contain '/'".to_string(),
            });
        }
        Ok(())
    }
}
