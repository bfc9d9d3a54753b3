//! Layered service settings
//!
//! Settings are resolved from built-in defaults, then an optional
//! `config/recipes.toml` file, then `RECIPES_*` environment variables.

use chrono::TimeDelta;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::SettingsError;

/// Prefix shared by every settings environment variable
pub const ENV_PREFIX: &str = "RECIPES";

/// Exact length in bytes of the token secret
pub const TOKEN_SYMMETRIC_KEY_LEN: usize = 32;

/// Service settings shared by the auth and api services
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the HTTP listener binds to
    pub server_address: String,
    /// Symmetric secret used to authenticate tokens
    pub token_symmetric_key: String,
    /// Access token lifetime in seconds
    pub access_token_duration: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_duration: u64,
    /// Directory holding uploaded recipe and author images
    pub images_path: String,
    /// Upper bound in seconds for a single store operation
    pub operation_timeout: u64,
}

impl Settings {
    /// Load settings from defaults, `config/recipes.toml` and `RECIPES_*` variables
    ///
    /// # Environment Variables
    /// - `RECIPES_TOKEN_SYMMETRIC_KEY`: token secret, exactly 32 bytes (required)
    /// - `RECIPES_ACCESS_TOKEN_DURATION`: seconds (default: 900)
    /// - `RECIPES_REFRESH_TOKEN_DURATION`: seconds (default: 86400)
    /// - `RECIPES_SERVER_ADDRESS`: listen address (default: "0.0.0.0:3000")
    /// - `RECIPES_IMAGES_PATH`: image directory (default: "./images")
    /// - `RECIPES_OPERATION_TIMEOUT`: seconds (default: 10)
    pub fn load() -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("server_address", "0.0.0.0:3000")?
            .set_default("access_token_duration", 900_i64)?
            .set_default("refresh_token_duration", 86_400_i64)?
            .set_default("images_path", "./images")?
            .set_default("operation_timeout", 10_i64)?
            .add_source(File::with_name("config/recipes").required(false))
            // Values stay strings; numeric fields are parsed on deserialize
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.token_symmetric_key.is_empty() {
            return Err(SettingsError::Invalid {
                key: "token_symmetric_key",
                reason: "must not be empty".to_string(),
            });
        }

        if self.token_symmetric_key.len() != TOKEN_SYMMETRIC_KEY_LEN {
            return Err(SettingsError::Invalid {
                key: "token_symmetric_key",
                reason: format!(
                    "must be exactly {} bytes, got {}",
                    TOKEN_SYMMETRIC_KEY_LEN,
                    self.token_symmetric_key.len()
                ),
            });
        }

        for (key, value) in [
            ("access_token_duration", self.access_token_duration),
            ("refresh_token_duration", self.refresh_token_duration),
            ("operation_timeout", self.operation_timeout),
        ] {
            if value == 0 || i64::try_from(value).ok().and_then(TimeDelta::try_seconds).is_none() {
                return Err(SettingsError::Invalid {
                    key,
                    reason: format!("{} is not a usable number of seconds", value),
                });
            }
        }

        if self.refresh_token_duration < self.access_token_duration {
            return Err(SettingsError::Invalid {
                key: "refresh_token_duration",
                reason: "must not be shorter than access_token_duration".to_string(),
            });
        }

        Ok(self)
    }

    /// Access token lifetime
    pub fn access_token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.access_token_duration as i64)
    }

    /// Refresh token lifetime
    pub fn refresh_token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.refresh_token_duration as i64)
    }

    /// Upper bound for a single store operation
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout)
    }
}
