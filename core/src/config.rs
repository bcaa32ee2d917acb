//! Configuration management for the console client.
//!
//! Defaults are layered under `LMS_`-prefixed environment variables
//! (`LMS_API_URL`, `LMS_STORAGE_PATH`); a `.env` file is honoured.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_STORAGE_PATH: &str = ".lms/storage.json";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the library management API.
    pub api_url: String,
    /// File backing the remembered-email store.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();
        Ok(Self::from_environment(Environment::with_prefix("LMS"))?)
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("storage_path", DEFAULT_STORAGE_PATH)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}
