//! Test-environment configuration
//!
//! The two things a test run needs to know about the application under
//! test: where its API listens and where its database file lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::db::FixtureStore;
use crate::error::Result;

/// Location of the application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestbedConfig {
    /// Root URL of the catalog API, e.g. `http://localhost:8080`
    pub api_root_url: String,
    /// Path to the application's SQLite database file
    pub db_path: PathBuf,
}

impl TestbedConfig {
    /// Load the configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// API client for the configured root URL (no session opened yet)
    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(&self.api_root_url)
    }

    /// Fixture store for the configured database (no connection opened yet)
    pub fn fixture_store(&self) -> FixtureStore {
        FixtureStore::new(self.db_path.clone())
    }
}
