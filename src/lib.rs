pub mod api;
pub mod config;
pub mod db;
pub mod error;
mod http;
pub mod models;

pub use api::{ApiClient, first_unconnected_service};
pub use config::TestbedConfig;
pub use db::{DEFAULT_CLIENT_BALANCE, DEFAULT_CLIENT_NAME, FixtureStore};
pub use error::{Error, Result};
pub use models::{Client, Service};
