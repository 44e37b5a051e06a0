//! Failure taxonomy shared by the API client and the fixture store
//!
//! Every failure is fatal to the calling test step; nothing here is
//! retried or recovered.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A request operation was invoked outside an open session
    #[error("API session is not open")]
    SessionNotOpen,

    /// A query operation was invoked outside an open connection
    #[error("database connection is not open")]
    ConnectionNotOpen,

    /// The API answered with a status the endpoint contract does not allow
    #[error("unexpected status for {url}: expected {expected}, got {got}")]
    UnexpectedStatus {
        url: String,
        expected: u16,
        got: u16,
    },

    /// The client has no balance row
    #[error("no balance found for client {client_id}")]
    BalanceNotFound { client_id: i64 },

    /// Every catalog service is already connected, so the usual test
    /// precondition cannot be satisfied
    #[error("no service available for connection")]
    NoUnconnectedService,

    /// Postcondition check failed: the service did not show up in the
    /// client's connected list
    #[error("service {service_id} not found in the connected list of client {client_id}")]
    ServiceNotConnected { client_id: i64, service_id: i64 },

    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
