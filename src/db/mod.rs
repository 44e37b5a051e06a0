//! Fixture access to the database of the application under test
//!
//! This module is split into focused submodules:
//! - `clients`: qualifying-client lookup and creation
//!
//! The schema (`CLIENTS`, `BALANCES`, `SERVICES`, `CLIENT_SERVICE`) is
//! owned by the application; this crate only issues SELECT and INSERT
//! statements against it and carries no DDL.

mod clients;

pub use clients::{DEFAULT_CLIENT_BALANCE, DEFAULT_CLIENT_NAME};

use std::path::PathBuf;

use rusqlite::Connection;

use crate::error::{Error, Result};

/// SQL fixture store over the application's SQLite database
///
/// Query operations need an open connection: `open_connection` before
/// the first query, `close_connection` when done. Operating on a closed
/// store fails with [`Error::ConnectionNotOpen`].
pub struct FixtureStore {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl FixtureStore {
    /// Create a store for the database file at `db_path`
    ///
    /// No connection is opened yet.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            conn: None,
        }
    }

    /// Open the database connection backing all query operations
    pub fn open_connection(&mut self) -> Result<()> {
        self.conn = Some(Connection::open(&self.db_path)?);
        Ok(())
    }

    /// Close the connection
    ///
    /// Fails if no connection is open. Queries fail until the connection
    /// is opened again.
    pub fn close_connection(&mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(Error::ConnectionNotOpen)?;
        conn.close().map_err(|(_, err)| Error::Db(err))
    }

    /// Open a store over an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            conn: Some(Connection::open_in_memory()?),
        })
    }

    pub(crate) fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::ConnectionNotOpen)
    }

    pub(crate) fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(Error::ConnectionNotOpen)
    }
}
