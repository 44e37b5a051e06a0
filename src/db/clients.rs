//! Qualifying-client lookup and creation

use log::{debug, warn};
use rusqlite::{OptionalExtension, params};

use crate::error::{Error, Result};
use crate::models::Client;

use super::FixtureStore;

/// Name given to a client created when no qualifying one exists
pub const DEFAULT_CLIENT_NAME: &str = "Foma Bezrukov";

/// Starting balance of a created client
pub const DEFAULT_CLIENT_BALANCE: f64 = 5.0;

/// Map a CLIENT_ID, CLIENT_NAME, BALANCE row to a Client
fn client_from_row(row: &rusqlite::Row) -> rusqlite::Result<Client> {
    Ok(Client {
        client_id: row.get(0)?,
        client_name: row.get(1)?,
        client_balance: row.get(2)?,
    })
}

impl FixtureStore {
    /// Find a client with a positive balance and at least one service
    /// still available for connection
    ///
    /// When no such client exists, creates one with the default name and
    /// balance and returns it.
    pub fn get_or_create_qualifying_client(&mut self) -> Result<Client> {
        let existing = self
            .conn()?
            .query_row(
                r#"
                SELECT CLIENTS.CLIENT_ID, CLIENTS.CLIENT_NAME, BALANCES.BALANCE
                FROM CLIENTS
                INNER JOIN BALANCES ON CLIENTS_CLIENT_ID = CLIENTS.CLIENT_ID
                WHERE BALANCES.BALANCE > 0
                  AND (SELECT count(*)
                       FROM CLIENT_SERVICE CS
                       WHERE CS.CLIENTS_CLIENT_ID = CLIENTS.CLIENT_ID)
                      < (SELECT count(*) FROM SERVICES)
                LIMIT 1
                "#,
                [],
                client_from_row,
            )
            .optional()?;

        match existing {
            Some(client) => Ok(client),
            None => {
                warn!(
                    "no client with a positive balance and a connectable service, \
                     creating one"
                );
                self.create_client(DEFAULT_CLIENT_NAME, DEFAULT_CLIENT_BALANCE)
            }
        }
    }

    /// Stored balance of the client with `client_id`
    ///
    /// Fails with [`Error::BalanceNotFound`] when the client has no
    /// balance row.
    pub fn get_client_balance(&self, client_id: i64) -> Result<f64> {
        self.conn()?
            .query_row(
                "SELECT BALANCE FROM BALANCES WHERE CLIENTS_CLIENT_ID = ?1",
                params![client_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::BalanceNotFound { client_id })
    }

    /// Insert a client row and its balance row, committed as one unit
    ///
    /// Returns the assembled record carrying the generated client id.
    pub fn create_client(&mut self, name: &str, balance: f64) -> Result<Client> {
        let tx = self.conn_mut()?.transaction()?;

        tx.execute("INSERT INTO CLIENTS(CLIENT_NAME) VALUES (?1)", params![name])?;
        let client_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO BALANCES(CLIENTS_CLIENT_ID, BALANCE) VALUES (?1, ?2)",
            params![client_id, balance],
        )?;
        tx.commit()?;

        debug!("created client {client_id} - {name}");

        Ok(Client {
            client_id,
            client_name: name.to_string(),
            client_balance: balance,
        })
    }
}
