use serde::{Deserialize, Serialize};

/// A catalog offering a client can be connected to
///
/// Reference data owned by the application under test; this crate only
/// reads it. Equality compares the full record (id, name and cost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub cost: f64,
}

/// A test-subject account with a balance and zero or more connected services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: i64,
    pub client_name: String,
    pub client_balance: f64,
}
