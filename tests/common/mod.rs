//! Common test utilities
//!
//! A stub catalog API served on a loopback port, and an on-disk database
//! carrying the schema of the application under test.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use rusqlite::{Connection, params};
use teststand::{FixtureStore, Service};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn service(id: i64, name: &str, cost: f64) -> Service {
    Service {
        id,
        name: name.to_string(),
        cost,
    }
}

// ==================== Stub Catalog API ====================

/// Stub catalog API state
///
/// Serves the three endpoints the client consumes. An attach request
/// moves the named catalog service into the connected list, so
/// attach-then-verify flows behave like the real application.
pub struct StubCatalog {
    catalog: Vec<Service>,
    connected: Mutex<Vec<Service>>,
    list_status: u16,
    add_status: u16,
}

impl StubCatalog {
    pub fn new(catalog: Vec<Service>, connected: Vec<Service>) -> Self {
        Self {
            catalog,
            connected: Mutex::new(connected),
            list_status: 200,
            add_status: 202,
        }
    }

    /// Override the statuses answered by the listing and attach endpoints
    pub fn with_statuses(mut self, list_status: u16, add_status: u16) -> Self {
        self.list_status = list_status;
        self.add_status = add_status;
        self
    }
}

/// Serve `stub` on a loopback port and return the base URL
///
/// Every response closes its connection, so the accept loop serves one
/// request at a time. The thread ends with the test process.
pub fn spawn_stub_api(stub: StubCatalog) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub API");
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let stub = Arc::new(stub);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            handle_request(stream, &stub);
        }
    });

    base_url
}

fn handle_request(stream: TcpStream, stub: &StubCatalog) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() || line.trim_end().is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let (status, payload) = route(&request_line, &body, stub);
    respond(reader.into_inner(), status, &payload);
}

fn route(request_line: &str, body: &[u8], stub: &StubCatalog) -> (u16, String) {
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    match (method, path) {
        ("GET", "/services") => (stub.list_status, items_json(&stub.catalog)),
        ("POST", "/client/services") => {
            let connected = stub.connected.lock().unwrap();
            (stub.list_status, items_json(&connected))
        }
        ("POST", "/client/add_service") => {
            if stub.add_status == 202 {
                record_connection(body, stub);
            }
            (stub.add_status, String::new())
        }
        _ => (404, String::new()),
    }
}

/// Move the requested catalog service into the connected list
fn record_connection(body: &[u8], stub: &StubCatalog) {
    let Ok(request) = serde_json::from_slice::<serde_json::Value>(body) else {
        return;
    };
    let Some(service_id) = request.get("service_id").and_then(|id| id.as_i64()) else {
        return;
    };

    if let Some(found) = stub.catalog.iter().find(|s| s.id == service_id) {
        let mut connected = stub.connected.lock().unwrap();
        if !connected.contains(found) {
            connected.push(found.clone());
        }
    }
}

fn items_json(services: &[Service]) -> String {
    serde_json::json!({ "items": services }).to_string()
}

fn respond(mut stream: TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        202 => "Accepted",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "No Reason",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

// ==================== On-Disk Test Database ====================

/// Schema of the application under test, as its database ships it
const SUT_SCHEMA: &str = r#"
CREATE TABLE CLIENTS (
    CLIENT_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    CLIENT_NAME TEXT NOT NULL
);

CREATE TABLE BALANCES (
    CLIENTS_CLIENT_ID INTEGER NOT NULL REFERENCES CLIENTS(CLIENT_ID),
    BALANCE REAL NOT NULL
);

CREATE TABLE SERVICES (
    SERVICE_ID INTEGER PRIMARY KEY AUTOINCREMENT,
    SERVICE_NAME TEXT NOT NULL,
    COST REAL NOT NULL
);

CREATE TABLE CLIENT_SERVICE (
    CLIENTS_CLIENT_ID INTEGER NOT NULL REFERENCES CLIENTS(CLIENT_ID),
    SERVICES_SERVICE_ID INTEGER NOT NULL REFERENCES SERVICES(SERVICE_ID)
);
"#;

/// Test context owning a fixture store over a temporary on-disk database
pub struct TestDb {
    pub store: FixtureStore,
    dir: tempfile::TempDir,
}

impl TestDb {
    /// Create the database with the application schema and open a store on it
    pub fn new() -> Self {
        init_logging();

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("sut.db");

        let conn = Connection::open(&path).expect("Failed to create test database");
        conn.execute_batch(SUT_SCHEMA)
            .expect("Failed to create application schema");
        drop(conn);

        let mut store = FixtureStore::new(path);
        store
            .open_connection()
            .expect("Failed to open fixture store");

        TestDb { store, dir }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("sut.db")
    }

    /// Side connection for seeding rows the store's public surface does not insert
    pub fn raw(&self) -> Connection {
        Connection::open(self.db_path()).expect("Failed to open side connection")
    }

    pub fn seed_service(&self, name: &str, cost: f64) -> i64 {
        let conn = self.raw();
        conn.execute(
            "INSERT INTO SERVICES(SERVICE_NAME, COST) VALUES (?1, ?2)",
            params![name, cost],
        )
        .expect("Failed to seed service");
        conn.last_insert_rowid()
    }

    pub fn seed_connection(&self, client_id: i64, service_id: i64) {
        self.raw()
            .execute(
                "INSERT INTO CLIENT_SERVICE(CLIENTS_CLIENT_ID, SERVICES_SERVICE_ID) VALUES (?1, ?2)",
                params![client_id, service_id],
            )
            .expect("Failed to seed connection");
    }
}
