//! Client for the service-catalog API of the application under test
//!
//! Three endpoints are consumed: the full catalog listing, a client's
//! connected-service listing, and the attach-service call. Each request
//! operation validates the status code the endpoint contract names and
//! unwraps the JSON payload; anything else is surfaced as an error.

use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::http::build_agent;
use crate::models::Service;

const CONTENT_TYPE: &str = "application/json";

/// Body shape both listing endpoints answer with
#[derive(Debug, Deserialize)]
struct ServiceItems {
    items: Vec<Service>,
}

/// HTTP client for the catalog API
///
/// Request operations need an open session: `open_session` before the
/// first request, `close_session` when done. Operating on a closed
/// session fails with [`Error::SessionNotOpen`].
pub struct ApiClient {
    all_services_url: String,
    client_services_url: String,
    add_service_url: String,
    session: Option<ureq::Agent>,
}

impl ApiClient {
    /// Create a client for the API rooted at `root_url`
    ///
    /// Derives the three endpoint URLs; no session is opened yet.
    pub fn new(root_url: &str) -> Self {
        let root = root_url.trim_end_matches('/');
        Self {
            all_services_url: format!("{root}/services"),
            client_services_url: format!("{root}/client/services"),
            add_service_url: format!("{root}/client/add_service"),
            session: None,
        }
    }

    /// Open the HTTP session reused by all request operations
    pub fn open_session(&mut self) {
        self.session = Some(build_agent());
    }

    /// Close the session
    ///
    /// Fails if no session is open. Requests fail until a session is
    /// opened again.
    pub fn close_session(&mut self) -> Result<()> {
        self.session.take().map(|_| ()).ok_or(Error::SessionNotOpen)
    }

    /// Fetch the full service catalog
    ///
    /// Expects HTTP 200.
    pub fn get_all_services(&self) -> Result<Vec<Service>> {
        let (status, body) = self.get(&self.all_services_url)?;
        expect_status(200, status, &self.all_services_url)?;

        let catalog: ServiceItems = serde_json::from_str(&body)?;
        Ok(catalog.items)
    }

    /// Fetch the services connected to the client with `client_id`
    ///
    /// Expects HTTP 200.
    pub fn get_connected_services(&self, client_id: i64) -> Result<Vec<Service>> {
        let payload = json!({ "client_id": client_id });
        let (status, body) = self.post(&self.client_services_url, &payload)?;
        expect_status(200, status, &self.client_services_url)?;

        let connected: ServiceItems = serde_json::from_str(&body)?;
        Ok(connected.items)
    }

    /// Attach the service with `service_id` to the client with `client_id`
    ///
    /// Expects HTTP 202; the response body carries no contract.
    pub fn connect_service(&self, client_id: i64, service_id: i64) -> Result<()> {
        let payload = json!({ "client_id": client_id, "service_id": service_id });
        let (status, _) = self.post(&self.add_service_url, &payload)?;
        expect_status(202, status, &self.add_service_url)
    }

    /// Check that `service_id` shows up in the client's connected list
    ///
    /// Fails with [`Error::ServiceNotConnected`] when it does not.
    pub fn check_service_connected(&self, client_id: i64, service_id: i64) -> Result<()> {
        let connected = self.get_connected_services(client_id)?;

        if connected.iter().any(|service| service.id == service_id) {
            Ok(())
        } else {
            Err(Error::ServiceNotConnected {
                client_id,
                service_id,
            })
        }
    }

    fn session(&self) -> Result<&ureq::Agent> {
        self.session.as_ref().ok_or(Error::SessionNotOpen)
    }

    /// Send a GET request and log its detail
    fn get(&self, url: &str) -> Result<(u16, String)> {
        let mut response = self
            .session()?
            .get(url)
            .header("Content-Type", CONTENT_TYPE)
            .call()?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.body_mut().read_to_string()?;

        debug!(
            "url: {url}\n\
             request headers: Content-Type: {CONTENT_TYPE}\n\
             status code: {status}\n\
             response headers: {headers:?}\n\
             response text: {text}"
        );

        Ok((status, text))
    }

    /// Send a POST request with a JSON body and log its detail
    fn post(&self, url: &str, body: &serde_json::Value) -> Result<(u16, String)> {
        let mut response = self
            .session()?
            .post(url)
            .header("Content-Type", CONTENT_TYPE)
            .send_json(body)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.body_mut().read_to_string()?;

        debug!(
            "url: {url}\n\
             request headers: Content-Type: {CONTENT_TYPE}\n\
             request body: {body}\n\
             status code: {status}\n\
             response headers: {headers:?}\n\
             response text: {text}"
        );

        Ok((status, text))
    }
}

/// First entry of `all` that is absent from `connected`
///
/// Membership compares full records, so a service whose name or cost
/// differs between the two listings counts as unconnected. Fails with
/// [`Error::NoUnconnectedService`] when `connected` covers all of `all`,
/// including the empty-catalog case.
pub fn first_unconnected_service<'a>(
    connected: &[Service],
    all: &'a [Service],
) -> Result<&'a Service> {
    all.iter()
        .find(|service| !connected.contains(service))
        .ok_or(Error::NoUnconnectedService)
}

fn expect_status(expected: u16, got: u16, url: &str) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::UnexpectedStatus {
            url: url.to_string(),
            expected,
            got,
        })
    }
}
