//! HTTP agent construction for API sessions

use std::time::Duration;

/// Build the agent backing one API session
///
/// Non-2xx responses come back as responses rather than errors: judging
/// status codes is part of the client contract.
pub(crate) fn build_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(5)))
        .http_status_as_error(false)
        .build()
        .new_agent()
}
