//! Session cookie handling
//!
//! Resolves the `SESSION` cookie from the WebSocket handshake request and
//! mints a new one when the client has none.

use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE, SET_COOKIE};
use tracing::{debug, warn};

use crate::types::SessionId;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "SESSION";

/// Shortest cookie value accepted as a session id; keeps ids clear of
/// the reserved notice labels
const MIN_SESSION_LEN: usize = 16;
/// Longest cookie value accepted as a session id
const MAX_SESSION_LEN: usize = 128;

/// Find a well-formed session id in the request's `Cookie` headers
pub fn from_request(request: &Request) -> Option<SessionId> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_cookie_header)
}

/// Extract the session id from one `Cookie` header value
pub fn parse_cookie_header(header: &str) -> Option<SessionId> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_valid_id(value))
        .map(SessionId::new)
}

fn is_valid_id(value: &str) -> bool {
    (MIN_SESSION_LEN..=MAX_SESSION_LEN).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolve the session for a handshake
///
/// Uses the request cookie if there is one. Otherwise, when `issue` is set,
/// mints a fresh id and adds a `Set-Cookie` header to `response`.
pub fn resolve(request: &Request, response: &mut Response, issue: bool) -> Option<SessionId> {
    if let Some(session) = from_request(request) {
        return Some(session);
    }
    if !issue {
        debug!("Handshake without session cookie, issuing disabled");
        return None;
    }

    let session = SessionId::generate();
    let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
            debug!("Issued new session {}", session);
            Some(session)
        }
        Err(e) => {
            warn!("Failed to build session cookie: {}", e);
            None
        }
    }
}
