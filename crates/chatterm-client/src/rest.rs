//! REST room source.
//!
//! Rooms that appear on the message stream but were missing from the bulk
//! catalog are looked up one at a time through `rooms.info`.

use std::time::Duration;

use chatterm_core::{CatalogError, RoomSource};
use chatterm_proto::payloads::{RoomInfo, RoomRecord};
use reqwest::StatusCode;
use tracing::debug;

use crate::transport::TransportError;

/// Single-room lookup endpoint.
pub const ROOM_INFO_PATH: &str = "/api/v1/rooms.info";

/// Sources that need the session's credentials before they can be used.
pub trait Authorize {
    /// Attach the authenticated user's credentials to later requests.
    fn authorize(&mut self, user_id: &str, token: &str);
}

#[derive(Clone)]
struct Credentials {
    user_id: String,
    token: String,
}

/// [`RoomSource`] backed by the backend's REST API.
#[derive(Clone)]
pub struct RestRoomSource {
    http: reqwest::Client,
    base: String,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for RestRoomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRoomSource")
            .field("base", &self.base)
            .field("authorized", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

impl RestRoomSource {
    /// Create a source rooted at `base` (e.g. `https://chat.example.com`).
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { http, base: base.into().trim_end_matches('/').to_string(), credentials: None })
    }

    /// Full URL of the room lookup endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{ROOM_INFO_PATH}", self.base)
    }
}

impl Authorize for RestRoomSource {
    fn authorize(&mut self, user_id: &str, token: &str) {
        self.credentials = Some(Credentials { user_id: user_id.to_string(), token: token.to_string() });
    }
}

impl RoomSource for RestRoomSource {
    async fn fetch_room(&self, room_id: &str) -> Result<Option<RoomRecord>, CatalogError> {
        let mut request = self.http.get(self.endpoint()).query(&[("roomId", room_id)]);
        if let Some(creds) = &self.credentials {
            request = request.header("X-Auth-Token", &creds.token).header("X-User-Id", &creds.user_id);
        }

        let response = request.send().await.map_err(|e| CatalogError::Source(e.to_string()))?;
        let status = response.status();
        debug!(room_id, %status, "room lookup");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::Source(format!("rooms.info returned {status}")));
        }

        let info: RoomInfo =
            response.json().await.map_err(|e| CatalogError::Source(e.to_string()))?;
        Ok(if info.success == Some(false) { None } else { info.room })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let source =
            RestRoomSource::new("https://chat.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.endpoint(), "https://chat.example.com/api/v1/rooms.info");
    }

    #[test]
    fn debug_hides_credentials() {
        let mut source = RestRoomSource::new("http://h", Duration::from_secs(1)).unwrap();
        source.authorize("u1", "secret-token");
        let shown = format!("{source:?}");
        assert!(shown.contains("authorized: true"));
        assert!(!shown.contains("secret-token"));
    }
}
