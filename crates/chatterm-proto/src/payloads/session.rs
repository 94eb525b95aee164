//! Handshake and keep-alive payloads.

use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;

/// Handshake request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connect {
    /// Protocol version requested.
    pub version: String,
    /// Versions the client can speak.
    pub support: Vec<String>,
}

impl Default for Connect {
    fn default() -> Self {
        Self { version: PROTOCOL_VERSION.to_owned(), support: vec![PROTOCOL_VERSION.to_owned()] }
    }
}

/// Handshake acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Connected {
    /// Server-assigned session identifier.
    #[serde(default)]
    pub session: Option<String>,
}

/// Keep-alive probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ping {
    /// Optional probe ID, echoed in the pong.
    #[serde(default)]
    pub id: Option<String>,
}

/// Keep-alive reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pong {
    /// Echo of the ping's ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Pong {
    /// Reply to `ping`.
    pub fn reply_to(ping: &Ping) -> Self {
        Self { id: ping.id.clone() }
    }
}

/// Protocol-level error frame (`{"msg":"error"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    /// Human-readable reason.
    #[serde(default)]
    pub reason: Option<String>,
}
