//! Minimal frame discriminator.
//!
//! Every inbound frame is first decoded into a [`FrameHeader`]. The header
//! carries only what the session needs to pick a branch: the message kind, the
//! correlation ID echoed by replies, and the collection name on stream events.
//! Everything else stays in the raw text until the branch is known.

use serde::Deserialize;

/// Closed set of inbound frame kinds.
///
/// Kinds the client never acts on (`added`, `updated`, `pong`, the server's
/// initial `server_id` greeting without a `msg` field, ...) collapse into
/// [`FrameKind::Other`] so that dispatch stays exhaustive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Reply to the protocol handshake (`connected`).
    #[serde(rename = "connected")]
    HandshakeAck,
    /// Reply to a method call.
    Result,
    /// Stream event on a subscribed collection.
    Changed,
    /// Keep-alive probe from the server.
    Ping,
    /// Protocol-level error reported by the server.
    Error,
    /// Subscription acknowledged.
    Ready,
    /// Subscription refused or terminated.
    #[serde(rename = "nosub")]
    NoSub,
    /// Anything else.
    #[default]
    #[serde(other)]
    Other,
}

impl FrameKind {
    /// Wire name of this kind, for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HandshakeAck => "connected",
            Self::Result => "result",
            Self::Changed => "changed",
            Self::Ping => "ping",
            Self::Error => "error",
            Self::Ready => "ready",
            Self::NoSub => "nosub",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse discriminator decoded from every inbound frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameHeader {
    /// Message kind (`msg` on the wire). Missing kinds decode as
    /// [`FrameKind::Other`].
    #[serde(rename = "msg", default)]
    pub kind: FrameKind,

    /// Correlation ID echoed from the request. `None` for unsolicited frames.
    #[serde(default)]
    pub id: Option<String>,

    /// Collection name on stream events. `None` for everything else.
    #[serde(default)]
    pub collection: Option<String>,
}

impl FrameHeader {
    /// True if this frame is a stream event on `collection`.
    pub fn is_change_on(&self, collection: &str) -> bool {
        self.kind == FrameKind::Changed && self.collection.as_deref() == Some(collection)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn header(text: &str) -> FrameHeader {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn decodes_known_kinds() {
        assert_eq!(header(r#"{"msg":"connected","session":"x"}"#).kind, FrameKind::HandshakeAck);
        assert_eq!(header(r#"{"msg":"result","id":"abc"}"#).kind, FrameKind::Result);
        assert_eq!(header(r#"{"msg":"ping"}"#).kind, FrameKind::Ping);
        assert_eq!(header(r#"{"msg":"nosub","id":"a"}"#).kind, FrameKind::NoSub);
        assert_eq!(header(r#"{"msg":"ready","subs":["a"]}"#).kind, FrameKind::Ready);
    }

    #[test]
    fn unknown_and_missing_kinds_are_other() {
        assert_eq!(header(r#"{"msg":"added","id":"x"}"#).kind, FrameKind::Other);
        assert_eq!(header(r#"{"server_id":"0"}"#).kind, FrameKind::Other);
    }

    #[test]
    fn change_on_collection() {
        let h = header(r#"{"msg":"changed","collection":"stream-room-messages","fields":{}}"#);
        assert!(h.is_change_on("stream-room-messages"));
        assert!(!h.is_change_on("stream-notify-user"));
        assert_eq!(h.id, None);
    }
}
