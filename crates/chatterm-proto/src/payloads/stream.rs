//! Subscription and live message payloads.

use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{MY_MESSAGES, STREAM_ROOM_MESSAGES};

/// Subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscribe {
    /// Correlation ID, echoed in `ready`/`nosub`.
    pub id: String,
    /// Collection name.
    pub name: String,
    /// Subscription target and the "include history" flag.
    pub params: (String, bool),
}

impl Subscribe {
    /// Subscribe to new messages in every room the user belongs to.
    pub fn room_messages(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: STREAM_ROOM_MESSAGES.to_owned(),
            params: (MY_MESSAGES.to_owned(), false),
        }
    }
}

/// Subscription acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ready {
    /// IDs of the subscriptions now live.
    #[serde(default)]
    pub subs: Vec<String>,
}

/// Subscription refusal or termination.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoSub {
    /// Subscription ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Reason, absent on a clean unsubscribe.
    #[serde(default)]
    pub error: Option<super::ErrorPayload>,
}

/// Stream event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Changed {
    /// Event body. The collection name is read from the frame header.
    #[serde(default)]
    pub fields: ChangedFields,
}

/// Body of a stream event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangedFields {
    /// Subscription target the event was published on.
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    /// Message batch.
    #[serde(default)]
    pub args: Vec<MessageRecord>,
}

/// Message as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message ID.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Owning room ID.
    #[serde(rename = "rid", default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// Text content.
    #[serde(rename = "msg", default)]
    pub text: String,
    /// Sent time.
    #[serde(rename = "ts", default)]
    pub sent: Timestamp,
    /// Last update time. Absent on messages that were never touched.
    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    /// Sender.
    #[serde(rename = "u", default)]
    pub user: UserRecord,
}

impl MessageRecord {
    /// Milliseconds between the sent and last-update timestamps.
    ///
    /// Zero when the message carries no update timestamp.
    pub fn edit_delay_millis(&self) -> i64 {
        self.updated.map_or(0, |u| u.millis.saturating_sub(self.sent.millis))
    }
}

/// Message sender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl UserRecord {
    /// Display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.username } else { &self.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_delay() {
        let mut m = MessageRecord { sent: Timestamp::from_millis(1_000), ..Default::default() };
        assert_eq!(m.edit_delay_millis(), 0);
        m.updated = Some(Timestamp::from_millis(1_401));
        assert_eq!(m.edit_delay_millis(), 401);
    }

    #[test]
    fn display_name_falls_back() {
        let u = UserRecord { username: "alice".into(), ..Default::default() };
        assert_eq!(u.display_name(), "alice");
    }
}
