//! Message router.
//!
//! Turns a batch of raw stream messages into render records. Per message, in
//! order:
//!
//! 1. drop post-hoc edits (update more than [`EDIT_THRESHOLD_MS`] after send)
//! 2. resolve the room, fetching it lazily on a catalog miss
//! 3. append the message to its room
//! 4. drop messages with no text
//!
//! Room lookups never fail the batch: an unresolvable room renders with an
//! empty room name.

use chatterm_proto::payloads::{MessageRecord, Timestamp};
use tracing::{debug, warn};

use crate::catalog::{RoomCatalog, RoomSource};

/// Largest gap between send and last update that still counts as a new
/// message. Anything later is an edit and is never displayed.
pub const EDIT_THRESHOLD_MS: i64 = 400;

/// A message ready for the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    /// Resolved room display name; empty if the room could not be resolved.
    pub room_name: String,
    /// Sender display name.
    pub sender_name: String,
    /// Raw message text.
    pub content: String,
    /// Sent time.
    pub sent: Timestamp,
}

/// True if `message` is an edit of an earlier message.
pub fn is_edit(message: &MessageRecord) -> bool {
    message.edit_delay_millis() > EDIT_THRESHOLD_MS
}

/// Route a message batch into render records, in batch order.
pub async fn route<S: RoomSource>(
    batch: Vec<MessageRecord>,
    catalog: &mut RoomCatalog,
    source: &S,
) -> Vec<RenderRecord> {
    let mut records = Vec::with_capacity(batch.len());

    for message in batch {
        if is_edit(&message) {
            debug!(id = %message.id, delay = message.edit_delay_millis(), "edit suppressed");
            continue;
        }

        let room_name = match message.room_id.as_deref() {
            Some(room_id) => {
                let name = room_name(catalog, source, room_id).await;
                catalog.append_message(room_id, message.clone());
                name
            },
            None => {
                warn!(id = %message.id, "message has no room id");
                String::new()
            },
        };

        if message.text.is_empty() {
            continue;
        }

        records.push(RenderRecord {
            room_name,
            sender_name: message.user.display_name().to_owned(),
            content: message.text,
            sent: message.sent,
        });
    }

    records
}

async fn room_name<S: RoomSource>(catalog: &mut RoomCatalog, source: &S, room_id: &str) -> String {
    if let Some(room) = catalog.resolve(room_id) {
        return room.name().to_owned();
    }
    match catalog.lazy_fetch(source, room_id).await {
        Ok(room) => room.name().to_owned(),
        Err(e) => {
            warn!(room_id, error = %e, "room lookup failed");
            String::new()
        },
    }
}
