//! Room catalog.
//!
//! The catalog starts from the bulk room list fetched after login and is
//! always allowed to be incomplete: rooms created or joined later are fetched
//! one at a time through a [`RoomSource`] the first time a message references
//! them. Rooms are never removed within a session.
//!
//! Each room's display name is resolved once, when it enters the catalog:
//!
//! 1. topic
//! 2. friendly name (`fname`), then plain `name`
//! 3. synthesized from the member list: a single member verbatim, several
//!    members as comma-joined initials (`john.doe`, `mary-ann.smith` becomes
//!    `JD, MAS`)
//! 4. the room ID, when nothing else is available

use std::{
    collections::{HashMap, hash_map::Entry},
    future::Future,
};

use chatterm_proto::payloads::{MessageRecord, RoomRecord};
use tracing::{debug, warn};

use crate::error::CatalogError;

/// Fetches single rooms from the backend on demand.
pub trait RoomSource: Send + Sync {
    /// Fetch the room with ID `room_id`.
    ///
    /// Returns `Ok(None)` when the backend has no such room.
    fn fetch_room(
        &self,
        room_id: &str,
    ) -> impl Future<Output = Result<Option<RoomRecord>, CatalogError>> + Send;
}

/// A room known to this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: String,
    name: String,
    read_only: bool,
    members: Vec<String>,
    messages: Vec<MessageRecord>,
}

impl Room {
    /// Build a room from its wire record, resolving its display name.
    pub fn from_record(record: RoomRecord) -> Self {
        let name = display_name(&record);
        Self {
            id: record.id,
            name,
            read_only: record.read_only,
            members: record.usernames,
            messages: Vec::new(),
        }
    }

    /// Room ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolved display name. Never empty for a room with a non-empty ID.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages appended during this session.
    pub fn messages(&self) -> &[MessageRecord] {
        &self.messages
    }
}

/// Known rooms, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    rooms: HashMap<String, Room>,
}

impl RoomCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known set with `records`.
    pub fn bulk_load(&mut self, records: Vec<RoomRecord>) {
        self.rooms = records
            .into_iter()
            .map(Room::from_record)
            .map(|room| (room.id.clone(), room))
            .collect();
        debug!(rooms = self.rooms.len(), "room catalog loaded");
    }

    /// Local lookup. Never touches the network.
    pub fn resolve(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Fetch a single room from `source` and add it to the catalog.
    ///
    /// The room is stored under `room_id` even if the source answers with a
    /// different ID. Re-fetching a known room keeps its appended messages.
    ///
    /// # Errors
    ///
    /// - `CatalogError::RoomNotFound` if the source has no such room
    /// - `CatalogError::Source` if the source itself failed
    pub async fn lazy_fetch<S: RoomSource>(
        &mut self,
        source: &S,
        room_id: &str,
    ) -> Result<&Room, CatalogError> {
        let mut record = source
            .fetch_room(room_id)
            .await?
            .ok_or_else(|| CatalogError::RoomNotFound { room_id: room_id.to_owned() })?;

        if record.id != room_id {
            warn!(room_id, returned = %record.id, "room source answered with another id");
            record.id = room_id.to_owned();
        }

        let mut room = Room::from_record(record);
        debug!(
            room_id,
            name = %room.name,
            read_only = room.read_only,
            members = room.members.len(),
            "room fetched"
        );

        let room = match self.rooms.entry(room_id.to_owned()) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                room.messages = std::mem::take(&mut existing.messages);
                *existing = room;
                existing
            },
            Entry::Vacant(entry) => entry.insert(room),
        };
        Ok(room)
    }

    /// Append `message` to the room `room_id`. Returns false if the room is
    /// unknown.
    pub fn append_message(&mut self, room_id: &str, message: MessageRecord) -> bool {
        match self.rooms.get_mut(room_id) {
            Some(room) => {
                room.messages.push(message);
                true
            },
            None => false,
        }
    }

    /// Number of known rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True if no rooms are known.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Resolve the display name of a room record.
pub fn display_name(record: &RoomRecord) -> String {
    let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

    non_empty(&record.topic)
        .or_else(|| non_empty(&record.fname))
        .or_else(|| non_empty(&record.name))
        .unwrap_or_else(|| match record.usernames.as_slice() {
            [] => record.id.clone(),
            [single] => single.clone(),
            members => members.iter().map(String::as_str).map(initials).collect::<Vec<_>>().join(", "),
        })
}

/// Upper-cased first letter of each alphanumeric token of `member`.
pub fn initials(member: &str) -> String {
    member
        .split(|c: char| !c.is_alphanumeric())
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn record(id: &str) -> RoomRecord {
        RoomRecord { id: id.into(), ..Default::default() }
    }

    struct CountingSource {
        calls: AtomicUsize,
        room: Option<RoomRecord>,
    }

    impl RoomSource for CountingSource {
        async fn fetch_room(&self, _room_id: &str) -> Result<Option<RoomRecord>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.room.clone())
        }
    }

    #[test]
    fn name_priority() {
        let mut r = RoomRecord {
            id: "r1".into(),
            name: Some("general".into()),
            fname: Some("General".into()),
            topic: Some("Release planning".into()),
            usernames: vec!["alice".into(), "bob".into()],
            ..Default::default()
        };
        assert_eq!(display_name(&r), "Release planning");
        r.topic = Some(String::new());
        assert_eq!(display_name(&r), "General");
        r.fname = None;
        assert_eq!(display_name(&r), "general");
        r.name = None;
        assert_eq!(display_name(&r), "A, B");
        r.usernames.clear();
        assert_eq!(display_name(&r), "r1");
    }

    #[test]
    fn initials_split_on_punctuation() {
        assert_eq!(initials("john.doe"), "JD");
        assert_eq!(initials("mary-ann.smith"), "MAS");
        assert_eq!(initials("..x__y"), "XY");
    }

    #[test]
    fn bulk_load_replaces() {
        let mut catalog = RoomCatalog::new();
        catalog.bulk_load(vec![record("a"), record("b")]);
        catalog.bulk_load(vec![record("c")]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.resolve("a").is_none());
        assert_eq!(catalog.resolve("c").unwrap().name(), "c");
    }

    #[tokio::test]
    async fn lazy_fetch_adds_room_once() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            room: Some(RoomRecord { fname: Some("Ops".into()), ..record("r7") }),
        };
        let mut catalog = RoomCatalog::new();

        let fetched = catalog.lazy_fetch(&source, "r7").await.unwrap().clone();
        assert_eq!(fetched.name(), "Ops");
        assert_eq!(catalog.resolve(fetched.id()), Some(&fetched));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn lazy_fetch_missing_room() {
        let source = CountingSource { calls: AtomicUsize::new(0), room: None };
        let mut catalog = RoomCatalog::new();
        let err = catalog.lazy_fetch(&source, "nope").await.unwrap_err();
        assert_eq!(err, CatalogError::RoomNotFound { room_id: "nope".into() });
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn lazy_fetch_keys_by_requested_id() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            room: Some(RoomRecord { fname: Some("Ops".into()), ..record("a") }),
        };
        let mut catalog = RoomCatalog::new();
        catalog.bulk_load(vec![record("a")]);
        assert!(catalog.append_message("a", MessageRecord::default()));

        let fetched = catalog.lazy_fetch(&source, "x").await.unwrap();
        assert_eq!(fetched.id(), "x");
        assert_eq!(fetched.name(), "Ops");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve("a").unwrap().messages().len(), 1);
        assert!(catalog.resolve("x").is_some());
    }

    #[tokio::test]
    async fn refetch_keeps_messages() {
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            room: Some(RoomRecord { topic: Some("Renamed".into()), ..record("a") }),
        };
        let mut catalog = RoomCatalog::new();
        catalog.bulk_load(vec![record("a")]);
        catalog.append_message("a", MessageRecord::default());

        let room = catalog.lazy_fetch(&source, "a").await.unwrap();
        assert_eq!(room.name(), "Renamed");
        assert_eq!(room.messages().len(), 1);
    }

    #[test]
    fn append_to_unknown_room() {
        let mut catalog = RoomCatalog::new();
        catalog.bulk_load(vec![record("a")]);
        assert!(catalog.append_message("a", MessageRecord::default()));
        assert!(!catalog.append_message("z", MessageRecord::default()));
        assert_eq!(catalog.resolve("a").unwrap().messages().len(), 1);
    }
}
