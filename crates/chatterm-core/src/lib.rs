//! Core session logic for chatterm
//!
//! Everything between the wire codec and the display that does not touch I/O:
//!
//! - [`session`]: the connect, login, catalog-sync, subscribe state machine
//! - [`catalog`]: known rooms, lazy single-room fetch, display-name resolution
//! - [`router`]: edit suppression and room lookup for incoming messages
//! - [`env`] / [`ident`]: randomness and correlation IDs
//!
//! The runtime feeds [`session::SessionEvent`]s in and executes the returned
//! [`session::SessionAction`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod catalog;
pub mod env;
pub mod error;
pub mod ident;
pub mod router;
pub mod session;

pub use catalog::{Room, RoomCatalog, RoomSource};
pub use env::{Environment, SeededEnv, SystemEnv};
pub use error::{CatalogError, SessionError};
pub use router::{EDIT_THRESHOLD_MS, RenderRecord, route};
pub use session::{
    CachedToken, Identity, PendingRequest, Session, SessionAction, SessionConfig, SessionEvent,
    SessionPhase,
};
