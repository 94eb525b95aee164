//! Error types for the chatterm core.
//!
//! Two layers: catalog errors (single-room lookups against the backend) and
//! session errors (handshake, authentication, catalog sync, subscription,
//! transport). Catalog errors are recoverable; most session errors end the
//! session.

use thiserror::Error;

use crate::session::SessionPhase;

/// Errors raised by the room catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The backend has no room with this ID
    #[error("room not found: {room_id}")]
    RoomNotFound {
        /// Room that was requested
        room_id: String,
    },

    /// The room source failed (network, HTTP status, malformed body)
    #[error("room source failed: {0}")]
    Source(String),
}

/// Errors raised by the session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Login was rejected or its reply was unusable
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Backend-supplied or local reason
        reason: String,
    },

    /// Bulk room catalog request failed
    #[error("room catalog sync failed: {reason}")]
    CatalogSync {
        /// Backend-supplied or local reason
        reason: String,
    },

    /// Message stream subscription was refused or dropped
    #[error("subscription failed: {reason}")]
    Subscription {
        /// Backend-supplied or local reason
        reason: String,
    },

    /// Underlying transport failed or was closed by the peer
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {phase:?}")]
    InvalidState {
        /// Phase when the error occurred
        phase: SessionPhase,
        /// Operation that was attempted
        operation: &'static str,
    },
}

impl SessionError {
    /// Returns true if this error ends the session.
    ///
    /// State misuse is a caller bug and does not terminate a live
    /// connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::CatalogSync { .. }
                | Self::Subscription { .. }
                | Self::Transport(_)
        )
    }
}
