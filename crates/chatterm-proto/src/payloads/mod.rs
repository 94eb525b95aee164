//! Typed frame payloads.
//!
//! Split by protocol concern:
//!
//! - [`session`]: handshake, keep-alive, protocol errors
//! - [`method`]: remote method calls and their results (login, room catalog)
//! - [`stream`]: subscriptions and live message events

pub mod method;
pub mod session;
pub mod stream;

use serde::{Deserialize, Serialize};

pub use method::{
    ErrorPayload, LdapLogin, LoginRequest, LoginResult, METHOD_LOGIN, METHOD_ROOMS_GET, MethodCall,
    MethodParam, MethodResult, ResumeLogin, RoomInfo, RoomRecord, RoomsResult,
};
pub use session::{Connect, Connected, Ping, Pong, ServerError};
pub use stream::{Changed, ChangedFields, MessageRecord, NoSub, Ready, Subscribe, UserRecord};

/// Wire timestamp: Unix milliseconds wrapped as `{"$date": ms}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "$date")]
    pub millis: i64,
}

impl Timestamp {
    /// Timestamp at `millis` since the epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }
}
