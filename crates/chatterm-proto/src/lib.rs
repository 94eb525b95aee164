//! Wire protocol for chatterm
//!
//! JSON text frames exchanged with the chat backend over a single duplex
//! connection. Inbound frames are decoded in two steps: first into a minimal
//! [`FrameHeader`] discriminator (kind, request ID, collection), then into the
//! specific payload type once the caller knows which branch it is on. Outbound
//! frames are modelled by the closed [`Request`] enum.
//!
//! # Components
//!
//! - [`FrameHeader`] / [`FrameKind`]: coarse discriminator for inbound frames
//! - [`InboundFrame`]: decoded header plus the raw text for the second decode
//! - [`Request`]: every frame the client ever sends
//! - [`payloads`]: typed request and reply bodies

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod header;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::{InboundFrame, Request};
pub use header::{FrameHeader, FrameKind};

/// Protocol version offered in the handshake.
pub const PROTOCOL_VERSION: &str = "1";

/// Collection carrying live room messages.
pub const STREAM_ROOM_MESSAGES: &str = "stream-room-messages";

/// Subscription target for every room the user belongs to.
pub const MY_MESSAGES: &str = "__my_messages__";
