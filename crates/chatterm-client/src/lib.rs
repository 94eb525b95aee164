//! Terminal chat client
//!
//! Wires the Sans-IO [`chatterm_core::Session`] to a real websocket, a REST
//! room source, a token store and a line display:
//!
//! ```text
//!  websocket ──► read task ──► Session ──► actions ──┬─► write task ──► websocket
//!                                                   ├─► token store
//!                                                   └─► route ──► render ──► display
//! ```
//!
//! The binary (`chatterm`) parses arguments, builds a [`ClientConfig`] and
//! calls [`runtime::run`] with ctrl-c as the interrupt.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod display;
pub mod rest;
pub mod runtime;
pub mod store;
pub mod transport;

pub use config::{ClientConfig, Security, StyleOptions, login_request};
pub use display::{ChannelSink, LineSink, WriterSink};
pub use rest::{Authorize, RestRoomSource};
pub use runtime::{RuntimeError, run};
pub use store::{MemoryTokenStore, TokenStore};
pub use transport::TransportError;
