//! Session protocol state machine.
//!
//! Sequences handshake, login, room catalog sync and subscription over a
//! single duplex connection, and correlates reply frames with the requests
//! that caused them. Uses the action pattern: [`Session::handle`] consumes a
//! [`SessionEvent`] and returns the [`SessionAction`]s for the runtime to
//! execute. The session itself performs no I/O.
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐ start ┌──────────────────────┐ connected ┌────────────────┐
//! │ Connecting │──────>│ AwaitingHandshakeAck │──────────>│ Authenticating │
//! └────────────┘       └──────────────────────┘           └────────────────┘
//!                                                                 │ login ok
//!                                                                 ↓
//! ┌──────┐   ready/changed    ┌─────────────┐   rooms ok    ┌─────────────┐
//! │ Live │<───────────────────│ Subscribing │<──────────────│ CatalogSync │
//! └──────┘                    └─────────────┘               └─────────────┘
//!    │ interrupt
//!    ↓
//! ┌─────────┐  peer closed / grace elapsed  ┌────────────┐
//! │ Closing │──────────────────────────────>│ Terminated │
//! └─────────┘                               └────────────┘
//! ```
//!
//! Any phase moves to `Terminated` on a fatal error (login rejected, catalog
//! failure, subscription refused, transport failure). Pings are answered in
//! every phase but `Terminated` and never change the phase.

use std::collections::HashMap;

use chatterm_proto::{
    FrameKind, InboundFrame, Request, STREAM_ROOM_MESSAGES,
    payloads::{
        Changed, Connect, LoginRequest, LoginResult, MessageRecord, MethodCall, MethodResult,
        NoSub, Ping, Pong, Ready, RoomsResult, ServerError, Subscribe,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{catalog::RoomCatalog, env::Environment, error::SessionError, ident::correlation_id};

/// Protocol phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Transport dialled, nothing sent yet
    Connecting,
    /// Handshake sent, waiting for `connected`
    AwaitingHandshakeAck,
    /// Login sent, waiting for its result
    Authenticating,
    /// Room catalog requested
    CatalogSync,
    /// Subscription requested
    Subscribing,
    /// Receiving live messages
    Live,
    /// Close requested, waiting for the read side to finish
    Closing,
    /// Session over (clean shutdown or fatal error)
    Terminated,
}

/// What a pending reply will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    /// Login result
    Auth,
    /// Bulk room catalog result
    Catalog,
    /// Subscription acknowledgment
    Subscribe,
}

/// Token material the external token store persists after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    /// Backend host the token was issued by
    pub host: String,
    /// Authenticated user ID
    pub user_id: String,
    /// Resume token
    pub token: String,
    /// Token expiry in Unix milliseconds, if the backend reported one
    pub expires_at: Option<i64>,
}

/// Identity of the authenticated user.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// User ID
    pub user_id: String,
    /// Session token
    pub token: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity").field("user_id", &self.user_id).finish_non_exhaustive()
    }
}

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Transport is open; begin the handshake
    Start,
    /// A text frame arrived
    FrameReceived(String),
    /// The peer closed the transport
    TransportClosed,
    /// Reading from the transport failed
    TransportError(String),
    /// The user asked to quit
    Interrupt,
    /// The shutdown grace period ran out
    GraceElapsed,
}

/// Outputs of the session, executed by the runtime in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Send this request to the backend
    Send(Request),
    /// Send a transport close frame
    Close,
    /// Persist the token for later resume logins
    PersistToken(CachedToken),
    /// Discard any cached token
    ClearToken,
    /// Route this message batch to the display
    Route(Vec<MessageRecord>),
    /// Session is over. `None` is a clean shutdown.
    Terminate {
        /// Fatal error that ended the session
        error: Option<SessionError>,
    },
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend host, recorded in the cached token
    pub host: String,
    /// Ready-made login payload
    pub login: LoginRequest,
}

/// Session state machine.
///
/// Owns the pending request table, the authenticated identity and the room
/// catalog. Exactly one mutator (the runtime's read task) drives it.
#[derive(Debug)]
pub struct Session<E: Environment> {
    env: E,
    config: SessionConfig,
    phase: SessionPhase,
    pending: HashMap<String, PendingRequest>,
    subscription: Option<String>,
    identity: Option<Identity>,
    catalog: RoomCatalog,
}

impl<E: Environment> Session<E> {
    /// Create a new session in [`SessionPhase::Connecting`].
    pub fn new(env: E, config: SessionConfig) -> Self {
        Self {
            env,
            config,
            phase: SessionPhase::Connecting,
            pending: HashMap::new(),
            subscription: None,
            identity: None,
            catalog: RoomCatalog::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Authenticated identity. `None` before login succeeds.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Room catalog.
    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    /// Room catalog, for the message router.
    pub fn catalog_mut(&mut self) -> &mut RoomCatalog {
        &mut self.catalog
    }

    /// Number of requests still awaiting a reply.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Process one event.
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidState` if `Start` arrives outside `Connecting`
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::Start => self.start(),
            SessionEvent::FrameReceived(text) => Ok(self.handle_frame(text)),
            SessionEvent::TransportClosed => Ok(self.transport_closed()),
            SessionEvent::TransportError(reason) => Ok(self.transport_error(reason)),
            SessionEvent::Interrupt => Ok(self.interrupt()),
            SessionEvent::GraceElapsed => Ok(self.grace_elapsed()),
        }
    }

    fn start(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if self.phase != SessionPhase::Connecting {
            return Err(SessionError::InvalidState { phase: self.phase, operation: "start" });
        }
        self.transition(SessionPhase::AwaitingHandshakeAck);
        Ok(vec![SessionAction::Send(Request::Connect(Connect::default()))])
    }

    fn handle_frame(&mut self, text: String) -> Vec<SessionAction> {
        if self.phase == SessionPhase::Terminated {
            return Vec::new();
        }

        let frame = match InboundFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "skipping undecodable frame");
                return Vec::new();
            },
        };
        debug!(kind = %frame.header.kind, id = ?frame.header.id, "frame received");

        let result = match frame.header.kind {
            FrameKind::HandshakeAck => Ok(self.handle_handshake_ack()),
            FrameKind::Ping => frame.payload::<Ping>().map(|ping| {
                vec![SessionAction::Send(Request::Pong(Pong::reply_to(&ping)))]
            }),
            FrameKind::Result => Ok(self.handle_result(&frame)),
            FrameKind::Ready => frame.payload::<Ready>().map(|ready| self.handle_ready(&ready)),
            FrameKind::NoSub => frame.payload::<NoSub>().map(|nosub| self.handle_nosub(nosub)),
            FrameKind::Changed => self.handle_changed(&frame),
            FrameKind::Error => frame.payload::<ServerError>().map(|err| {
                warn!(reason = err.reason.as_deref().unwrap_or(""), "backend reported error");
                Vec::new()
            }),
            FrameKind::Other => Ok(Vec::new()),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "skipping malformed frame");
            Vec::new()
        })
    }

    fn handle_handshake_ack(&mut self) -> Vec<SessionAction> {
        if self.phase != SessionPhase::AwaitingHandshakeAck {
            debug!(phase = ?self.phase, "ignoring handshake ack");
            return Vec::new();
        }
        self.transition(SessionPhase::Authenticating);
        let id = self.track(PendingRequest::Auth);
        vec![SessionAction::Send(Request::Method(MethodCall::login(id, self.config.login.clone())))]
    }

    fn handle_result(&mut self, frame: &InboundFrame) -> Vec<SessionAction> {
        let Some(kind) = self.take_pending(frame.header.id.as_deref()) else {
            return Vec::new();
        };

        match (kind, self.phase) {
            (PendingRequest::Auth, SessionPhase::Authenticating) => {
                self.handle_login(frame.payload())
            },
            (PendingRequest::Catalog, SessionPhase::CatalogSync) => {
                self.handle_catalog(frame.payload())
            },
            (kind, phase) => {
                debug!(?kind, ?phase, "ignoring out-of-phase result");
                Vec::new()
            },
        }
    }

    fn handle_login(
        &mut self,
        reply: Result<MethodResult<LoginResult>, chatterm_proto::ProtocolError>,
    ) -> Vec<SessionAction> {
        let login = match reply {
            Ok(MethodResult { result: Some(login), error: None, .. }) => login,
            Ok(MethodResult { error: Some(err), .. }) => {
                return self.fail(
                    SessionError::Authentication { reason: err.describe() },
                    vec![SessionAction::ClearToken],
                );
            },
            Ok(MethodResult { result: None, .. }) => {
                return self.fail(
                    SessionError::Authentication { reason: "empty login result".into() },
                    vec![SessionAction::ClearToken],
                );
            },
            Err(e) => {
                return self.fail(
                    SessionError::Authentication { reason: e.to_string() },
                    vec![SessionAction::ClearToken],
                );
            },
        };

        info!(user_id = %login.id, "authenticated");
        let cached = CachedToken {
            host: self.config.host.clone(),
            user_id: login.id.clone(),
            token: login.token.clone(),
            expires_at: login.token_expires.map(|t| t.millis),
        };
        self.identity = Some(Identity { user_id: login.id, token: login.token });

        self.transition(SessionPhase::CatalogSync);
        let id = self.track(PendingRequest::Catalog);
        vec![
            SessionAction::PersistToken(cached),
            SessionAction::Send(Request::Method(MethodCall::rooms(id))),
        ]
    }

    fn handle_catalog(
        &mut self,
        reply: Result<MethodResult<RoomsResult>, chatterm_proto::ProtocolError>,
    ) -> Vec<SessionAction> {
        let rooms = match reply {
            Ok(MethodResult { result: Some(rooms), error: None, .. }) => rooms,
            Ok(MethodResult { error: Some(err), .. }) => {
                return self.fail(SessionError::CatalogSync { reason: err.describe() }, Vec::new());
            },
            Ok(MethodResult { result: None, .. }) => {
                return self.fail(
                    SessionError::CatalogSync { reason: "empty room catalog result".into() },
                    Vec::new(),
                );
            },
            Err(e) => {
                return self.fail(SessionError::CatalogSync { reason: e.to_string() }, Vec::new());
            },
        };

        self.catalog.bulk_load(rooms.update);
        self.transition(SessionPhase::Subscribing);
        let id = self.track(PendingRequest::Subscribe);
        self.subscription = Some(id.clone());
        vec![SessionAction::Send(Request::Sub(Subscribe::room_messages(id)))]
    }

    fn handle_ready(&mut self, ready: &Ready) -> Vec<SessionAction> {
        for sub in &ready.subs {
            if self.take_pending(Some(sub.as_str())) == Some(PendingRequest::Subscribe)
                && self.phase == SessionPhase::Subscribing
            {
                self.transition(SessionPhase::Live);
            }
        }
        Vec::new()
    }

    fn handle_nosub(&mut self, nosub: NoSub) -> Vec<SessionAction> {
        let id = nosub.id.as_deref();
        let pending = self.take_pending(id);
        let ours = id.is_some() && id == self.subscription.as_deref();
        if pending != Some(PendingRequest::Subscribe) && !ours {
            return Vec::new();
        }
        if matches!(self.phase, SessionPhase::Closing | SessionPhase::Terminated) {
            return Vec::new();
        }

        let reason = nosub
            .error
            .map_or_else(|| "subscription closed by server".to_owned(), |e| e.describe());
        self.fail(SessionError::Subscription { reason }, Vec::new())
    }

    fn handle_changed(
        &mut self,
        frame: &InboundFrame,
    ) -> Result<Vec<SessionAction>, chatterm_proto::ProtocolError> {
        if !frame.header.is_change_on(STREAM_ROOM_MESSAGES) {
            return Ok(Vec::new());
        }
        if !matches!(self.phase, SessionPhase::Subscribing | SessionPhase::Live) {
            debug!(phase = ?self.phase, "ignoring stream event");
            return Ok(Vec::new());
        }

        let changed: Changed = frame.payload()?;
        if self.phase == SessionPhase::Subscribing {
            self.transition(SessionPhase::Live);
        }
        debug!(
            event = changed.fields.event_name.as_deref().unwrap_or(""),
            messages = changed.fields.args.len(),
            "stream event"
        );
        if changed.fields.args.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![SessionAction::Route(changed.fields.args)])
    }

    fn interrupt(&mut self) -> Vec<SessionAction> {
        if matches!(self.phase, SessionPhase::Closing | SessionPhase::Terminated) {
            return Vec::new();
        }
        self.transition(SessionPhase::Closing);
        vec![SessionAction::Close]
    }

    fn transport_closed(&mut self) -> Vec<SessionAction> {
        match self.phase {
            SessionPhase::Terminated => Vec::new(),
            SessionPhase::Closing => self.finish(),
            _ => self.fail(SessionError::Transport("connection closed by peer".into()), Vec::new()),
        }
    }

    fn transport_error(&mut self, reason: String) -> Vec<SessionAction> {
        if self.phase == SessionPhase::Closing {
            debug!(reason, "transport error while closing");
            return self.finish();
        }
        self.fail(SessionError::Transport(reason), Vec::new())
    }

    fn grace_elapsed(&mut self) -> Vec<SessionAction> {
        if self.phase == SessionPhase::Terminated {
            return Vec::new();
        }
        debug!(phase = ?self.phase, "grace period elapsed");
        self.finish()
    }

    fn finish(&mut self) -> Vec<SessionAction> {
        self.transition(SessionPhase::Terminated);
        self.pending.clear();
        vec![SessionAction::Terminate { error: None }]
    }

    fn fail(&mut self, err: SessionError, mut actions: Vec<SessionAction>) -> Vec<SessionAction> {
        if self.phase == SessionPhase::Terminated {
            return Vec::new();
        }
        error!(phase = ?self.phase, error = %err, "session failed");
        self.transition(SessionPhase::Terminated);
        self.pending.clear();
        actions.push(SessionAction::Terminate { error: Some(err) });
        actions
    }

    fn track(&mut self, kind: PendingRequest) -> String {
        let mut id = correlation_id(&self.env);
        while self.pending.contains_key(&id) {
            id = correlation_id(&self.env);
        }
        self.pending.insert(id.clone(), kind);
        id
    }

    fn take_pending(&mut self, id: Option<&str>) -> Option<PendingRequest> {
        let id = id?;
        let kind = self.pending.remove(id);
        if kind.is_none() {
            debug!(id, "reply with no pending request");
        }
        kind
    }

    fn transition(&mut self, next: SessionPhase) {
        info!(from = ?self.phase, to = ?next, "session phase");
        self.phase = next;
    }
}
