//! Fuzz target for the session state machine
//!
//! Drives a session with an arbitrary event sequence built from plausible
//! frames plus raw text.
//!
//! # Invariants
//!
//! - `handle` only errors on a repeated `Start`
//! - at most one `Terminate` is ever emitted
//! - nothing is emitted once the session is terminated
//! - no requests are pending once the session is terminated

#![no_main]

use arbitrary::Arbitrary;
use chatterm_core::{
    SeededEnv, Session, SessionAction, SessionConfig, SessionEvent, SessionPhase,
};
use chatterm_proto::payloads::LoginRequest;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Start,
    Connected,
    Ping(Option<String>),
    Result { id: String, ok: bool },
    Ready(Vec<String>),
    NoSub(String),
    Changed { collection: bool, text: String },
    Raw(String),
    TransportClosed,
    TransportError,
    Interrupt,
    GraceElapsed,
}

impl Input {
    fn into_event(self) -> SessionEvent {
        let frame = |value: String| SessionEvent::FrameReceived(value);
        match self {
            Self::Start => SessionEvent::Start,
            Self::Connected => frame(r#"{"msg":"connected","session":"s"}"#.into()),
            Self::Ping(Some(id)) => frame(format!(r#"{{"msg":"ping","id":{id:?}}}"#)),
            Self::Ping(None) => frame(r#"{"msg":"ping"}"#.into()),
            Self::Result { id, ok: true } => frame(format!(
                r#"{{"msg":"result","id":{id:?},"result":{{"id":"u","token":"t","update":[]}}}}"#
            )),
            Self::Result { id, ok: false } => {
                frame(format!(r#"{{"msg":"result","id":{id:?},"error":{{"reason":"no"}}}}"#))
            },
            Self::Ready(subs) => frame(format!(r#"{{"msg":"ready","subs":{subs:?}}}"#)),
            Self::NoSub(id) => frame(format!(r#"{{"msg":"nosub","id":{id:?}}}"#)),
            Self::Changed { collection, text } => {
                let collection = if collection { "stream-room-messages" } else { "other" };
                frame(format!(
                    r#"{{"msg":"changed","collection":"{collection}","fields":{{"eventName":"e","args":[{{"_id":"m","rid":"r","msg":{text:?},"ts":{{"$date":0}},"u":{{"_id":"u","username":"a"}}}}]}}}}"#
                ))
            },
            Self::Raw(text) => frame(text),
            Self::TransportClosed => SessionEvent::TransportClosed,
            Self::TransportError => SessionEvent::TransportError("fuzz".into()),
            Self::Interrupt => SessionEvent::Interrupt,
            Self::GraceElapsed => SessionEvent::GraceElapsed,
        }
    }
}

fuzz_target!(|inputs: Vec<Input>| {
    let config = SessionConfig {
        host: "fuzz".into(),
        login: LoginRequest::Resume { token: "t".into() },
    };
    let mut session = Session::new(SeededEnv::with_seed(0), config);
    let mut terminations = 0;

    for input in inputs {
        let was_terminated = session.phase() == SessionPhase::Terminated;
        let is_start = matches!(input, Input::Start);

        match session.handle(input.into_event()) {
            Ok(actions) => {
                if was_terminated {
                    assert!(actions.is_empty(), "actions after termination");
                }
                terminations += actions
                    .iter()
                    .filter(|a| matches!(a, SessionAction::Terminate { .. }))
                    .count();
            },
            Err(_) => assert!(is_start, "only a repeated start may error"),
        }

        assert!(terminations <= 1, "terminated twice");
        if session.phase() == SessionPhase::Terminated {
            assert_eq!(session.pending_len(), 0, "pending requests after termination");
        }
    }
});
