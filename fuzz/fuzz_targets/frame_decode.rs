//! Fuzz target for InboundFrame::decode
//!
//! Arbitrary text must decode or fail with a structured error. A decoded
//! frame's payload accessors must also never panic.

#![no_main]

use chatterm_proto::{
    InboundFrame,
    payloads::{Changed, MethodResult, NoSub, Ping, Ready, RoomsResult},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(frame) = InboundFrame::decode(data) else {
        return;
    };
    let _ = frame.header.kind.as_str();
    let _ = frame.payload::<Ping>();
    let _ = frame.payload::<Ready>();
    let _ = frame.payload::<NoSub>();
    let _ = frame.payload::<Changed>();
    let _ = frame.payload::<MethodResult<RoomsResult>>();
});
