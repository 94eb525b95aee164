//! Fuzz target for line rendering
//!
//! Arbitrary content, names and timestamps must render without panicking,
//! and the content column must not move.

#![no_main]

use arbitrary::Arbitrary;
use chatterm_core::RenderRecord;
use chatterm_proto::payloads::Timestamp;
use chatterm_render::{RenderStyle, layout::visible_width, render};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    room: String,
    sender: String,
    content: String,
    sent: i64,
}

fuzz_target!(|input: Input| {
    let style = RenderStyle::default();
    let record = RenderRecord {
        room_name: input.room,
        sender_name: input.sender,
        content: input.content,
        sent: Timestamp::from_millis(input.sent),
    };
    let line = render(&record, &style);
    assert!(visible_width(&line) >= style.time_width);
});
