//! Terminal rendering for chatterm
//!
//! Turns a routed message into one deterministic, columned, ANSI-colored
//! line (plus indented continuation lines for multi-line content):
//!
//! ```text
//!   3:04PM  ▌ general ▌              Mary AS           hello @bob
//!   time    room (highlight palette) sender (text)     content
//! ```
//!
//! Rendering is pure. Colors depend only on the record and the
//! [`RenderStyle`]; the only ambient input is the local time zone, and only
//! when the style does not pin an offset.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod layout;
pub mod markup;
pub mod palette;
pub mod style;

use chatterm_core::RenderRecord;
use crossterm::style::Color;

pub use error::StyleError;
pub use palette::{DEFAULT_PALETTE, Palette, parse_color};
pub use style::RenderStyle;

use crate::{
    layout::{format_time, pad_left, pad_right, shorten_sender, truncate, visible_width},
    style::{bg, fg, paint_fg, reset},
};

/// Space between columns.
const GAP: &str = "  ";

/// Render `record` as terminal text. Never fails; missing fields render as
/// blank columns.
pub fn render(record: &RenderRecord, style: &RenderStyle) -> String {
    let time = pad_left(&format_time(record.sent, style.utc_offset), style.time_width);
    let room = room_cell(&record.room_name, style);
    let sender = sender_cell(&record.sender_name, style);

    let prefix = format!("{time}{GAP}{room}{GAP}{sender}{GAP}");
    let indent = visible_width(&prefix);
    format!("{prefix}{}", markup::highlight(&record.content, style, indent))
}

fn room_cell(room_name: &str, style: &RenderStyle) -> String {
    let width = style.room_width + 2;
    if room_name.is_empty() {
        return " ".repeat(width);
    }
    let color = style.highlight_palette.color_for(room_name);
    let shown = truncate(room_name, style.room_width);
    let cell = format!("{}{} {shown} {}", bg(color), fg(Color::Black), reset());
    pad_right(&cell, width)
}

fn sender_cell(sender_name: &str, style: &RenderStyle) -> String {
    let color = style.text_palette.color_for(sender_name);
    let shown = truncate(&shorten_sender(sender_name), style.sender_width);
    pad_right(&paint_fg(&shown, color), style.sender_width)
}
