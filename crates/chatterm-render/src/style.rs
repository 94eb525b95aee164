//! Render style and escape sequences.

use chrono::FixedOffset;
use crossterm::style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::palette::Palette;

/// Default code span color.
pub const DEFAULT_CODE: u8 = 186;

/// Default mention highlight color.
pub const DEFAULT_NOTIFY: u8 = 160;

/// Default ticket reference color.
pub const DEFAULT_TICKET: u8 = 75;

/// Default visible width of the time column.
pub const DEFAULT_TIME_WIDTH: usize = 8;

/// Default maximum room name width, excluding its padding.
pub const DEFAULT_ROOM_WIDTH: usize = 20;

/// Default sender column width.
pub const DEFAULT_SENDER_WIDTH: usize = 16;

/// Colors and column widths for rendering.
///
/// Stateless: every color decision is recomputed from the record on each
/// render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    /// Sender foreground colors
    pub text_palette: Palette,
    /// Room name background colors
    pub highlight_palette: Palette,
    /// Code span foreground
    pub code: Color,
    /// Mention background
    pub notify: Color,
    /// Ticket reference foreground
    pub ticket: Color,
    /// Visible width of the time column
    pub time_width: usize,
    /// Maximum visible width of a room name
    pub room_width: usize,
    /// Visible width of the sender column
    pub sender_width: usize,
    /// Fixed offset for timestamps. `None` uses the local time zone.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            text_palette: Palette::default(),
            highlight_palette: Palette::default(),
            code: Color::AnsiValue(DEFAULT_CODE),
            notify: Color::AnsiValue(DEFAULT_NOTIFY),
            ticket: Color::AnsiValue(DEFAULT_TICKET),
            time_width: DEFAULT_TIME_WIDTH,
            room_width: DEFAULT_ROOM_WIDTH,
            sender_width: DEFAULT_SENDER_WIDTH,
            utc_offset: None,
        }
    }
}

/// Escape sequence selecting foreground `color`.
pub fn fg(color: Color) -> String {
    SetForegroundColor(color).to_string()
}

/// Escape sequence selecting background `color`.
pub fn bg(color: Color) -> String {
    SetBackgroundColor(color).to_string()
}

/// Escape sequence restoring default colors.
pub fn reset() -> String {
    ResetColor.to_string()
}

/// `text` in foreground `color`, followed by a reset.
pub fn paint_fg(text: &str, color: Color) -> String {
    format!("{}{text}{}", fg(color), reset())
}

/// `text` on background `color`, followed by a reset.
pub fn paint_bg(text: &str, color: Color) -> String {
    format!("{}{text}{}", bg(color), reset())
}
