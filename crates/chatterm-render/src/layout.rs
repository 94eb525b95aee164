//! Fixed-width columns.
//!
//! Widths are measured on what the terminal shows: escape sequences count as
//! zero columns and wide characters as two.

use std::sync::LazyLock;

use chatterm_proto::payloads::Timestamp;
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[allow(clippy::expect_used)]
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("invariant: escape pattern is valid")
});

/// Columns `s` occupies on screen.
pub fn visible_width(s: &str) -> usize {
    ANSI_ESCAPE.replace_all(s, "").width()
}

/// Pad `s` on the right with spaces to `width` visible columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_width(s));
    format!("{s}{}", " ".repeat(fill))
}

/// Pad `s` on the left with spaces to `width` visible columns.
pub fn pad_left(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(visible_width(s));
    format!("{}{s}", " ".repeat(fill))
}

/// Cut plain text `s` to at most `max` columns, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_owned();
    }
    let limit = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > limit {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

/// Shorten a display name to its first word plus the initials of the rest:
/// `"Mary Ann Smith"` becomes `"Mary AS"`.
pub fn shorten_sender(name: &str) -> String {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };
    let initials: String = words.filter_map(|w| w.chars().next()).collect();
    if initials.is_empty() { first.to_owned() } else { format!("{first} {initials}") }
}

/// Format a wire timestamp as a 12-hour clock (`3:04PM`).
///
/// `offset` pins the time zone; `None` uses the local one. Out-of-range
/// timestamps format as an empty string.
pub fn format_time(ts: Timestamp, offset: Option<FixedOffset>) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(ts.millis) else {
        return String::new();
    };
    match offset {
        Some(offset) => clock(&offset.from_utc_datetime(&utc.naive_utc())),
        None => clock(&utc.with_timezone(&Local)),
    }
}

fn clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M%p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ignores_escapes() {
        assert_eq!(visible_width("\x1b[38;5;2malice\x1b[0m"), 5);
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(pad_right("\x1b[1mab\x1b[0m", 4), "\x1b[1mab\x1b[0m  ");
        assert_eq!(pad_left("3:04PM", 8), "  3:04PM");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("general", 10), "general");
        assert_eq!(truncate("engineering-announcements", 8), "enginee…");
        assert_eq!(truncate("日本語", 4), "日…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn shorten() {
        assert_eq!(shorten_sender("Mary Ann Smith"), "Mary AS");
        assert_eq!(shorten_sender("bob"), "bob");
        assert_eq!(shorten_sender("  "), "");
    }

    #[test]
    fn twelve_hour_clock() {
        let utc = FixedOffset::east_opt(0);
        // 2023-11-14T15:04:05Z
        assert_eq!(format_time(Timestamp::from_millis(1_699_974_245_000), utc), "3:04PM");
        // midnight
        assert_eq!(format_time(Timestamp::from_millis(0), utc), "12:00AM");
        let plus_one = FixedOffset::east_opt(3600);
        assert_eq!(format_time(Timestamp::from_millis(0), plus_one), "1:00AM");
    }
}
