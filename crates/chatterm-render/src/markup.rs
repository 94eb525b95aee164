//! Inline markup highlighting.
//!
//! Substitutions run in a fixed order:
//!
//! 1. `@mentions` on the notify background
//! 2. ticket references (`#123`) in the ticket color
//! 3. triple-backtick blocks in the code color
//! 4. single-backtick spans in the code color
//! 5. newlines re-indented to the content column
//! 6. a trailing reset
//!
//! Code blocks are cut out before spans are searched, so backticks inside a
//! block are never wrapped a second time. Unmatched delimiters stay literal.

use std::sync::LazyLock;

use crossterm::style::Color;
use regex::{Captures, Regex};

use crate::style::{RenderStyle, paint_bg, paint_fg, reset};

#[allow(clippy::expect_used)]
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w(?:[\w.\-]*\w)?").expect("invariant: mention pattern is valid"));

#[allow(clippy::expect_used)]
static TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\d+\b").expect("invariant: ticket pattern is valid"));

#[allow(clippy::expect_used)]
static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.+?)```").expect("invariant: code block pattern is valid"));

#[allow(clippy::expect_used)]
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("invariant: code span pattern is valid"));

enum Segment {
    /// Still eligible for substitution
    Plain(String),
    /// Already wrapped
    Styled(String),
}

impl Segment {
    fn as_str(&self) -> &str {
        match self {
            Self::Plain(s) | Self::Styled(s) => s,
        }
    }
}

/// Highlight `content`, re-indenting continuation lines by `indent` columns.
pub fn highlight(content: &str, style: &RenderStyle, indent: usize) -> String {
    let text = MENTION.replace_all(content, |c: &Captures<'_>| paint_bg(&c[0], style.notify));
    let text = TICKET.replace_all(&text, |c: &Captures<'_>| paint_fg(&c[0], style.ticket));

    let segments = vec![Segment::Plain(text.into_owned())];
    let segments = wrap_matches(segments, &CODE_BLOCK, style.code);
    let segments = wrap_matches(segments, &CODE_SPAN, style.code);

    let newline = format!("\n{}", " ".repeat(indent));
    let mut out: String = segments.iter().map(Segment::as_str).collect::<String>().replace('\n', &newline);
    out.push_str(&reset());
    out
}

/// Replace every match of `pattern` in plain segments with its first capture
/// group painted in `color`.
fn wrap_matches(segments: Vec<Segment>, pattern: &Regex, color: Color) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        let Segment::Plain(text) = segment else {
            out.push(segment);
            continue;
        };

        let mut last = 0;
        for caps in pattern.captures_iter(&text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                out.push(Segment::Plain(text[last..whole.start()].to_owned()));
            }
            out.push(Segment::Styled(paint_fg(inner.as_str(), color)));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Segment::Plain(text[last..].to_owned()));
        }
    }
    out
}
