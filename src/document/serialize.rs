//! Canonical output string.
//!
//! ```text
//! document := (text | token)*
//! token    := '{' option ('|' option)* '}' | '{' label '}'
//! option   := characters with '{' -> '\{' and '}' -> '\}'
//! ```
//!
//! The format is write-only; nothing parses it back into segments.

use super::{Segment, TokenSegment};

const NO_BREAK_SPACE: char = '\u{a0}';

pub fn serialize_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Token(token) => write_token(&mut out, token),
        }
    }
    if out.contains(NO_BREAK_SPACE) {
        out = out.replace(NO_BREAK_SPACE, " ");
    }
    out
}

fn write_token(out: &mut String, token: &TokenSegment) {
    out.push('{');
    if token.selected_options.is_empty() {
        out.push_str(&token.label);
    } else {
        for (idx, option) in token.selected_options.iter().enumerate() {
            if idx > 0 {
                out.push('|');
            }
            out.push_str(&escape_option(option));
        }
    }
    out.push('}');
}

pub fn escape_option(option: &str) -> String {
    let mut escaped = String::with_capacity(option.len());
    for ch in option.chars() {
        if matches!(ch, '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
