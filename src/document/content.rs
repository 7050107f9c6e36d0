use super::Unit;

pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub(crate) fn insert_str_at(text: &mut String, offset: usize, insert: &str) {
    let clamped_offset = offset.min(char_count(text));
    let byte_idx = char_to_byte_idx(text, clamped_offset);
    text.insert_str(byte_idx, insert);
}

pub(crate) fn remove_char_at(text: &mut String, offset: usize) -> Option<char> {
    if offset >= char_count(text) {
        return None;
    }
    let start = char_to_byte_idx(text, offset);
    let end = char_to_byte_idx(text, offset + 1);
    if start >= end || end > text.len() {
        return None;
    }
    text.drain(start..end).next()
}

pub(crate) fn split_text_at(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    (text[..byte_idx].to_string(), text[byte_idx..].to_string())
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UnitClass {
    Space,
    Word,
    Punct,
    Token,
}

fn classify(unit: Unit) -> UnitClass {
    match unit {
        Unit::Token(_) => UnitClass::Token,
        Unit::Char(ch) if ch.is_whitespace() => UnitClass::Space,
        Unit::Char(ch) if is_word_char(ch) => UnitClass::Word,
        Unit::Char(_) => UnitClass::Punct,
    }
}

/// Skips whitespace backwards, then one run of same-class units. A token is
/// a run of its own.
pub(crate) fn previous_word_boundary(units: &[Unit], offset: usize) -> usize {
    let mut idx = offset.min(units.len());
    while idx > 0 && classify(units[idx - 1]) == UnitClass::Space {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }
    let class = classify(units[idx - 1]);
    if class == UnitClass::Token {
        return idx - 1;
    }
    while idx > 0 && classify(units[idx - 1]) == class {
        idx -= 1;
    }
    idx
}

pub(crate) fn next_word_boundary(units: &[Unit], offset: usize) -> usize {
    let len = units.len();
    let mut idx = offset.min(len);
    if idx == len {
        return len;
    }
    let class = classify(units[idx]);
    if class == UnitClass::Token {
        idx += 1;
    } else if class != UnitClass::Space {
        while idx < len && classify(units[idx]) == class {
            idx += 1;
        }
    }
    while idx < len && classify(units[idx]) == UnitClass::Space {
        idx += 1;
    }
    idx
}
