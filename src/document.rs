use tracing::debug;

use crate::registry::{TokenId, TokenRegistry, default_label};

use content::{char_count, insert_str_at, remove_char_at, split_text_at};

mod content;
mod cursor;
mod serialize;
mod view;

pub use content::char_to_byte_idx;
pub use serialize::{escape_option, serialize_segments};
pub use view::{EditableView, ViewRun};

/// Inline token as stored in the document. It mirrors the registry entry with
/// the same id and is updated together with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSegment {
    pub id: TokenId,
    pub label: String,
    pub list_title: Option<String>,
    pub selected_options: Vec<String>,
}

impl TokenSegment {
    pub fn new(id: TokenId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            list_title: None,
            selected_options: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text; `\n` is a line break.
    Text(String),
    Token(TokenSegment),
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text(text.into())
    }

    /// Number of caret units the segment occupies. A token is one unit.
    pub fn unit_len(&self) -> usize {
        match self {
            Segment::Text(text) => char_count(text),
            Segment::Token(_) => 1,
        }
    }
}

/// A single caret unit: one character of text or one whole token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Char(char),
    Token(TokenId),
}

/// What a deletion took out of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removed {
    Char(char),
    Token(TokenId),
}

/// Ordered mix of text and token segments. Carets address the document in
/// units (see [`Unit`]); `0..=len()` are valid positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_segments(vec![Segment::text(text)])
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let segments = segments
            .into_iter()
            .filter(|segment| !matches!(segment, Segment::Text(text) if text.is_empty()))
            .collect();
        Self { segments }
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        if !matches!(&segment, Segment::Text(text) if text.is_empty()) {
            self.segments.push(segment);
        }
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::unit_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn units(&self) -> Vec<Unit> {
        let mut units = Vec::with_capacity(self.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => units.extend(text.chars().map(Unit::Char)),
                Segment::Token(token) => units.push(Unit::Token(token.id)),
            }
        }
        units
    }

    pub fn serialize(&self) -> String {
        serialize_segments(&self.segments)
    }

    /// Text with every token replaced by its label.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Token(token) => token.label.as_str(),
            })
            .collect()
    }

    pub fn editable_view(&self) -> EditableView {
        view::to_editable_view(&self.segments)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenSegment> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(token) => Some(token),
            Segment::Text(_) => None,
        })
    }

    pub fn token(&self, id: TokenId) -> Option<&TokenSegment> {
        self.tokens().find(|token| token.id == id)
    }

    fn token_mut(&mut self, id: TokenId) -> Option<&mut TokenSegment> {
        self.segments.iter_mut().find_map(|segment| match segment {
            Segment::Token(token) if token.id == id => Some(token),
            _ => None,
        })
    }

    /// Caret position directly before the token.
    pub fn token_caret(&self, id: TokenId) -> Option<usize> {
        let mut start = 0;
        for segment in &self.segments {
            if let Segment::Token(token) = segment {
                if token.id == id {
                    return Some(start);
                }
            }
            start += segment.unit_len();
        }
        None
    }

    /// Token occupying the unit at `unit`, if that unit is a token.
    pub fn token_at(&self, unit: usize) -> Option<TokenId> {
        let (index, _) = self.locate_unit(unit)?;
        match &self.segments[index] {
            Segment::Token(token) => Some(token.id),
            Segment::Text(_) => None,
        }
    }

    /// Token touching the caret, preferring the one to its right.
    pub fn token_near(&self, caret: usize) -> Option<TokenId> {
        self.token_at(caret)
            .or_else(|| caret.checked_sub(1).and_then(|unit| self.token_at(unit)))
    }

    /// Inserts a new token at `caret`, splitting the text segment around it.
    /// A missing caret, or one past the end, appends the token. Returns the
    /// new id and the caret position right after the token.
    pub fn insert_token(
        &mut self,
        registry: &mut TokenRegistry,
        caret: Option<usize>,
    ) -> (TokenId, usize) {
        let id = registry.create();
        let label = registry
            .get(id)
            .map(|token| token.label.clone())
            .unwrap_or_else(|| default_label(id));
        let index = caret
            .and_then(|caret| self.split_at_caret(caret))
            .unwrap_or(self.segments.len());
        self.segments
            .insert(index, Segment::Token(TokenSegment::new(id, label)));
        let caret_after = self.segments[..=index]
            .iter()
            .map(Segment::unit_len)
            .sum();
        debug!(token = %id, index, "token inserted");
        (id, caret_after)
    }

    pub fn set_token_label(&mut self, id: TokenId, label: impl Into<String>) {
        if let Some(token) = self.token_mut(id) {
            token.label = label.into();
        }
    }

    /// Replaces the attached list and chosen options of a token. An empty
    /// `options` with a list means "list attached, nothing chosen".
    pub fn set_token_options(
        &mut self,
        id: TokenId,
        list_title: Option<String>,
        options: Vec<String>,
    ) {
        if let Some(token) = self.token_mut(id) {
            token.list_title = list_title;
            token.selected_options = options;
        }
    }

    /// Drops the token segment. Neighbouring text segments stay unmerged.
    pub fn remove_token(&mut self, id: TokenId) -> bool {
        let before = self.segments.len();
        self.segments
            .retain(|segment| !matches!(segment, Segment::Token(token) if token.id == id));
        before != self.segments.len()
    }

    /// Inserts text at `caret` (clamped to the document) and returns the caret
    /// after the inserted text.
    pub fn insert_text(&mut self, caret: usize, text: &str) -> usize {
        let inserted = char_count(text);
        if inserted == 0 {
            return caret;
        }
        let caret = caret.min(self.len());
        let mut start = 0;
        for segment in &mut self.segments {
            let len = segment.unit_len();
            if let Segment::Text(existing) = segment {
                if caret >= start && caret <= start + len {
                    insert_str_at(existing, caret - start, text);
                    return caret + inserted;
                }
            }
            start += len;
        }
        let index = self.split_at_caret(caret).unwrap_or(self.segments.len());
        self.segments.insert(index, Segment::text(text));
        caret + inserted
    }

    pub fn insert_char(&mut self, caret: usize, ch: char) -> usize {
        let mut buffer = [0u8; 4];
        self.insert_text(caret, ch.encode_utf8(&mut buffer))
    }

    /// Removes the unit before `caret`. Returns what was removed and the new
    /// caret.
    pub fn delete_backward(&mut self, caret: usize) -> Option<(Removed, usize)> {
        let unit = caret.min(self.len()).checked_sub(1)?;
        self.remove_unit(unit).map(|removed| (removed, unit))
    }

    /// Removes the unit after `caret`; the caret stays where it is.
    pub fn delete_forward(&mut self, caret: usize) -> Option<Removed> {
        self.remove_unit(caret)
    }

    fn remove_unit(&mut self, unit: usize) -> Option<Removed> {
        let (index, offset) = self.locate_unit(unit)?;
        match &mut self.segments[index] {
            Segment::Text(text) => {
                let ch = remove_char_at(text, offset)?;
                if text.is_empty() {
                    self.segments.remove(index);
                }
                Some(Removed::Char(ch))
            }
            Segment::Token(token) => {
                let id = token.id;
                self.segments.remove(index);
                Some(Removed::Token(id))
            }
        }
    }

    /// Segment index and offset inside it for the unit at `unit`.
    fn locate_unit(&self, unit: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (index, segment) in self.segments.iter().enumerate() {
            let len = segment.unit_len();
            if unit < start + len {
                return Some((index, unit - start));
            }
            start += len;
        }
        None
    }

    /// Makes sure a segment boundary exists at `caret` and returns the index
    /// of the segment that starts there. `None` if the caret is out of range.
    fn split_at_caret(&mut self, caret: usize) -> Option<usize> {
        let mut start = 0;
        for index in 0..self.segments.len() {
            if caret == start {
                return Some(index);
            }
            let len = self.segments[index].unit_len();
            if caret < start + len {
                let Segment::Text(text) = &self.segments[index] else {
                    return Some(index + 1);
                };
                let (left, right) = split_text_at(text, caret - start);
                self.segments[index] = Segment::Text(left);
                self.segments.insert(index + 1, Segment::Text(right));
                return Some(index + 1);
            }
            start += len;
        }
        (caret == start).then_some(self.segments.len())
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
