use std::collections::HashMap;

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{EditableView, ViewRun};
use crate::registry::TokenId;
use crate::theme::Theme;

const TAB_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
    /// Visual position of every caret offset in the view, in caret order.
    pub cursor_map: Vec<(usize, CursorVisualPosition)>,
}

/// Wraps an editable view to `width` columns. Markers render as a single
/// styled word; `active` highlights the token whose menu is open.
pub fn render_view(
    view: &EditableView,
    width: usize,
    caret: Option<usize>,
    active: Option<TokenId>,
    theme: &Theme,
) -> RenderResult {
    let mut fragments = Vec::new();
    collect_fragments(view, active, theme, &mut fragments);
    let mut renderer = Renderer::new();
    renderer.consume_lines(wrap_fragments(&fragments, width.max(1)));
    renderer.finish(caret)
}

/// Text drawn for a marker.
pub fn marker_text(label: &str) -> String {
    format!("[{label}]")
}

struct Renderer {
    caret_positions: HashMap<usize, CursorVisualPosition>,
    lines: Vec<Line<'static>>,
    current_line_index: usize,
}

impl Renderer {
    fn new() -> Self {
        Self {
            caret_positions: HashMap::new(),
            lines: Vec::new(),
            current_line_index: 0,
        }
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            for event in output.events {
                let position = CursorVisualPosition {
                    line: self.current_line_index,
                    column: event.column,
                };
                // A caret sitting on a soft wrap keeps its first position.
                self.caret_positions.entry(event.caret).or_insert(position);
            }
            self.lines.push(Line::from(spans));
            self.current_line_index += 1;
        }
    }

    fn finish(mut self, caret: Option<usize>) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();

        let mut cursor_map: Vec<_> = self.caret_positions.into_iter().collect();
        cursor_map.sort_by_key(|(caret, _)| *caret);
        let cursor = caret.and_then(|caret| {
            cursor_map
                .iter()
                .find(|(offset, _)| *offset == caret)
                .map(|(_, position)| *position)
        });

        RenderResult {
            lines: self.lines,
            cursor,
            total_lines,
            cursor_map,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
}

#[derive(Clone, Copy)]
struct LocatedEvent {
    column: u16,
    caret: usize,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<CaretEvent>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FragmentKind {
    Word,
    Whitespace,
}

enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

/// Caret offset located `offset` columns into a fragment.
#[derive(Clone, Copy)]
struct CaretEvent {
    offset: usize,
    caret: usize,
}

fn collect_fragments(
    view: &EditableView,
    active: Option<TokenId>,
    theme: &Theme,
    fragments: &mut Vec<FragmentItem>,
) {
    let text_style = theme.field_text_style();
    let mut builder: Option<TokenBuilder> = None;
    let mut pending: Vec<CaretEvent> = Vec::new();
    let mut unit = 0;

    for run in &view.runs {
        match run {
            ViewRun::Text(text) => {
                for ch in text.chars() {
                    pending.push(CaretEvent {
                        offset: 0,
                        caret: unit,
                    });
                    unit += 1;
                    let (actual, repeat) = if ch == '\t' {
                        (' ', TAB_WIDTH)
                    } else {
                        (ch, 1)
                    };
                    let is_whitespace = actual.is_whitespace();
                    if !builder
                        .as_ref()
                        .is_some_and(|current| current.kind_matches(is_whitespace))
                    {
                        flush(&mut builder, fragments);
                        builder = Some(TokenBuilder::new(text_style, is_whitespace));
                    }
                    if let Some(current) = builder.as_mut() {
                        current.add_events(&mut pending);
                        for _ in 0..repeat {
                            current.push_char(actual);
                        }
                    }
                }
            }
            ViewRun::LineBreak => {
                pending.push(CaretEvent {
                    offset: 0,
                    caret: unit,
                });
                unit += 1;
                finish_line(&mut builder, &mut pending, text_style, fragments);
                fragments.push(FragmentItem::LineBreak);
            }
            ViewRun::Marker { id, label } => {
                flush(&mut builder, fragments);
                pending.push(CaretEvent {
                    offset: 0,
                    caret: unit,
                });
                unit += 1;
                let style = if active == Some(*id) {
                    theme.active_marker_style()
                } else {
                    theme.marker_style()
                };
                let mut marker = TokenBuilder::new(style, false);
                marker.add_events(&mut pending);
                for ch in marker_text(label).chars() {
                    marker.push_char(ch);
                }
                fragments.push(FragmentItem::Token(marker.finish()));
            }
        }
    }

    pending.push(CaretEvent {
        offset: 0,
        caret: unit,
    });
    finish_line(&mut builder, &mut pending, text_style, fragments);
}

fn flush(builder: &mut Option<TokenBuilder>, fragments: &mut Vec<FragmentItem>) {
    if let Some(token) = builder.take() {
        fragments.push(FragmentItem::Token(token.finish()));
    }
}

/// Places the caret offsets that sit after the last character of a line.
fn finish_line(
    builder: &mut Option<TokenBuilder>,
    pending: &mut Vec<CaretEvent>,
    style: Style,
    fragments: &mut Vec<FragmentItem>,
) {
    match builder.take() {
        Some(mut token) => {
            token.add_events(pending);
            fragments.push(FragmentItem::Token(token.finish()));
        }
        None => push_events_only(pending, style, fragments),
    }
}

fn push_events_only(
    pending: &mut Vec<CaretEvent>,
    style: Style,
    fragments: &mut Vec<FragmentItem>,
) {
    if pending.is_empty() {
        return;
    }
    fragments.push(FragmentItem::Token(Fragment {
        text: String::new(),
        style,
        kind: FragmentKind::Word,
        width: 0,
        events: std::mem::take(pending),
    }));
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    events: Vec<CaretEvent>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            events: Vec::new(),
        }
    }

    fn kind_matches(&self, is_whitespace: bool) -> bool {
        matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        )
    }

    fn add_events(&mut self, pending: &mut Vec<CaretEvent>) {
        for mut event in pending.drain(..) {
            event.offset = self.width;
            self.events.push(event);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            events: self.events,
        }
    }
}

fn wrap_fragments(fragments: &[FragmentItem], width: usize) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new();
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new();
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => pending_whitespace.push(token.clone()),
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > 0 && builder.width + whitespace_width + token.width > width
                    {
                        builder.consume_pending(&mut pending_whitespace);
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new();
                    }
                    builder.consume_pending(&mut pending_whitespace);
                    builder.append(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    events: Vec<LocatedEvent>,
    width: usize,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            events: Vec::new(),
            width: 0,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append(fragment);
        }
    }

    fn append(&mut self, fragment: Fragment) {
        let start = self.width;
        if !fragment.text.is_empty() {
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
            self.width += fragment.width;
        }
        for event in fragment.events {
            self.events.push(LocatedEvent {
                column: (start + event.offset) as u16,
                caret: event.caret,
            });
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        self.events.sort_by_key(|event| event.caret);
        LineOutput {
            spans: self.segments,
            events: self.events,
        }
    }
}

pub fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}
