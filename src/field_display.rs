use std::ops::{Deref, DerefMut};

use crate::field::FieldController;
use crate::render::{CursorVisualPosition, RenderResult, render_view};
use crate::theme::Theme;

/// FieldDisplay wraps a FieldController and keeps the visual state needed to
/// move the caret through wrapped lines and to scroll the field.
#[derive(Debug)]
pub struct FieldDisplay {
    field: FieldController,
    visual_positions: Vec<CaretDisplay>,
    last_cursor_visual: Option<CursorVisualPosition>,
    preferred_column: Option<u16>,
    scroll_top: usize,
    last_view_height: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaretDisplay {
    pub caret: usize,
    pub position: CursorVisualPosition,
}

impl FieldDisplay {
    pub fn new(field: FieldController) -> Self {
        Self {
            field,
            visual_positions: Vec::new(),
            last_cursor_visual: None,
            preferred_column: None,
            scroll_top: 0,
            last_view_height: 1,
        }
    }

    pub fn last_cursor_visual(&self) -> Option<CursorVisualPosition> {
        self.last_cursor_visual
    }

    pub fn set_preferred_column(&mut self, column: Option<u16>) {
        self.preferred_column = column;
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Renders the open field at `width` and records caret positions. Returns
    /// `None` while the field is collapsed.
    pub fn render(&mut self, width: usize, theme: &Theme) -> Option<RenderResult> {
        let surface = self.field.surface()?;
        let active = self.field.menu().map(|menu| menu.token);
        let result = render_view(surface, width, Some(self.field.caret()), active, theme);

        self.visual_positions = result
            .cursor_map
            .iter()
            .map(|&(caret, position)| CaretDisplay { caret, position })
            .collect();
        self.last_cursor_visual = result.cursor;
        if self.preferred_column.is_none() {
            self.preferred_column = result.cursor.map(|position| position.column);
        }
        Some(result)
    }

    /// Scrolls so the caret line is inside a viewport of `height` lines.
    pub fn update_scroll(&mut self, height: usize, total_lines: usize) -> usize {
        self.last_view_height = height.max(1);
        let max_scroll = total_lines.saturating_sub(self.last_view_height);
        if let Some(cursor) = self.last_cursor_visual {
            if cursor.line < self.scroll_top {
                self.scroll_top = cursor.line;
            } else if cursor.line >= self.scroll_top + self.last_view_height {
                self.scroll_top = cursor.line + 1 - self.last_view_height;
            }
        }
        self.scroll_top = self.scroll_top.min(max_scroll);
        self.scroll_top
    }

    fn current_position(&self) -> Option<CursorVisualPosition> {
        let caret = self.field.caret();
        self.visual_positions
            .iter()
            .find(|entry| entry.caret == caret)
            .map(|entry| entry.position)
            .or(self.last_cursor_visual)
    }

    fn max_line(&self) -> usize {
        self.visual_positions
            .iter()
            .map(|entry| entry.position.line)
            .max()
            .unwrap_or(0)
    }

    /// Moves the caret by `delta` visual lines, keeping the preferred column.
    /// Falls back to the logical line start or end at the edges.
    pub fn move_cursor_vertical(&mut self, delta: i32) {
        let Some(current) = self.current_position() else {
            return;
        };
        let desired_column = self.preferred_column.unwrap_or(current.column);
        let target_line = (current.line as i64 + delta as i64).clamp(0, self.max_line() as i64);

        let destination = self.closest_caret_on_line(target_line as usize, desired_column);
        match destination {
            Some(dest) if dest.caret != self.field.caret() => {
                self.field.set_caret(dest.caret);
                self.preferred_column = Some(desired_column);
                self.last_cursor_visual = Some(dest.position);
            }
            _ => {
                if delta < 0 {
                    self.field.set_caret(0);
                } else if delta > 0 {
                    let end = self.field.document().len();
                    self.field.set_caret(end);
                }
                self.preferred_column = None;
            }
        }
    }

    pub fn page_jump_distance(&self) -> i32 {
        let approx = ((self.last_view_height as f32) * 0.9).round() as usize;
        approx.max(1) as i32
    }

    pub fn move_page(&mut self, direction: i32) {
        if direction == 0 {
            return;
        }
        let distance = self.page_jump_distance();
        self.move_cursor_vertical(distance * direction);
    }

    pub fn move_to_visual_line_start(&mut self) {
        self.preferred_column = None;
        match self.visual_line_boundaries_at_caret() {
            Some((start, _)) => self.focus(start),
            None => self.field.move_line_start(),
        }
    }

    pub fn move_to_visual_line_end(&mut self) {
        self.preferred_column = None;
        match self.visual_line_boundaries_at_caret() {
            Some((_, end)) => self.focus(end),
            None => self.field.move_line_end(),
        }
    }

    fn focus(&mut self, display: CaretDisplay) {
        self.field.set_caret(display.caret);
        self.last_cursor_visual = Some(display.position);
    }

    fn visual_line_boundaries_at_caret(&self) -> Option<(CaretDisplay, CaretDisplay)> {
        let line = self.current_position()?.line;
        self.visual_line_boundaries(line)
    }

    /// First and last caret positions drawn on a visual line.
    pub fn visual_line_boundaries(&self, line: usize) -> Option<(CaretDisplay, CaretDisplay)> {
        let mut entries = self
            .visual_positions
            .iter()
            .filter(|entry| entry.position.line == line);
        let first = *entries.next()?;
        let (start, end) = entries.fold((first, first), |(start, end), entry| {
            let key = |display: &CaretDisplay| (display.position.column, display.caret);
            (
                if key(entry) < key(&start) { *entry } else { start },
                if key(entry) > key(&end) { *entry } else { end },
            )
        });
        Some((start, end))
    }

    fn closest_caret_on_line(&self, line: usize, column: u16) -> Option<CaretDisplay> {
        self.visual_positions
            .iter()
            .filter(|entry| entry.position.line == line)
            .min_by_key(|entry| entry.position.column.abs_diff(column))
            .copied()
    }
}

impl Deref for FieldDisplay {
    type Target = FieldController;

    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl DerefMut for FieldDisplay {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.field
    }
}
