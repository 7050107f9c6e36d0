use super::content::{next_word_boundary, previous_word_boundary};
use super::{Document, Unit};

impl Document {
    pub fn clamp_caret(&self, caret: usize) -> usize {
        caret.min(self.len())
    }

    pub fn caret_left(&self, caret: usize) -> usize {
        self.clamp_caret(caret).saturating_sub(1)
    }

    pub fn caret_right(&self, caret: usize) -> usize {
        self.clamp_caret(caret.saturating_add(1))
    }

    pub fn caret_word_left(&self, caret: usize) -> usize {
        previous_word_boundary(&self.units(), caret)
    }

    pub fn caret_word_right(&self, caret: usize) -> usize {
        next_word_boundary(&self.units(), caret)
    }

    /// Start of the logical line (after the previous `\n`).
    pub fn line_start_caret(&self, caret: usize) -> usize {
        let units = self.units();
        let mut idx = caret.min(units.len());
        while idx > 0 && units[idx - 1] != Unit::Char('\n') {
            idx -= 1;
        }
        idx
    }

    /// End of the logical line (before the next `\n`).
    pub fn line_end_caret(&self, caret: usize) -> usize {
        let units = self.units();
        let mut idx = caret.min(units.len());
        while idx < units.len() && units[idx] != Unit::Char('\n') {
            idx += 1;
        }
        idx
    }

    /// Logical line and column of the caret, both zero based.
    pub fn caret_line_column(&self, caret: usize) -> (usize, usize) {
        let units = self.units();
        let caret = caret.min(units.len());
        let mut line = 0;
        let mut column = 0;
        for unit in &units[..caret] {
            if *unit == Unit::Char('\n') {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}
