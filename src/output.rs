use tracing::trace;

use crate::field::FieldController;

/// Read-only output string kept in step with the Input field.
///
/// The Negative field is edited the same way but never contributes here.
#[derive(Debug, Default)]
pub struct OutputComposer {
    revision: Option<u64>,
    output: String,
}

impl OutputComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-serializes `input` if it changed since the last call. Returns whether
    /// the output was recomputed.
    pub fn refresh(&mut self, input: &FieldController) -> bool {
        if self.revision == Some(input.revision()) {
            return false;
        }
        self.output = input.serialize();
        self.revision = Some(input.revision());
        trace!(revision = input.revision(), len = self.output.len(), "output recomputed");
        true
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
