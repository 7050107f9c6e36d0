use crate::registry::TokenId;

use super::Segment;

/// Render-only projection of a document. Options are not part of it; the
/// authoritative token state lives in the registry and the segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditableView {
    pub runs: Vec<ViewRun>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewRun {
    Text(String),
    LineBreak,
    Marker { id: TokenId, label: String },
}

impl EditableView {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of caret units covered by the view, equal to the source
    /// document's length.
    pub fn unit_len(&self) -> usize {
        self.runs
            .iter()
            .map(|run| match run {
                ViewRun::Text(text) => text.chars().count(),
                ViewRun::LineBreak | ViewRun::Marker { .. } => 1,
            })
            .sum()
    }
}

pub(crate) fn to_editable_view(segments: &[Segment]) -> EditableView {
    let mut runs = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => {
                for (idx, line) in text.split('\n').enumerate() {
                    if idx > 0 {
                        runs.push(ViewRun::LineBreak);
                    }
                    if !line.is_empty() {
                        runs.push(ViewRun::Text(line.to_string()));
                    }
                }
            }
            Segment::Token(token) => runs.push(ViewRun::Marker {
                id: token.id,
                label: token.label.clone(),
            }),
        }
    }
    EditableView { runs }
}
