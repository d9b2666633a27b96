use crossterm::event::KeyEvent;
use tracing::warn;

use crate::grid::value::format_plain_number;
use crate::grid::CellValue;

use super::draft::TextDraft;
use super::{CellEditor, DraftView};

/// Numeric editing over a text draft.
///
/// The draft accepts any input; parsing happens on commit. A draft that does
/// not parse to a finite number commits as `0` instead of being rejected, so
/// the cell never ends up without a numeric value.
#[derive(Debug, Clone)]
pub struct NumberEditor {
    draft: TextDraft,
}

impl NumberEditor {
    pub fn begin_edit(committed: &CellValue) -> Self {
        Self { draft: TextDraft::new(format_plain_number(committed.as_number())) }
    }

    pub fn parse_draft(draft: &str) -> Option<f64> {
        draft.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl CellEditor for NumberEditor {
    fn update_draft(&mut self, key: KeyEvent) -> bool {
        self.draft.handle_key(key)
    }

    fn commit(&self) -> CellValue {
        match Self::parse_draft(&self.draft.buffer) {
            Some(n) => CellValue::Number(n),
            None => {
                warn!(draft = %self.draft.buffer, "draft is not a number, committing 0");
                CellValue::Number(0.0)
            }
        }
    }

    fn draft_view(&self) -> DraftView {
        DraftView { text: self.draft.buffer.clone(), cursor: Some(self.draft.cursor) }
    }
}
