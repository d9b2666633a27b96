use crossterm::event::KeyEvent;

use crate::grid::CellValue;

use super::draft::TextDraft;
use super::{CellEditor, DraftView};

/// Free text editing. Commits the buffer as typed.
#[derive(Debug, Clone)]
pub struct TextEditor {
    draft: TextDraft,
}

impl TextEditor {
    pub fn begin_edit(committed: &CellValue) -> Self {
        Self { draft: TextDraft::new(committed.as_text()) }
    }
}

impl CellEditor for TextEditor {
    fn update_draft(&mut self, key: KeyEvent) -> bool {
        self.draft.handle_key(key)
    }

    fn commit(&self) -> CellValue {
        CellValue::Text(self.draft.buffer.clone())
    }

    fn draft_view(&self) -> DraftView {
        DraftView { text: self.draft.buffer.clone(), cursor: Some(self.draft.cursor) }
    }
}
