use crossterm::event::{KeyCode, KeyEvent};

use crate::grid::format::{FALSE_LABEL, TRUE_LABEL};
use crate::grid::CellValue;

use super::{CellEditor, DraftView};

/// Two-value choice between true and false
#[derive(Debug, Clone)]
pub struct BooleanEditor {
    draft: bool,
}

impl BooleanEditor {
    pub fn begin_edit(committed: &CellValue) -> Self {
        Self { draft: committed.as_bool() }
    }
}

impl CellEditor for BooleanEditor {
    fn update_draft(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => {
                self.draft = !self.draft;
            }
            KeyCode::Char('t') | KeyCode::Char('y') | KeyCode::Char('1') => self.draft = true,
            KeyCode::Char('f') | KeyCode::Char('n') | KeyCode::Char('0') => self.draft = false,
            _ => return false,
        }
        true
    }

    fn commit(&self) -> CellValue {
        CellValue::Boolean(self.draft)
    }

    fn draft_view(&self) -> DraftView {
        let text = if self.draft { TRUE_LABEL } else { FALSE_LABEL };
        DraftView { text: text.to_string(), cursor: None }
    }
}
