pub mod boolean;
pub mod disclosure;
pub mod draft;
pub mod number;
pub mod text;

use crossterm::event::KeyEvent;

use crate::grid::{CellValue, ColumnDef, ColumnKind};
use crate::nav::NavKey;

pub use boolean::BooleanEditor;
pub use disclosure::{DisclosureController, PopperCellState, PopperResponse, PopperStage};
pub use number::NumberEditor;
pub use text::TextEditor;

/// What the editing cell currently shows instead of its committed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub text: String,
    /// Character index of the caret, for free-form drafts
    pub cursor: Option<usize>,
}

/// Draft handling shared by the scalar cell types
pub trait CellEditor {
    /// Apply a key to the draft. Returns false for keys the editor ignores.
    fn update_draft(&mut self, key: KeyEvent) -> bool;

    /// Value to store on save. Scalar commits never reject.
    fn commit(&self) -> CellValue;

    fn draft_view(&self) -> DraftView;
}

/// Result of giving Enter, Escape or Tab to the editing cell
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Keep editing
    Stay,
    /// Save and leave edit mode
    Commit(CellValue),
    /// Leave edit mode without saving
    Cancel,
    /// Save (if there is anything to save) and move focus
    Advance { commit: Option<CellValue>, key: NavKey },
}

/// The editing cell's controller, picked by column kind
#[derive(Debug, Clone)]
pub enum CellController {
    Text(TextEditor),
    Number(NumberEditor),
    Boolean(BooleanEditor),
    Disclosure(DisclosureController),
}

impl CellController {
    /// Seed a controller from the committed value
    pub fn begin(column: &ColumnDef, committed: &CellValue) -> Self {
        match column.kind {
            ColumnKind::Text => CellController::Text(TextEditor::begin_edit(committed)),
            ColumnKind::Number => CellController::Number(NumberEditor::begin_edit(committed)),
            ColumnKind::Boolean => CellController::Boolean(BooleanEditor::begin_edit(committed)),
            ColumnKind::Popper => CellController::Disclosure(DisclosureController::new()),
        }
    }

    fn scalar(&self) -> Option<&dyn CellEditor> {
        match self {
            CellController::Text(e) => Some(e as &dyn CellEditor),
            CellController::Number(e) => Some(e as &dyn CellEditor),
            CellController::Boolean(e) => Some(e as &dyn CellEditor),
            CellController::Disclosure(_) => None,
        }
    }

    fn scalar_mut(&mut self) -> Option<&mut dyn CellEditor> {
        match self {
            CellController::Text(e) => Some(e as &mut dyn CellEditor),
            CellController::Number(e) => Some(e as &mut dyn CellEditor),
            CellController::Boolean(e) => Some(e as &mut dyn CellEditor),
            CellController::Disclosure(_) => None,
        }
    }

    /// The handler that gets first refusal on keys, if this cell type has one
    pub fn delegate(&mut self) -> Option<&mut DisclosureController> {
        match self {
            CellController::Disclosure(d) => Some(d),
            _ => None,
        }
    }

    pub fn has_delegate(&self) -> bool {
        matches!(self, CellController::Disclosure(_))
    }

    pub fn on_enter(&mut self) -> EditOutcome {
        match self.scalar() {
            Some(editor) => EditOutcome::Commit(editor.commit()),
            None => EditOutcome::Stay,
        }
    }

    pub fn on_escape(&mut self) -> EditOutcome {
        EditOutcome::Cancel
    }

    /// Tab saves and advances. Arrows belong to the draft, so the engine
    /// never moves on them while editing.
    pub fn on_navigate(&mut self, key: NavKey) -> EditOutcome {
        if !key.is_tab() {
            return EditOutcome::Stay;
        }
        EditOutcome::Advance { commit: self.commit(), key }
    }

    /// Any other key goes to the draft
    pub fn on_input(&mut self, key: KeyEvent) -> bool {
        match self.scalar_mut() {
            Some(editor) => editor.update_draft(key),
            None => false,
        }
    }

    /// Value a blur or save would store; None for cells with nothing to save
    pub fn commit(&self) -> Option<CellValue> {
        self.scalar().map(|e| e.commit())
    }

    pub fn draft_view(&self) -> Option<DraftView> {
        self.scalar().map(|e| e.draft_view())
    }

    pub fn popper_state(&self) -> Option<PopperCellState> {
        match self {
            CellController::Disclosure(d) => Some(d.state()),
            _ => None,
        }
    }
}
