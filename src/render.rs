//! Per-cell visual state handed to whatever draws the grid.
//!
//! Nothing here knows about colors or widgets; a presentation layer maps the
//! flags onto its own styling.

use crate::editor::{DraftView, PopperCellState};
use crate::grid::format::display_text;
use crate::grid::{CellValue, ColumnDef, ColumnKind};
use crate::nav::{Coordinate, FocusState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Everything a renderer needs to draw one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellVisual {
    pub text: String,
    pub kind: ColumnKind,
    pub align: Align,
    /// Value of a boolean cell
    pub flag: Option<bool>,
    pub selected: bool,
    pub editing: bool,
    pub button_highlighted: bool,
    pub popover_open: bool,
    pub nested_focus: Option<Coordinate>,
    /// Live draft of the editing cell; drawn instead of `text`
    pub draft: Option<DraftView>,
}

impl CellVisual {
    pub fn with_draft(mut self, draft: Option<DraftView>) -> Self {
        self.draft = draft;
        self
    }

    /// Short names of the active flags, e.g. for a status line
    pub fn state_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.selected {
            names.push("selected");
        }
        if self.editing {
            names.push("editing");
        }
        if self.button_highlighted {
            names.push("button-highlighted");
        }
        if self.popover_open {
            names.push("popover-open");
        }
        names
    }
}

/// Pure mapping from a cell's value, column and the grid's focus/popper state
/// to its visual descriptor
pub fn visual_state(
    value: &CellValue,
    column: &ColumnDef,
    at: Coordinate,
    focus: &FocusState,
    popper: Option<&PopperCellState>,
) -> CellVisual {
    let selected = focus.is_focused(at);
    let editing = focus.is_editing(at);

    // popper state only ever belongs to the focused, editing cell
    let popper = match popper {
        Some(state) if editing && column.kind == ColumnKind::Popper => *state,
        _ => PopperCellState::default(),
    };

    let align = match column.kind {
        ColumnKind::Number => Align::Right,
        ColumnKind::Boolean | ColumnKind::Popper => Align::Center,
        ColumnKind::Text => Align::Left,
    };

    CellVisual {
        text: display_text(value, column),
        kind: column.kind,
        align,
        flag: (column.kind == ColumnKind::Boolean).then(|| value.as_bool()),
        selected,
        editing,
        button_highlighted: popper.button_highlighted,
        popover_open: popper.popover_open,
        nested_focus: popper.nested_focus,
        draft: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NumberFormat;

    #[test]
    fn test_unfocused_cell_is_plain() {
        let col = ColumnDef::new("salary", "Salary", ColumnKind::Number).with_format(NumberFormat::Currency);
        let focus = FocusState::selected(Coordinate::new(1, 1));
        let v = visual_state(&CellValue::Number(1234.5), &col, Coordinate::new(0, 0), &focus, None);
        assert_eq!(v.text, "$1,234.50");
        assert_eq!(v.align, Align::Right);
        assert!(!v.selected && !v.editing);
        assert!(v.state_names().is_empty());
    }

    #[test]
    fn test_selected_and_editing_flags() {
        let col = ColumnDef::new("name", "Name", ColumnKind::Text);
        let at = Coordinate::new(2, 0);
        let v = visual_state(&CellValue::from("x"), &col, at, &FocusState::selected(at), None);
        assert!(v.selected && !v.editing);
        let v = visual_state(&CellValue::from("x"), &col, at, &FocusState::editing(at), None);
        assert_eq!(v.state_names(), vec!["selected", "editing"]);
    }

    #[test]
    fn test_popper_flags_only_on_editing_cell() {
        let col = ColumnDef::new("bio", "Bio", ColumnKind::Popper).with_trigger("View Details");
        let at = Coordinate::new(0, 3);
        let open = PopperCellState { button_highlighted: true, popover_open: true, nested_focus: None };

        let v = visual_state(&CellValue::from("bio"), &col, at, &FocusState::editing(at), Some(&open));
        assert_eq!(v.text, "View Details");
        assert!(v.button_highlighted && v.popover_open);

        let other = Coordinate::new(1, 3);
        let v = visual_state(&CellValue::from("bio"), &col, other, &FocusState::editing(at), Some(&open));
        assert!(!v.button_highlighted && !v.popover_open);
    }
}
