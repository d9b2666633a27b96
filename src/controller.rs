//! Grid focus/edit state machine.
//!
//! The outer state is a [`Phase`]. While a cell is being edited the phase owns
//! that cell's [`CellController`], so leaving the editing phase by any path
//! (commit, cancel, navigation, click elsewhere, blur) drops the controller and
//! whatever sub-state it carried. There is never more than one controller and
//! never one for a cell that is not focused.

pub mod router;

use std::fmt;

use tracing::debug;

use crate::editor::disclosure::DisclosureContent;
use crate::editor::{CellController, PopperCellState, PopperStage};
use crate::grid::{CellValue, Grid};
use crate::nav::{Bounds, Coordinate, FocusState};
use crate::render::{visual_state, CellVisual};

/// A saved edit
#[derive(Debug, Clone, PartialEq)]
pub struct CellCommit {
    pub at: Coordinate,
    pub key: String,
    pub old: CellValue,
    pub new: CellValue,
}

/// Receives every successful save
pub trait CommitSink {
    fn committed(&mut self, commit: &CellCommit);
}

impl<F> CommitSink for F
where
    F: FnMut(&CellCommit),
{
    fn committed(&mut self, commit: &CellCommit) {
        self(commit)
    }
}

#[derive(Debug, Clone)]
pub enum Phase {
    /// No cell has focus
    Idle,
    Selected(Coordinate),
    Editing { at: Coordinate, controller: CellController },
}

impl Phase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Selected(_) => "SELECT",
            Phase::Editing { .. } => "EDIT",
        }
    }
}

pub struct GridController {
    grid: Grid,
    phase: Phase,
    sink: Option<Box<dyn CommitSink>>,
}

impl fmt::Debug for GridController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridController")
            .field("grid", &self.grid)
            .field("phase", &self.phase)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl GridController {
    pub fn new(grid: Grid) -> Self {
        Self { grid, phase: Phase::Idle, sink: None }
    }

    pub fn with_sink(mut self, sink: impl CommitSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn focus_state(&self) -> FocusState {
        match &self.phase {
            Phase::Idle => FocusState::idle(),
            Phase::Selected(at) => FocusState::selected(*at),
            Phase::Editing { at, .. } => FocusState::editing(*at),
        }
    }

    pub fn focused(&self) -> Option<Coordinate> {
        self.focus_state().focused
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, Phase::Editing { .. })
    }

    /// Whether a delegated key handler is active
    pub fn has_delegate(&self) -> bool {
        match &self.phase {
            Phase::Editing { controller, .. } => controller.has_delegate(),
            _ => false,
        }
    }

    pub fn popper_state(&self) -> Option<PopperCellState> {
        match &self.phase {
            Phase::Editing { controller, .. } => controller.popper_state(),
            _ => None,
        }
    }

    pub fn popper_stage(&self) -> Option<PopperStage> {
        match &self.phase {
            Phase::Editing { controller: CellController::Disclosure(d), .. } => Some(d.stage()),
            _ => None,
        }
    }

    /// Disclosed content of a popper cell, read from the grid as it is now
    pub fn disclosure_content(&self, at: Coordinate) -> Option<DisclosureContent> {
        let value = self.grid.display_value(at)?;
        Some(DisclosureContent::parse(&value.as_text()))
    }

    /// The open popover's cell and content, if any
    pub fn open_popover(&self) -> Option<(Coordinate, DisclosureContent)> {
        match &self.phase {
            Phase::Editing { at, controller: CellController::Disclosure(d) } if d.is_open() => {
                Some((*at, self.disclosure_content(*at)?))
            }
            _ => None,
        }
    }

    fn nested_bounds(&self) -> Option<Bounds> {
        match &self.phase {
            Phase::Editing { at, controller: CellController::Disclosure(_) } => {
                self.disclosure_content(*at)?.nav_bounds()
            }
            _ => None,
        }
    }

    /// Visual descriptor for one cell, with the live draft layered on top
    pub fn cell_visual(&self, at: Coordinate) -> Option<CellVisual> {
        let value = self.grid.display_value(at)?;
        let column = self.grid.column(at.col)?;
        let focus = self.focus_state();
        let popper = self.popper_state();
        let visual = visual_state(&value, column, at, &focus, popper.as_ref());

        let draft = match &self.phase {
            Phase::Editing { at: editing, controller } if *editing == at => controller.draft_view(),
            _ => None,
        };
        Some(visual.with_draft(draft))
    }

    /// Move focus to `at`, saving any open edit first
    pub fn focus(&mut self, at: Coordinate) -> bool {
        if !self.grid.contains(at) {
            return false;
        }
        self.blur();
        debug!(cell = %at, "focus");
        self.phase = Phase::Selected(at);
        true
    }

    /// Drop focus entirely
    pub fn clear_focus(&mut self) {
        self.blur();
        self.phase = Phase::Idle;
    }

    /// Focus left the editing surface: save a scalar draft and leave edit
    /// mode, keeping the cell focused
    pub fn blur(&mut self) {
        if let Phase::Editing { at, controller } = &self.phase {
            let at = *at;
            let commit = controller.commit();
            self.end_edit(at, commit);
        }
    }

    /// Enter edit mode on the focused cell
    pub fn begin_edit(&mut self) -> bool {
        let Phase::Selected(at) = self.phase else {
            return false;
        };
        let Some(column) = self.grid.column(at.col) else {
            return false;
        };
        if !column.is_editable() {
            debug!(cell = %at, key = %column.key, "column is read-only");
            return false;
        }
        let Some(committed) = self.grid.committed_value(at) else {
            return false;
        };

        let controller = CellController::begin(column, &committed);
        debug!(cell = %at, kind = column.kind.display_name(), "begin edit");
        self.phase = Phase::Editing { at, controller };
        true
    }

    /// Leave edit mode on `at`, storing `commit` if there is one
    fn end_edit(&mut self, at: Coordinate, commit: Option<CellValue>) {
        match commit {
            Some(value) => self.store(at, value),
            None => debug!(cell = %at, "end edit"),
        }
        self.phase = Phase::Selected(at);
    }

    fn store(&mut self, at: Coordinate, value: CellValue) {
        let Some(key) = self.grid.column(at.col).map(|c| c.key.clone()) else {
            return;
        };
        let Some(old) = self.grid.set_value(at, value.clone()) else {
            return;
        };

        debug!(cell = %at, key = %key, old = %old, new = %value, "commit");
        let commit = CellCommit { at, key, old, new: value };
        if let Some(sink) = self.sink.as_mut() {
            sink.committed(&commit);
        }
    }
}
