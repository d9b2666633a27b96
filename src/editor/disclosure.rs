//! Disclosure ("popper") cells.
//!
//! A popper cell hides its value behind a trigger button. Once the cell is
//! focused and editing, Enter walks down through the stages and Escape walks
//! back up:
//!
//! ```text
//! Collapsed -> ButtonHighlighted -> PopoverOpen -> NestedFocused(at)
//! ```
//!
//! Escape at `Collapsed` asks the grid to leave edit mode. While the popover is
//! open every navigation key stays inside it; when the disclosed content has
//! more than one cell those keys move a nested focus with the same rules the
//! outer grid uses.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::input::is_escape;
use crate::nav::{move_focus, Bounds, Coordinate, NavKey};

pub const CELL_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopperStage {
    Collapsed,
    ButtonHighlighted,
    PopoverOpen,
    NestedFocused(Coordinate),
}

impl PopperStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            PopperStage::Collapsed => "COLLAPSED",
            PopperStage::ButtonHighlighted => "BUTTON",
            PopperStage::PopoverOpen => "POPOVER",
            PopperStage::NestedFocused(_) => "DETAILS",
        }
    }
}

/// Flattened view of the stage for renderers.
/// `popover_open` implies `button_highlighted`; `nested_focus` implies `popover_open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopperCellState {
    pub button_highlighted: bool,
    pub popover_open: bool,
    pub nested_focus: Option<Coordinate>,
}

impl From<PopperStage> for PopperCellState {
    fn from(stage: PopperStage) -> Self {
        match stage {
            PopperStage::Collapsed => PopperCellState::default(),
            PopperStage::ButtonHighlighted => PopperCellState {
                button_highlighted: true,
                ..Default::default()
            },
            PopperStage::PopoverOpen => PopperCellState {
                button_highlighted: true,
                popover_open: true,
                nested_focus: None,
            },
            PopperStage::NestedFocused(at) => PopperCellState {
                button_highlighted: true,
                popover_open: true,
                nested_focus: Some(at),
            },
        }
    }
}

/// What the grid should do after offering a key to the popper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopperResponse {
    /// The popper handled the key; the grid must not act on it
    Consumed,
    /// The popper has no use for the key
    Ignored,
    /// Escape at the top stage: leave edit mode
    ExitEdit,
}

/// Content revealed by an open popover, laid out as a small grid.
/// Lines become rows and `|` separates cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureContent {
    rows: Vec<Vec<String>>,
    cols: usize,
}

impl DisclosureContent {
    pub fn parse(text: &str) -> Self {
        let mut rows: Vec<Vec<String>> = text
            .lines()
            .map(|line| line.split(CELL_SEPARATOR).map(|c| c.trim().to_string()).collect())
            .collect();
        if rows.is_empty() {
            rows.push(vec![String::new()]);
        }

        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(1).max(1);
        for row in &mut rows {
            row.resize(cols, String::new());
        }

        Self { rows, cols }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.rows.len(), self.cols)
    }

    /// Plain text notes are a single cell and have nowhere to move
    pub fn is_navigable(&self) -> bool {
        self.bounds().cell_count() > 1
    }

    /// Bounds to navigate within, if any
    pub fn nav_bounds(&self) -> Option<Bounds> {
        if self.is_navigable() { Some(self.bounds()) } else { None }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cell(&self, at: Coordinate) -> Option<&str> {
        self.rows.get(at.row)?.get(at.col).map(|s| s.as_str())
    }
}

/// Popper sub-state machine for the focused, editing disclosure cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureController {
    stage: PopperStage,
}

impl Default for DisclosureController {
    fn default() -> Self {
        Self::new()
    }
}

impl DisclosureController {
    pub fn new() -> Self {
        Self { stage: PopperStage::Collapsed }
    }

    pub fn stage(&self) -> PopperStage {
        self.stage
    }

    pub fn state(&self) -> PopperCellState {
        self.stage.into()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.stage, PopperStage::PopoverOpen | PopperStage::NestedFocused(_))
    }

    fn set_stage(&mut self, stage: PopperStage) {
        debug!(from = ?self.stage, to = ?stage, "popper stage");
        self.stage = stage;
    }

    /// Go one level deeper. Returns false once the popover is open.
    pub fn descend(&mut self) -> bool {
        match self.stage {
            PopperStage::Collapsed => self.set_stage(PopperStage::ButtonHighlighted),
            PopperStage::ButtonHighlighted => self.set_stage(PopperStage::PopoverOpen),
            PopperStage::PopoverOpen | PopperStage::NestedFocused(_) => return false,
        }
        true
    }

    /// Go one level up, or ask to leave edit mode from the top
    pub fn ascend(&mut self) -> PopperResponse {
        match self.stage {
            PopperStage::NestedFocused(_) => self.set_stage(PopperStage::PopoverOpen),
            PopperStage::PopoverOpen => self.set_stage(PopperStage::ButtonHighlighted),
            PopperStage::ButtonHighlighted => self.set_stage(PopperStage::Collapsed),
            PopperStage::Collapsed => return PopperResponse::ExitEdit,
        }
        PopperResponse::Consumed
    }

    /// Focus a nested cell directly (pointer). Only valid while open.
    pub fn focus_nested(&mut self, at: Coordinate, content: Option<Bounds>) -> bool {
        match content {
            Some(bounds) if self.is_open() && bounds.contains(at) => {
                self.set_stage(PopperStage::NestedFocused(at));
                true
            }
            _ => false,
        }
    }

    /// Offer a key to the popper.
    ///
    /// `content` is the current navigable bounds of the disclosed content,
    /// read by the caller at the time of the key press.
    pub fn handle_key(&mut self, key: KeyEvent, content: Option<Bounds>) -> PopperResponse {
        if is_escape(key) {
            return self.ascend();
        }

        if key.code == KeyCode::Enter {
            // open is the deepest keyboard stage; Enter is swallowed there
            self.descend();
            return PopperResponse::Consumed;
        }

        let Some(nav) = NavKey::from_key(key) else {
            return PopperResponse::Ignored;
        };

        match (self.stage, content) {
            (PopperStage::Collapsed | PopperStage::ButtonHighlighted, _) => PopperResponse::Ignored,
            (PopperStage::PopoverOpen, Some(_)) => {
                self.set_stage(PopperStage::NestedFocused(Coordinate::ORIGIN));
                PopperResponse::Consumed
            }
            (PopperStage::NestedFocused(at), Some(bounds)) => {
                if let Some(next) = move_focus(at, nav, bounds) {
                    self.set_stage(PopperStage::NestedFocused(next));
                }
                PopperResponse::Consumed
            }
            (PopperStage::NestedFocused(_), None) => {
                // content stopped being navigable underneath us
                self.set_stage(PopperStage::PopoverOpen);
                PopperResponse::Consumed
            }
            (PopperStage::PopoverOpen, None) => PopperResponse::Consumed,
        }
    }
}
