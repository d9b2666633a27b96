//! Grid navigation: coordinates, bounds and the focus movement rules shared by
//! the outer grid and nested disclosure content.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::util::letters_from_col;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { row: 0, col: 0 };

    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major linear index
    pub fn linear(&self, bounds: Bounds) -> usize {
        self.row * bounds.cols + self.col
    }

    pub fn from_linear(index: usize, bounds: Bounds) -> Self {
        Self { row: index / bounds.cols, col: index % bounds.cols }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", letters_from_col(self.col), self.row + 1)
    }
}

/// Row and column counts of a navigable area. Both are at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub rows: usize,
    pub cols: usize,
}

impl Bounds {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows: rows.max(1), cols: cols.max(1) }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    pub fn last(&self) -> Coordinate {
        Coordinate::new(self.rows - 1, self.cols - 1)
    }

    pub fn clamp(&self, at: Coordinate) -> Coordinate {
        let last = self.last();
        Coordinate::new(at.row.min(last.row), at.col.min(last.col))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Tab,
    BackTab,
}

impl NavKey {
    /// Classify a key event. Modified arrows are left to editors.
    pub fn from_key(key: KeyEvent) -> Option<NavKey> {
        let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Up if plain => Some(NavKey::Up),
            KeyCode::Down if plain => Some(NavKey::Down),
            KeyCode::Left if plain => Some(NavKey::Left),
            KeyCode::Right if plain => Some(NavKey::Right),
            KeyCode::BackTab => Some(NavKey::BackTab),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(NavKey::BackTab),
            KeyCode::Tab => Some(NavKey::Tab),
            _ => None,
        }
    }

    pub fn is_tab(&self) -> bool {
        matches!(self, NavKey::Tab | NavKey::BackTab)
    }
}

/// Compute where `key` moves focus from `current`.
///
/// Arrows clamp at the edges, Tab order follows the row-major index and does
/// not wrap. Returns None when the key would not move focus.
pub fn move_focus(current: Coordinate, key: NavKey, bounds: Bounds) -> Option<Coordinate> {
    let current = bounds.clamp(current);
    let next = match key {
        NavKey::Up => Coordinate::new(current.row.saturating_sub(1), current.col),
        NavKey::Down => Coordinate::new((current.row + 1).min(bounds.rows - 1), current.col),
        NavKey::Left => Coordinate::new(current.row, current.col.saturating_sub(1)),
        NavKey::Right => Coordinate::new(current.row, (current.col + 1).min(bounds.cols - 1)),
        NavKey::Tab => {
            let index = current.linear(bounds) + 1;
            if index >= bounds.cell_count() {
                return None;
            }
            Coordinate::from_linear(index, bounds)
        }
        NavKey::BackTab => {
            let index = current.linear(bounds).checked_sub(1)?;
            Coordinate::from_linear(index, bounds)
        }
    };

    if next == current { None } else { Some(next) }
}

/// Snapshot of which cell has focus and whether it is being edited.
/// `editing` implies `focused.is_some()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusState {
    pub focused: Option<Coordinate>,
    pub editing: bool,
}

impl FocusState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn selected(at: Coordinate) -> Self {
        Self { focused: Some(at), editing: false }
    }

    pub fn editing(at: Coordinate) -> Self {
        Self { focused: Some(at), editing: true }
    }

    pub fn is_focused(&self, at: Coordinate) -> bool {
        self.focused == Some(at)
    }

    pub fn is_editing(&self, at: Coordinate) -> bool {
        self.editing && self.is_focused(at)
    }

    /// Apply a navigation key. Nothing moves while editing; a successful move
    /// always lands in the non-editing state.
    pub fn navigate(&self, key: NavKey, bounds: Bounds) -> Option<FocusState> {
        if self.editing {
            return None;
        }
        let current = self.focused?;
        move_focus(current, key, bounds).map(FocusState::selected)
    }
}

#[cfg(test)]
mod test;
