//! Key and pointer routing for the grid.
//!
//! Every event is acted on by exactly one party: the editing cell's delegated
//! handler when it claims the key, otherwise the generic navigation/editing
//! rules.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::editor::{EditOutcome, PopperResponse};
use crate::input::{is_escape, KeyResult};
use crate::nav::{move_focus, Bounds, Coordinate, NavKey};

use super::{GridController, Phase};

impl GridController {
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        let Some(bounds) = self.grid.bounds() else {
            return KeyResult::Ignored;
        };

        match self.phase {
            Phase::Idle => KeyResult::Ignored,
            Phase::Selected(at) => self.handle_selected_key(at, key, bounds),
            Phase::Editing { .. } => self.handle_editing_key(key, bounds),
        }
    }

    fn handle_selected_key(&mut self, at: Coordinate, key: KeyEvent, bounds: Bounds) -> KeyResult {
        if key.code == KeyCode::Enter {
            return if self.begin_edit() { KeyResult::Consumed } else { KeyResult::Ignored };
        }
        if is_escape(key) {
            return KeyResult::Ignored;
        }

        let Some(nav) = NavKey::from_key(key) else {
            return KeyResult::Ignored;
        };
        match self.focus_state().navigate(nav, bounds).and_then(|f| f.focused) {
            Some(next) => {
                debug!(from = %at, to = %next, key = ?nav, "move focus");
                self.phase = Phase::Selected(next);
                KeyResult::Consumed
            }
            None => KeyResult::Ignored,
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent, bounds: Bounds) -> KeyResult {
        // read at invocation so the handler always sees the content as it is now
        let nested = self.nested_bounds();

        let Phase::Editing { at, controller } = &mut self.phase else {
            return KeyResult::Ignored;
        };
        let at = *at;

        if let Some(delegate) = controller.delegate() {
            match delegate.handle_key(key, nested) {
                PopperResponse::Consumed => return KeyResult::Consumed,
                PopperResponse::ExitEdit => {
                    self.end_edit(at, None);
                    return KeyResult::Consumed;
                }
                PopperResponse::Ignored => {}
            }
        }

        let outcome = if is_escape(key) {
            controller.on_escape()
        } else if key.code == KeyCode::Enter {
            controller.on_enter()
        } else {
            match NavKey::from_key(key) {
                Some(nav) if nav.is_tab() => controller.on_navigate(nav),
                _ => {
                    return if controller.on_input(key) {
                        KeyResult::Consumed
                    } else {
                        KeyResult::Ignored
                    };
                }
            }
        };

        self.apply_outcome(at, outcome, bounds)
    }

    fn apply_outcome(&mut self, at: Coordinate, outcome: EditOutcome, bounds: Bounds) -> KeyResult {
        match outcome {
            EditOutcome::Stay => KeyResult::Ignored,
            EditOutcome::Commit(value) => {
                self.end_edit(at, Some(value));
                KeyResult::Consumed
            }
            EditOutcome::Cancel => {
                debug!(cell = %at, "edit cancelled");
                self.end_edit(at, None);
                KeyResult::Consumed
            }
            EditOutcome::Advance { commit, key } => {
                self.end_edit(at, commit);
                if let Some(next) = move_focus(at, key, bounds) {
                    debug!(from = %at, to = %next, key = ?key, "advance");
                    self.phase = Phase::Selected(next);
                }
                KeyResult::Consumed
            }
        }
    }

    /// Pointer press on a grid cell.
    ///
    /// A different cell takes focus (saving any open edit). The focused cell
    /// starts editing. The editing popper cell descends one stage per click.
    pub fn click(&mut self, at: Coordinate) -> KeyResult {
        if !self.grid.contains(at) {
            return KeyResult::Ignored;
        }

        if self.focused() != Some(at) {
            self.focus(at);
            return KeyResult::Consumed;
        }

        if let Phase::Editing { controller, .. } = &mut self.phase {
            let descended = controller.delegate().map(|d| d.descend()).unwrap_or(false);
            return if descended { KeyResult::Consumed } else { KeyResult::Ignored };
        }

        if self.begin_edit() { KeyResult::Consumed } else { KeyResult::Ignored }
    }

    /// Pointer press on a cell of the open popover's content
    pub fn click_nested(&mut self, at: Coordinate) -> KeyResult {
        let nested = self.nested_bounds();
        let Phase::Editing { controller, .. } = &mut self.phase else {
            return KeyResult::Ignored;
        };
        let focused = controller
            .delegate()
            .map(|d| d.focus_nested(at, nested))
            .unwrap_or(false);
        if focused { KeyResult::Consumed } else { KeyResult::Ignored }
    }
}
