use super::*;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn arrows_step_one_cell() {
    let b = Bounds::new(3, 3);
    let c = Coordinate::new(1, 1);
    assert_eq!(move_focus(c, NavKey::Up, b), Some(Coordinate::new(0, 1)));
    assert_eq!(move_focus(c, NavKey::Down, b), Some(Coordinate::new(2, 1)));
    assert_eq!(move_focus(c, NavKey::Left, b), Some(Coordinate::new(1, 0)));
    assert_eq!(move_focus(c, NavKey::Right, b), Some(Coordinate::new(1, 2)));
}

#[test]
fn arrows_clamp_without_wrapping() {
    let b = Bounds::new(2, 2);
    assert_eq!(move_focus(Coordinate::new(0, 0), NavKey::Up, b), None);
    assert_eq!(move_focus(Coordinate::new(0, 0), NavKey::Left, b), None);
    assert_eq!(move_focus(Coordinate::new(1, 1), NavKey::Down, b), None);
    assert_eq!(move_focus(Coordinate::new(1, 1), NavKey::Right, b), None);
}

#[test]
fn tab_follows_row_major_order() {
    let b = Bounds::new(3, 2);
    assert_eq!(move_focus(Coordinate::new(0, 1), NavKey::Tab, b), Some(Coordinate::new(1, 0)));
    assert_eq!(move_focus(Coordinate::new(1, 0), NavKey::BackTab, b), Some(Coordinate::new(0, 1)));
}

#[test]
fn tab_stops_at_first_and_last_cell() {
    let b = Bounds::new(3, 2);
    assert_eq!(move_focus(b.last(), NavKey::Tab, b), None);
    assert_eq!(move_focus(Coordinate::ORIGIN, NavKey::BackTab, b), None);
}

#[test]
fn single_cell_grid_never_moves() {
    let b = Bounds::new(1, 1);
    for k in [NavKey::Up, NavKey::Down, NavKey::Left, NavKey::Right, NavKey::Tab, NavKey::BackTab] {
        assert_eq!(move_focus(Coordinate::ORIGIN, k, b), None);
    }
}

#[test]
fn scenario_three_by_two() {
    let b = Bounds::new(3, 2);
    let mut focus = FocusState::selected(Coordinate::ORIGIN);

    focus = focus.navigate(NavKey::Right, b).unwrap();
    assert_eq!(focus.focused, Some(Coordinate::new(0, 1)));
    focus = focus.navigate(NavKey::Tab, b).unwrap();
    assert_eq!(focus.focused, Some(Coordinate::new(1, 0)));
    focus = focus.navigate(NavKey::BackTab, b).unwrap();
    assert_eq!(focus.focused, Some(Coordinate::new(0, 1)));
    assert!(!focus.editing);
}

#[test]
fn navigate_is_blocked_while_editing() {
    let b = Bounds::new(3, 3);
    let focus = FocusState::editing(Coordinate::new(1, 1));
    assert_eq!(focus.navigate(NavKey::Down, b), None);
    assert_eq!(FocusState::idle().navigate(NavKey::Down, b), None);
}

#[test]
fn classify_keys() {
    assert_eq!(NavKey::from_key(key(KeyCode::Up)), Some(NavKey::Up));
    assert_eq!(NavKey::from_key(key(KeyCode::Tab)), Some(NavKey::Tab));
    assert_eq!(NavKey::from_key(key(KeyCode::BackTab)), Some(NavKey::BackTab));
    assert_eq!(
        NavKey::from_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)),
        Some(NavKey::BackTab)
    );
    assert_eq!(NavKey::from_key(KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL)), None);
    assert_eq!(NavKey::from_key(key(KeyCode::Enter)), None);
}

#[test]
fn coordinate_display_uses_letters() {
    assert_eq!(Coordinate::new(0, 0).to_string(), "A1");
    assert_eq!(Coordinate::new(9, 27).to_string(), "AB10");
}

fn nav_key() -> impl Strategy<Value = NavKey> {
    prop_oneof![
        Just(NavKey::Up),
        Just(NavKey::Down),
        Just(NavKey::Left),
        Just(NavKey::Right),
        Just(NavKey::Tab),
        Just(NavKey::BackTab),
    ]
}

proptest! {
    #[test]
    fn focus_never_leaves_bounds(
        rows in 1usize..12,
        cols in 1usize..12,
        keys in proptest::collection::vec(nav_key(), 1..60),
    ) {
        let b = Bounds::new(rows, cols);
        let mut at = Coordinate::ORIGIN;
        for k in keys {
            if let Some(next) = move_focus(at, k, b) {
                prop_assert!(b.contains(next), "{:?} escaped {:?}", next, b);
                prop_assert_ne!(next, at);
                at = next;
            }
        }
    }

    #[test]
    fn tab_then_backtab_returns(rows in 1usize..8, cols in 1usize..8, idx in 0usize..64) {
        let b = Bounds::new(rows, cols);
        let at = Coordinate::from_linear(idx % b.cell_count(), b);
        if let Some(next) = move_focus(at, NavKey::Tab, b) {
            prop_assert_eq!(move_focus(next, NavKey::BackTab, b), Some(at));
        }
    }
}
