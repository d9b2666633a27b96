use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use crate::config::AppConfig;
use crate::controller::{CellCommit, CommitSink, GridController};
use crate::grid::format::display_text;
use crate::grid::Grid;
use crate::input::{is_press, is_quit, KeyResult};
use crate::nav::{Coordinate, NavKey};
use crate::style::Style;
use crate::ui::{self, HitMap};

/// Shared, append-only record of saved edits
#[derive(Clone, Default)]
pub struct CommitLog {
    commits: Rc<RefCell<Vec<CellCommit>>>,
}

impl CommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commits.borrow().len()
    }

    pub fn last(&self) -> Option<CellCommit> {
        self.commits.borrow().last().cloned()
    }
}

impl CommitSink for CommitLog {
    fn committed(&mut self, commit: &CellCommit) {
        self.commits.borrow_mut().push(commit.clone());
    }
}

pub struct App {
    pub controller: GridController,
    pub style: Style,
    pub config: AppConfig,
    pub commits: CommitLog,
    pub file_name: String,
    pub message: Option<String>,
    pub should_quit: bool,
    hits: HitMap,
    seen_commits: usize,
}

impl App {
    pub fn new(grid: Grid, file_name: String, style: Style, config: AppConfig) -> Self {
        let commits = CommitLog::new();
        let mut controller = GridController::new(grid).with_sink(commits.clone());
        if config.focus_on_start {
            controller.focus(Coordinate::ORIGIN);
        }

        Self {
            controller,
            style,
            config,
            commits,
            file_name,
            message: None,
            should_quit: false,
            hits: HitMap::default(),
            seen_commits: 0,
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            let mut hits = HitMap::default();
            terminal.draw(|f| hits = ui::render(f, self))?;
            self.hits = hits;

            if poll(Duration::from_millis(16))? {
                let event = event::read()?;
                self.handle_event(event);
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if is_press(key) => self.handle_key(key),
            Event::Mouse(mouse) if self.config.mouse => self.handle_mouse(mouse),
            Event::FocusLost => {
                debug!("terminal lost focus");
                self.controller.blur();
            }
            _ => {}
        }
        self.note_commit();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if is_quit(key) {
            self.should_quit = true;
            return;
        }
        self.message = None;

        // Host convenience: the router ignores keys with nothing focused, so
        // the first navigation key lands on the first cell here instead.
        if self.controller.focused().is_none() && NavKey::from_key(key).is_some() {
            self.controller.focus(Coordinate::ORIGIN);
            return;
        }

        if self.controller.handle_key(key) == KeyResult::Ignored {
            debug!(key = ?key.code, phase = self.controller.phase().display_name(), "key ignored");
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);

        let result = if let Some(at) = self.hits.nested_at(x, y) {
            self.controller.click_nested(at)
        } else if self.hits.in_popover(x, y) {
            // over the popover frame or plain content; never the grid beneath
            KeyResult::Consumed
        } else if let Some(at) = self.hits.cell_at(x, y) {
            self.controller.click(at)
        } else {
            // pointer outside the grid
            self.controller.clear_focus();
            KeyResult::Consumed
        };
        debug!(x, y, consumed = result.is_consumed(), "click");
    }

    /// Surface the latest save in the message line
    fn note_commit(&mut self) {
        if self.commits.len() == self.seen_commits {
            return;
        }
        self.seen_commits = self.commits.len();
        if let Some(commit) = self.commits.last() {
            let shown = self
                .controller
                .grid()
                .column(commit.at.col)
                .map(|c| display_text(&commit.new, c))
                .unwrap_or_else(|| commit.new.to_string());
            self.message = Some(format!("Saved {}: {}", commit.at, shown));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use crate::grid::{CellValue, ColumnDef, ColumnKind, NumberFormat, Row};
    use crate::editor::PopperStage;
    use crate::style::Theme;
    use ratatui::backend::TestBackend;

    fn app(focus_on_start: bool) -> App {
        let columns = vec![
            ColumnDef::new("name", "Name", ColumnKind::Text),
            ColumnDef::new("pay", "Pay", ColumnKind::Number).with_format(NumberFormat::Currency),
        ];
        let rows = vec![Row::from([
            ("name".to_string(), CellValue::from("Ada")),
            ("pay".to_string(), CellValue::from(10.0)),
        ])];
        let config = AppConfig { focus_on_start, ..AppConfig::default() };
        App::new(Grid::new(columns, rows), String::new(), Style::with_theme(Theme::light()), config)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_focus_on_start() {
        assert_eq!(app(true).controller.focused(), Some(Coordinate::ORIGIN));
        assert_eq!(app(false).controller.focused(), None);
    }

    #[test]
    fn test_first_nav_key_focuses_origin() {
        let mut app = app(false);
        app.handle_event(key(KeyCode::Right));
        assert_eq!(app.controller.focused(), Some(Coordinate::ORIGIN));
    }

    #[test]
    fn test_commit_shows_message() {
        let mut app = app(true);
        for e in [key(KeyCode::Right), key(KeyCode::Enter), key(KeyCode::Char('5')), key(KeyCode::Enter)] {
            app.handle_event(e);
        }
        assert_eq!(app.commits.len(), 1);
        assert_eq!(app.message.as_deref(), Some("Saved B1: $105.00"));
    }

    #[test]
    fn test_focus_lost_blurs() {
        let mut app = app(true);
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Char('!')));
        app.handle_event(Event::FocusLost);
        assert!(!app.controller.is_editing());
        assert_eq!(app.commits.last().map(|c| c.new), Some(CellValue::from("Ada!")));
    }

    fn draw(app: &mut App) -> ratatui::buffer::Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut hits = HitMap::default();
        let frame = terminal.draw(|f| hits = ui::render(f, app)).unwrap();
        let buffer = frame.buffer.clone();
        app.hits = hits;
        buffer
    }

    fn click(x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_click_on_popover_text_keeps_it_open() {
        let columns = vec![
            ColumnDef::new("notes", "Notes", ColumnKind::Popper),
            ColumnDef::new("name", "Name", ColumnKind::Text),
        ];
        let rows = (0..4)
            .map(|i| {
                Row::from([
                    ("notes".to_string(), CellValue::from("Just a plain note")),
                    ("name".to_string(), CellValue::from(format!("row {}", i))),
                ])
            })
            .collect();
        let mut app = App::new(
            Grid::new(columns, rows),
            String::new(),
            Style::with_theme(Theme::light()),
            AppConfig::default(),
        );
        for _ in 0..3 {
            app.handle_event(key(KeyCode::Enter));
        }
        assert_eq!(app.controller.popper_stage(), Some(PopperStage::PopoverOpen));

        draw(&mut app);
        let overlay = app.hits.popover.unwrap();
        let (x, y) = (overlay.x + 2, overlay.y + 1);
        assert!(app.hits.cell_at(x, y).is_some());
        assert_eq!(app.hits.nested_at(x, y), None);

        app.handle_event(click(x, y));
        assert_eq!(app.controller.focused(), Some(Coordinate::ORIGIN));
        assert_eq!(app.controller.popper_stage(), Some(PopperStage::PopoverOpen));

        // the frame border too
        app.handle_event(click(overlay.x, overlay.y));
        assert_eq!(app.controller.popper_stage(), Some(PopperStage::PopoverOpen));
    }

    #[test]
    fn test_status_bar_edit_count_right_aligned() {
        let columns = vec![ColumnDef::new("name", "Prénom ✓", ColumnKind::Text)];
        let rows = vec![Row::from([("name".to_string(), CellValue::from("Zoë"))])];
        let mut app = App::new(
            Grid::new(columns, rows),
            String::new(),
            Style::with_theme(Theme::light()),
            AppConfig::default(),
        );
        for e in [key(KeyCode::Enter), key(KeyCode::Char('!')), key(KeyCode::Enter)] {
            app.handle_event(e);
        }
        assert_eq!(app.commits.len(), 1);

        let buffer = draw(&mut app);
        let status_row = 18;
        let tail: String = (53..60).map(|x| buffer.get(x, status_row).symbol().to_string()).collect();
        assert_eq!(tail, "1 edit ");
    }

    #[test]
    fn test_quit_key() {
        let mut app = app(true);
        app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(app.should_quit);
    }
}
