use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::editor::disclosure::DisclosureContent;
use crate::editor::DraftView;
use crate::grid::ColumnKind;
use crate::nav::Coordinate;
use crate::render::{Align, CellVisual};
use crate::util::{byte_offset, display_width, fit_width};

const MIN_COL_WIDTH: usize = 3;
const MAX_COL_WIDTH: usize = 40;
const CELL_PADDING: u16 = 2;
const POPOVER_TITLE: &str = "Details";

/// Screen areas of the cells drawn last frame, for pointer hit testing
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    cells: Vec<(Rect, Coordinate)>,
    nested: Vec<(Rect, Coordinate)>,
    pub(crate) popover: Option<Rect>,
}

fn rect_contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

impl HitMap {
    /// Grid cell under the pointer
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Coordinate> {
        self.cells.iter().find(|(r, _)| rect_contains(*r, x, y)).map(|(_, at)| *at)
    }

    /// Popover content cell under the pointer. Checked before `cell_at`
    /// since the popover is drawn over the grid.
    pub fn nested_at(&self, x: u16, y: u16) -> Option<Coordinate> {
        self.nested.iter().find(|(r, _)| rect_contains(*r, x, y)).map(|(_, at)| *at)
    }

    /// Whether the pointer is over the open popover, content or frame
    pub fn in_popover(&self, x: u16, y: u16) -> bool {
        self.popover.is_some_and(|r| rect_contains(r, x, y))
    }

    fn cell_rect(&self, at: Coordinate) -> Option<Rect> {
        self.cells.iter().find(|(_, c)| *c == at).map(|(r, _)| *r)
    }
}

pub fn render(frame: &mut Frame, app: &App) -> HitMap {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    if let Some(bg) = app.style.background() {
        frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.size());
    }

    let mut hits = HitMap::default();
    render_grid(frame, app, chunks[0], &mut hits);
    render_popover(frame, app, &mut hits);
    render_status_bar(frame, app, chunks[1]);
    render_message_line(frame, app, chunks[2]);
    hits
}

/// Width needed by each column: header, every displayed value and the live draft
fn column_widths(app: &App) -> Vec<usize> {
    let grid = app.controller.grid();
    grid.columns()
        .iter()
        .enumerate()
        .map(|(col, column)| {
            let header = display_width(&column.header);
            let content = (0..grid.row_count())
                .filter_map(|row| app.controller.cell_visual(Coordinate::new(row, col)))
                .map(|v| match (&v.draft, v.kind) {
                    (Some(d), _) => display_width(&d.text) + 1,
                    (None, ColumnKind::Popper) => display_width(&v.text) + 2,
                    (None, _) => display_width(&v.text),
                })
                .max()
                .unwrap_or(0);
            header.max(content).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect()
}

/// First index that keeps `focus` inside a window of `fits` entries
fn scroll_offset(focus: usize, fits: usize) -> usize {
    focus.saturating_sub(fits.saturating_sub(1))
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect, hits: &mut HitMap) {
    let title = if app.file_name.is_empty() { "[No File]".to_string() } else { app.file_name.clone() };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let grid = app.controller.grid();
    if grid.is_empty() || inner.height < 2 {
        return;
    }

    let widths = column_widths(app);
    let focus = app.controller.focused().unwrap_or(Coordinate::ORIGIN);

    // vertical: rows below the header line
    let visible_rows = (inner.height - 1) as usize;
    let row_offset = scroll_offset(focus.row, visible_rows);

    // horizontal: drop leading columns until the focused one fits
    let mut col_offset = 0;
    while col_offset < focus.col {
        let span: usize = widths[col_offset..=focus.col]
            .iter()
            .map(|w| w + CELL_PADDING as usize)
            .sum();
        if span <= inner.width as usize {
            break;
        }
        col_offset += 1;
    }

    let mut x = inner.x;
    for (col, width) in widths.iter().enumerate().skip(col_offset) {
        let right = inner.x + inner.width;
        if x >= right {
            break;
        }
        let w = (*width as u16 + CELL_PADDING).min(right - x);

        let header = grid.column(col).map(|c| c.header.as_str()).unwrap_or("");
        let header_rect = Rect::new(x, inner.y, w, 1);
        frame.render_widget(
            Paragraph::new(fit_width(header, w.saturating_sub(1) as usize)).style(app.style.header()),
            header_rect,
        );

        for row in row_offset..grid.row_count().min(row_offset + visible_rows) {
            let at = Coordinate::new(row, col);
            let Some(visual) = app.controller.cell_visual(at) else {
                continue;
            };
            let y = inner.y + 1 + (row - row_offset) as u16;
            let rect = Rect::new(x, y, w, 1);
            render_cell(frame, app, &visual, rect);
            hits.cells.push((rect, at));
        }

        x += w;
    }
}

fn render_cell(frame: &mut Frame, app: &App, visual: &CellVisual, rect: Rect) {
    let base = app.style.cell(visual);
    // one column of padding on each side
    let text_width = rect.width.saturating_sub(CELL_PADDING) as usize;
    let inner = Rect::new(rect.x + 1, rect.y, rect.width.saturating_sub(CELL_PADDING), 1);
    frame.render_widget(Paragraph::new("").style(base), rect);

    let line = match (&visual.draft, visual.kind) {
        (Some(draft), _) => draft_line(draft, base, text_width),
        (None, ColumnKind::Popper) => {
            let label = fit_width(&visual.text, text_width.saturating_sub(2));
            Line::from(vec![
                Span::styled("[", base),
                Span::styled(label, app.style.button(visual)),
                Span::styled("]", base),
            ])
        }
        (None, _) => Line::from(Span::styled(fit_width(&visual.text, text_width), base)),
    };

    let alignment = match (visual.draft.is_some(), visual.align) {
        // drafts are always edited left to right
        (true, _) | (false, Align::Left) => Alignment::Left,
        (false, Align::Center) => Alignment::Center,
        (false, Align::Right) => Alignment::Right,
    };
    frame.render_widget(Paragraph::new(line).alignment(alignment).style(base), inner);
}

/// Draft text with a block cursor. Drafts without a caret are shown plainly.
fn draft_line(draft: &DraftView, base: Style, width: usize) -> Line<'static> {
    let Some(cursor) = draft.cursor else {
        return Line::from(Span::styled(fit_width(&draft.text, width), base));
    };

    let split = byte_offset(&draft.text, cursor);
    let (before, rest) = draft.text.split_at(split);
    let mut rest_chars = rest.chars();
    let under = rest_chars.next().map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = rest_chars.collect();

    let cursor_style = base.add_modifier(Modifier::REVERSED);
    Line::from(vec![
        Span::styled(before.to_string(), base),
        Span::styled(under, cursor_style),
        Span::styled(after, base),
    ])
}

fn render_popover(frame: &mut Frame, app: &App, hits: &mut HitMap) {
    let Some((at, content)) = app.controller.open_popover() else {
        return;
    };
    let nested_focus = app.controller.popper_state().and_then(|s| s.nested_focus);

    let screen = frame.size();
    let col_widths = content_widths(&content);
    let body_width: usize = col_widths.iter().sum::<usize>() + col_widths.len().saturating_sub(1) * 3;
    let width = (body_width.max(POPOVER_TITLE.len()) as u16 + 4).min(screen.width);
    let height = (content.rows().len() as u16 + 2).min(screen.height);

    // below the cell when there is room, else above it
    let anchor = hits.cell_rect(at).unwrap_or(Rect::new(screen.width / 4, screen.height / 4, 0, 1));
    let x = anchor.x.min(screen.width.saturating_sub(width));
    let y = if anchor.y + 1 + height <= screen.height {
        anchor.y + 1
    } else {
        anchor.y.saturating_sub(height)
    };
    let overlay = Rect::new(x, y, width, height);
    hits.popover = Some(overlay);

    frame.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(POPOVER_TITLE, app.style.popover_title()))
        .style(app.style.popover());
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let navigable = content.is_navigable();
    for (r, row) in content.rows().iter().enumerate() {
        let y = inner.y + r as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let mut x = inner.x + 1;
        for (c, text) in row.iter().enumerate() {
            let right = inner.x + inner.width;
            if x >= right {
                break;
            }
            let w = (col_widths[c] as u16).min(right - x);
            let cell = Coordinate::new(r, c);
            let style = if nested_focus == Some(cell) {
                app.style.nested_cursor()
            } else {
                app.style.popover()
            };
            let rect = Rect::new(x, y, w, 1);
            frame.render_widget(Paragraph::new(fit_width(text, w as usize)).style(style), rect);
            if navigable {
                hits.nested.push((rect, cell));
            }
            if c + 1 < row.len() && x + w + 1 < right {
                frame.render_widget(
                    Paragraph::new("|").style(app.style.popover()),
                    Rect::new(x + w + 1, y, 1, 1),
                );
            }
            x += w + 3;
        }
    }
}

fn content_widths(content: &DisclosureContent) -> Vec<usize> {
    let cols = content.rows().first().map(|r| r.len()).unwrap_or(1);
    (0..cols)
        .map(|c| {
            content
                .rows()
                .iter()
                .filter_map(|r| r.get(c))
                .map(|s| display_width(s))
                .max()
                .unwrap_or(0)
                .clamp(1, MAX_COL_WIDTH)
        })
        .collect()
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let controller = &app.controller;
    let phase = controller.phase();

    let label = match controller.popper_stage() {
        Some(stage) => format!(" {}:{} ", phase.display_name(), stage.display_name()),
        None => format!(" {} ", phase.display_name()),
    };

    let position = controller
        .focused()
        .map(|at| {
            let column = controller
                .grid()
                .column(at.col)
                .map(|c| format!("{} ({})", c.header, c.kind.display_name()))
                .unwrap_or_default();
            let states = controller
                .cell_visual(at)
                .map(|v| v.state_names().join(","))
                .unwrap_or_default();
            format!("{} {} [{}]", at, column, states)
        })
        .unwrap_or_default();

    let commits = match app.commits.len() {
        0 => String::new(),
        1 => "1 edit ".to_string(),
        n => format!("{} edits ", n),
    };

    let used = display_width(&label) + display_width(&position) + display_width(&commits) + 1;
    let status = Line::from(vec![
        Span::styled(label, app.style.status_phase(phase)),
        Span::raw(" "),
        Span::raw(position),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::raw(commits),
    ]);

    frame.render_widget(Paragraph::new(status).style(app.style.status_bar()), area);
}

fn render_message_line(frame: &mut Frame, app: &App, area: Rect) {
    let content = app.message.clone().unwrap_or_default();
    frame.render_widget(Paragraph::new(content).style(app.style.message()), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(5, 0), 5);
    }

    #[test]
    fn test_hit_map_lookup() {
        let hits = HitMap {
            cells: vec![
                (Rect::new(1, 2, 5, 1), Coordinate::new(0, 0)),
                (Rect::new(6, 2, 4, 1), Coordinate::new(0, 1)),
            ],
            nested: vec![(Rect::new(3, 3, 2, 1), Coordinate::new(1, 0))],
            popover: Some(Rect::new(2, 3, 6, 3)),
        };
        assert_eq!(hits.cell_at(1, 2), Some(Coordinate::new(0, 0)));
        assert_eq!(hits.cell_at(5, 2), Some(Coordinate::new(0, 0)));
        assert_eq!(hits.cell_at(6, 2), Some(Coordinate::new(0, 1)));
        assert_eq!(hits.cell_at(10, 2), None);
        assert_eq!(hits.cell_at(2, 3), None);
        assert_eq!(hits.nested_at(4, 3), Some(Coordinate::new(1, 0)));
        assert_eq!(hits.cell_rect(Coordinate::new(0, 1)), Some(Rect::new(6, 2, 4, 1)));
        assert!(hits.in_popover(2, 3));
        assert!(hits.in_popover(7, 5));
        assert!(!hits.in_popover(8, 3));
        assert!(!HitMap::default().in_popover(2, 3));
    }

    #[test]
    fn test_draft_line_cursor() {
        let draft = DraftView { text: "abc".to_string(), cursor: Some(1) };
        let line = draft_line(&draft, Style::default(), 10);
        let parts: Vec<String> = line.spans.iter().map(|s| s.content.to_string()).collect();
        assert_eq!(parts, vec!["a", "b", "c"]);

        let end = DraftView { text: "ab".to_string(), cursor: Some(2) };
        let parts: Vec<String> = draft_line(&end, Style::default(), 10)
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(parts, vec!["ab", " ", ""]);
    }
}
