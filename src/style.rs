use ratatui::style::{Color, Modifier, Style as RatStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::controller::Phase;
use crate::render::CellVisual;

/// Color that can be serialized/deserialized
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// Named color: "red", "blue", "cyan", etc.
    Named(NamedColor),
    /// RGB color: [255, 128, 0]
    Rgb([u8; 3]),
    /// 256-color index: 42
    Indexed(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
    Reset,
}

impl From<ThemeColor> for Color {
    fn from(tc: ThemeColor) -> Color {
        match tc {
            ThemeColor::Named(n) => match n {
                NamedColor::Black => Color::Black,
                NamedColor::Red => Color::Red,
                NamedColor::Green => Color::Green,
                NamedColor::Yellow => Color::Yellow,
                NamedColor::Blue => Color::Blue,
                NamedColor::Magenta => Color::Magenta,
                NamedColor::Cyan => Color::Cyan,
                NamedColor::Gray => Color::Gray,
                NamedColor::DarkGray => Color::DarkGray,
                NamedColor::LightRed => Color::LightRed,
                NamedColor::LightGreen => Color::LightGreen,
                NamedColor::LightYellow => Color::LightYellow,
                NamedColor::LightBlue => Color::LightBlue,
                NamedColor::LightMagenta => Color::LightMagenta,
                NamedColor::LightCyan => Color::LightCyan,
                NamedColor::White => Color::White,
                NamedColor::Reset => Color::Reset,
            },
            ThemeColor::Rgb([r, g, b]) => Color::Rgb(r, g, b),
            ThemeColor::Indexed(i) => Color::Indexed(i),
        }
    }
}

/// Style definition for a single element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<ThemeColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub dim: bool,
}

impl ElementStyle {
    pub fn fg(color: ThemeColor) -> Self {
        Self { fg: Some(color), ..Default::default() }
    }

    pub fn with_bg(mut self, color: ThemeColor) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn to_ratatui(&self) -> RatStyle {
        let mut style = RatStyle::default();
        if let Some(fg) = self.fg {
            style = style.fg(fg.into());
        }
        if let Some(bg) = self.bg {
            style = style.bg(bg.into());
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

/// Complete theme configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    #[serde(default)]
    pub background: Option<ThemeColor>,

    // Grid cells
    pub cell: ElementStyle,
    pub cell_selected: ElementStyle,
    pub cell_editing: ElementStyle,
    pub bool_true: ElementStyle,
    pub bool_false: ElementStyle,

    // Popper cells
    pub button: ElementStyle,
    pub button_highlighted: ElementStyle,
    pub popover: ElementStyle,
    pub popover_title: ElementStyle,
    pub nested_cursor: ElementStyle,

    pub header: ElementStyle,

    // Status bar
    pub status_bar: ElementStyle,
    pub status_phase_idle: ElementStyle,
    pub status_phase_select: ElementStyle,
    pub status_phase_edit: ElementStyle,

    pub message: ElementStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    /// Dark theme with black background
    pub fn dark() -> Self {
        use NamedColor::*;
        Self {
            name: "dark".to_string(),
            background: Some(ThemeColor::Named(Black)),
            cell: ElementStyle::fg(ThemeColor::Named(White)),
            cell_selected: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightCyan))
                .with_bold(),
            cell_editing: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(DarkGray))
                .with_underline(),
            bool_true: ElementStyle::fg(ThemeColor::Named(LightGreen)),
            bool_false: ElementStyle::fg(ThemeColor::Named(LightRed)),
            button: ElementStyle::fg(ThemeColor::Named(LightBlue)).with_underline(),
            button_highlighted: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightYellow))
                .with_bold(),
            popover: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(DarkGray)),
            popover_title: ElementStyle::fg(ThemeColor::Named(LightYellow)).with_bold(),
            nested_cursor: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightMagenta))
                .with_bold(),
            header: ElementStyle::fg(ThemeColor::Named(LightGreen)).with_bold(),
            status_bar: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(DarkGray)),
            status_phase_idle: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(Gray))
                .with_bold(),
            status_phase_select: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightBlue))
                .with_bold(),
            status_phase_edit: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightGreen))
                .with_bold(),
            message: ElementStyle::fg(ThemeColor::Named(White)),
        }
    }

    /// Light theme (default)
    pub fn light() -> Self {
        use NamedColor::*;
        Self {
            name: "light".to_string(),
            background: None, // Use terminal default
            cell: ElementStyle::fg(ThemeColor::Named(Black)),
            cell_selected: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Blue))
                .with_bold(),
            cell_editing: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(LightCyan))
                .with_underline(),
            bool_true: ElementStyle::fg(ThemeColor::Named(Green)),
            bool_false: ElementStyle::fg(ThemeColor::Named(Red)),
            button: ElementStyle::fg(ThemeColor::Named(Blue)).with_underline(),
            button_highlighted: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(Yellow))
                .with_bold(),
            popover: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(White)),
            popover_title: ElementStyle::fg(ThemeColor::Named(Blue)).with_bold(),
            nested_cursor: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Magenta))
                .with_bold(),
            header: ElementStyle::fg(ThemeColor::Named(Blue)).with_bold(),
            status_bar: ElementStyle::fg(ThemeColor::Named(Black))
                .with_bg(ThemeColor::Named(Gray)),
            status_phase_idle: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(DarkGray))
                .with_bold(),
            status_phase_select: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Blue))
                .with_bold(),
            status_phase_edit: ElementStyle::fg(ThemeColor::Named(White))
                .with_bg(ThemeColor::Named(Green))
                .with_bold(),
            message: ElementStyle::fg(ThemeColor::Named(Black)).with_italic(),
        }
    }

    /// Solarized dark theme
    pub fn solarized_dark() -> Self {
        let base03 = ThemeColor::Rgb([0, 43, 54]);
        let base02 = ThemeColor::Rgb([7, 54, 66]);
        let base01 = ThemeColor::Rgb([88, 110, 117]);
        let base0 = ThemeColor::Rgb([131, 148, 150]);
        let base1 = ThemeColor::Rgb([147, 161, 161]);
        let yellow = ThemeColor::Rgb([181, 137, 0]);
        let red = ThemeColor::Rgb([220, 50, 47]);
        let magenta = ThemeColor::Rgb([211, 54, 130]);
        let blue = ThemeColor::Rgb([38, 139, 210]);
        let cyan = ThemeColor::Rgb([42, 161, 152]);
        let green = ThemeColor::Rgb([133, 153, 0]);

        Self {
            name: "solarized-dark".to_string(),
            background: Some(base03),
            cell: ElementStyle::fg(base0),
            cell_selected: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            cell_editing: ElementStyle::fg(base1).with_bg(base02).with_underline(),
            bool_true: ElementStyle::fg(green),
            bool_false: ElementStyle::fg(red),
            button: ElementStyle::fg(cyan).with_underline(),
            button_highlighted: ElementStyle::fg(base03).with_bg(yellow).with_bold(),
            popover: ElementStyle::fg(base1).with_bg(base02),
            popover_title: ElementStyle::fg(yellow).with_bold(),
            nested_cursor: ElementStyle::fg(base03).with_bg(magenta).with_bold(),
            header: ElementStyle::fg(cyan).with_bold(),
            status_bar: ElementStyle::fg(base1).with_bg(base02),
            status_phase_idle: ElementStyle::fg(base03).with_bg(base01).with_bold(),
            status_phase_select: ElementStyle::fg(base03).with_bg(blue).with_bold(),
            status_phase_edit: ElementStyle::fg(base03).with_bg(green).with_bold(),
            message: ElementStyle::fg(base0),
        }
    }

    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;
        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse theme file: {}", e))
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "solarized" | "solarized-dark" => Some(Self::solarized_dark()),
            _ => None,
        }
    }

    /// List available built-in themes
    pub fn builtin_names() -> &'static [&'static str] {
        &["dark", "light", "solarized-dark"]
    }
}

/// Runtime style manager
pub struct Style {
    pub theme: Theme,
}

impl Style {
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    /// Style for a grid cell. Later states override earlier ones.
    pub fn cell(&self, visual: &CellVisual) -> RatStyle {
        let t = &self.theme;
        let mut style = t.cell.to_ratatui();
        style = match visual.flag {
            Some(true) => style.patch(t.bool_true.to_ratatui()),
            Some(false) => style.patch(t.bool_false.to_ratatui()),
            None => style,
        };
        if visual.selected {
            style = style.patch(t.cell_selected.to_ratatui());
        }
        if visual.editing {
            style = style.patch(t.cell_editing.to_ratatui());
        }
        style
    }

    /// Style for the trigger button inside a popper cell
    pub fn button(&self, visual: &CellVisual) -> RatStyle {
        if visual.button_highlighted {
            self.theme.button_highlighted.to_ratatui()
        } else {
            self.theme.button.to_ratatui()
        }
    }

    pub fn popover(&self) -> RatStyle {
        self.theme.popover.to_ratatui()
    }

    pub fn popover_title(&self) -> RatStyle {
        self.theme.popover_title.to_ratatui()
    }

    pub fn nested_cursor(&self) -> RatStyle {
        self.theme.nested_cursor.to_ratatui()
    }

    pub fn header(&self) -> RatStyle {
        self.theme.header.to_ratatui()
    }

    pub fn status_bar(&self) -> RatStyle {
        self.theme.status_bar.to_ratatui()
    }

    pub fn status_phase(&self, phase: &Phase) -> RatStyle {
        match phase {
            Phase::Idle => self.theme.status_phase_idle.to_ratatui(),
            Phase::Selected(_) => self.theme.status_phase_select.to_ratatui(),
            Phase::Editing { .. } => self.theme.status_phase_edit.to_ratatui(),
        }
    }

    pub fn message(&self) -> RatStyle {
        self.theme.message.to_ratatui()
    }

    pub fn background(&self) -> Option<Color> {
        self.theme.background.map(|c| c.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellValue, ColumnDef, ColumnKind};
    use crate::nav::{Coordinate, FocusState};
    use crate::render::visual_state;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_by_name() {
        for name in Theme::builtin_names() {
            assert_eq!(Theme::by_name(name).map(|t| t.name), Some(name.to_string()));
        }
        assert_eq!(Theme::by_name("Solarized").map(|t| t.name), Some("solarized-dark".to_string()));
        assert!(Theme::by_name("neon").is_none());
    }

    #[test]
    fn test_theme_file_round_trip() {
        let theme = Theme::solarized_dark();
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "{}", toml::to_string(&theme).unwrap()).unwrap();
        assert_eq!(Theme::from_file(file.path()).unwrap(), theme);
    }

    #[test]
    fn test_selected_cell_patches_base_style() {
        let style = Style::with_theme(Theme::light());
        let col = ColumnDef::new("active", "Active", ColumnKind::Boolean);
        let at = Coordinate::new(0, 0);

        let plain = visual_state(&CellValue::Boolean(true), &col, at, &FocusState::idle(), None);
        assert_eq!(style.cell(&plain).fg, Some(Color::Green));

        let selected = visual_state(&CellValue::Boolean(true), &col, at, &FocusState::selected(at), None);
        assert_eq!(style.cell(&selected).bg, Some(Color::Blue));
        assert_eq!(style.cell(&selected).fg, Some(Color::White));
    }
}
