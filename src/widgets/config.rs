use std::collections::HashSet;

use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::settings::{Action, SettingsManager};
use crate::theme::{Palette, ThemeManager};
use crate::update::ReleaseInfo;

/// Font choices offered by the appearance section.
pub const FONT_FAMILIES: [&str; 5] = [
    "Consolas",
    "Fira Code",
    "Source Code Pro",
    "JetBrains Mono",
    "MesloLGS NF",
];

/// One selectable row of the config panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRow {
    Shortcut(Action),
    Theme,
    FontFamily,
    FontSize,
    Update,
    Reset,
    Save,
}

/// Settings overlay state. While open, the global shortcut dispatcher is
/// suspended and all key input routes here.
pub struct ConfigPanel {
    pub open: bool,
    pub selected: usize,
    /// Text buffer for the font size field.
    pub font_size_input: String,
    pub update_status: String,
    pub pending_update: Option<ReleaseInfo>,
    pub checking_update: bool,
}

impl ConfigPanel {
    pub fn new() -> Self {
        Self {
            open: false,
            selected: 0,
            font_size_input: String::new(),
            update_status: String::new(),
            pending_update: None,
            checking_update: false,
        }
    }

    pub fn rows() -> Vec<ConfigRow> {
        let mut rows: Vec<ConfigRow> = Action::ALL.iter().copied().map(ConfigRow::Shortcut).collect();
        rows.extend([
            ConfigRow::Theme,
            ConfigRow::FontFamily,
            ConfigRow::FontSize,
            ConfigRow::Update,
            ConfigRow::Reset,
            ConfigRow::Save,
        ]);
        rows
    }

    pub fn selected_row(&self) -> ConfigRow {
        let rows = Self::rows();
        rows[self.selected.min(rows.len() - 1)]
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = Self::rows().len() as i32;
        let mut index = self.selected as i32 + delta;
        if index < 0 {
            index = len - 1;
        } else if index >= len {
            index = 0;
        }
        self.selected = index as usize;
    }

    /// Populate transient fields and reset the update section.
    pub fn show(&mut self, settings: &SettingsManager) {
        self.open = true;
        self.selected = 0;
        self.font_size_input = settings.font_size().to_string();
        self.reset_update_ui();
    }

    pub fn hide(&mut self) {
        self.open = false;
    }

    pub fn reset_update_ui(&mut self) {
        self.update_status.clear();
        self.pending_update = None;
        self.checking_update = false;
    }
}

impl Default for ConfigPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the config panel overlay.
pub struct ConfigView<'a> {
    pub panel: &'a ConfigPanel,
    pub settings: &'a SettingsManager,
    pub recording: Option<Action>,
    pub conflicts: &'a HashSet<Action>,
    pub palette: &'a Palette,
    pub version: &'a str,
}

impl ConfigView<'_> {
    fn section_title(&self, text: &str) -> Line<'static> {
        Line::from(Span::styled(
            text.to_string(),
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn row_line(&self, row: ConfigRow, selected: bool) -> Line<'static> {
        let row_bg = if selected {
            self.palette.search_selected
        } else {
            self.palette.modal_bg
        };
        let label_style = Style::default().fg(self.palette.modal_fg).bg(row_bg);
        let value_style = Style::default().fg(self.palette.modal_secondary).bg(row_bg);

        let (label, value, marker) = match row {
            ConfigRow::Shortcut(action) => {
                let value = if self.recording == Some(action) {
                    "Press the keys...".to_string()
                } else {
                    self.settings
                        .shortcut(action)
                        .map(|b| b.display())
                        .unwrap_or_else(|| "Unbound".to_string())
                };
                let marker = if self.conflicts.contains(&action) {
                    " conflict"
                } else {
                    ""
                };
                (action.label().to_string(), value, marker)
            }
            ConfigRow::Theme => (
                "Theme".to_string(),
                ThemeManager::get(self.settings.theme()).name.to_string(),
                "",
            ),
            ConfigRow::FontFamily => (
                "Font".to_string(),
                self.settings.font_family().to_string(),
                "",
            ),
            ConfigRow::FontSize => (
                "Font size".to_string(),
                self.panel.font_size_input.clone(),
                "",
            ),
            ConfigRow::Update => {
                let value = if self.panel.checking_update {
                    "Checking...".to_string()
                } else if self.panel.pending_update.is_some() {
                    "Update".to_string()
                } else {
                    "Check for updates".to_string()
                };
                ("Updates".to_string(), value, "")
            }
            ConfigRow::Reset => ("Restore defaults".to_string(), String::new(), ""),
            ConfigRow::Save => ("Save".to_string(), String::new(), ""),
        };

        let mut spans = vec![
            Span::styled(format!("  {:<18}", label), label_style),
            Span::styled(value, value_style),
        ];
        if !marker.is_empty() {
            spans.push(Span::styled(
                marker.to_string(),
                Style::default()
                    .fg(self.palette.tab_unsaved)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans).style(Style::default().bg(row_bg))
    }
}

impl Widget for ConfigView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let width = 72.min(area.width.saturating_sub(4));
        let height = 26.min(area.height.saturating_sub(2));

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((area.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);
        let overlay = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((area.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Min(0),
            ])
            .split(vertical[1])[1];

        Clear.render(overlay, buf);

        let block = Block::default()
            .title(Span::styled(
                " Settings ",
                Style::default()
                    .fg(self.palette.modal_fg)
                    .bg(self.palette.button_primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.modal_border))
            .style(Style::default().bg(self.palette.modal_bg));

        let inner = block.inner(overlay);
        block.render(overlay, buf);

        let rows = ConfigPanel::rows();
        let mut lines: Vec<Line> = Vec::new();

        lines.push(self.section_title("Keyboard shortcuts"));
        for (i, row) in rows.iter().enumerate() {
            if matches!(row, ConfigRow::Shortcut(_)) {
                lines.push(self.row_line(*row, i == self.panel.selected));
            }
        }

        lines.push(Line::default());
        lines.push(self.section_title("Appearance"));
        for (i, row) in rows.iter().enumerate() {
            if matches!(
                row,
                ConfigRow::Theme | ConfigRow::FontFamily | ConfigRow::FontSize
            ) {
                lines.push(self.row_line(*row, i == self.panel.selected));
            }
        }

        lines.push(Line::default());
        lines.push(self.section_title("Updates"));
        for (i, row) in rows.iter().enumerate() {
            if matches!(row, ConfigRow::Update) {
                lines.push(self.row_line(*row, i == self.panel.selected));
            }
        }
        if !self.panel.update_status.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {}", self.panel.update_status),
                Style::default().fg(self.palette.modal_secondary),
            )));
        }

        lines.push(Line::default());
        lines.push(self.section_title("About"));
        lines.push(Line::from(Span::styled(
            format!("  Version {}", self.version),
            Style::default().fg(self.palette.modal_secondary),
        )));

        lines.push(Line::default());
        for (i, row) in rows.iter().enumerate() {
            if matches!(row, ConfigRow::Reset | ConfigRow::Save) {
                lines.push(self.row_line(*row, i == self.panel.selected));
            }
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "  ↑/↓ select   Enter activate   Esc close",
            Style::default().fg(self.palette.muted),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
