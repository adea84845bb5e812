use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, DialogKind};
use crate::preview::PreviewMode;
use crate::widgets::config::ConfigView;
use crate::widgets::editor::EditorView;
use crate::widgets::modal::{DialogView, PromptView};
use crate::widgets::quick_search::QuickSearchView;
use crate::widgets::tabs_panel::TabsPanel;
use crate::widgets::toast::ToastWidget;

const TABS_PANEL_WIDTH: u16 = 24;

impl App {
    /// Main render pass: tab panel, editor/preview zone, status bar, then
    /// overlays from bottom to top (toasts, quick search, config, prompt,
    /// dialog).
    pub fn render(&mut self, f: &mut Frame) {
        let palette = self.themes.palette();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(TABS_PANEL_WIDTH), Constraint::Min(1)])
            .split(rows[0]);

        f.render_widget(TabsPanel::new(&self.tabs, palette), cols[0]);
        self.render_editor_zone(f, cols[1]);

        self.status
            .update(&self.surface, &self.tabs, &self.preview, &mut self.status_bar);
        f.render_widget(self.status_bar.clone(), rows[1]);

        if self.toasts.has_active_toasts() {
            f.render_widget(ToastWidget::new(&self.toasts, palette), f.area());
        }

        if let Some(search) = &self.quick_search {
            f.render_widget(QuickSearchView::new(search, &self.tabs, palette), f.area());
        }

        if self.config.open {
            let conflicts = self.settings.detect_conflicts();
            f.render_widget(
                ConfigView {
                    panel: &self.config,
                    settings: &self.settings,
                    recording: self.recorder.listening(),
                    conflicts: &conflicts,
                    palette,
                    version: env!("CARGO_PKG_VERSION"),
                },
                f.area(),
            );
        }

        if let Some(prompt) = &self.prompt {
            f.render_widget(
                PromptView {
                    title: &prompt.title,
                    input: &prompt.input,
                    palette,
                },
                f.area(),
            );
        }

        if let Some(dialog) = self.current_dialog() {
            f.render_widget(
                DialogView {
                    title: &dialog.title,
                    message: &dialog.message,
                    confirm: matches!(dialog.kind, DialogKind::Confirm(_)),
                    palette,
                },
                f.area(),
            );
        }
    }

    fn render_editor_zone(&mut self, f: &mut Frame, area: Rect) {
        match self.preview.mode() {
            PreviewMode::Off => {
                self.editor_height = area.height;
                f.render_widget(EditorView::new(&self.surface, self.themes.palette()), area);
            }
            PreviewMode::Reading => {
                self.editor_height = area.height;
                self.preview_height = area.height;
                self.render_preview_pane(f, area);
            }
            PreviewMode::Sidebar => {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(area);
                self.editor_height = halves[0].height;
                self.preview_height = halves[1].height;
                f.render_widget(
                    EditorView::new(&self.surface, self.themes.palette()),
                    halves[0],
                );
                self.render_preview_pane(f, halves[1]);
            }
        }
    }

    fn render_preview_pane(&self, f: &mut Frame, area: Rect) {
        let palette = self.themes.palette();
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(palette.border))
            .style(Style::default().bg(palette.bg));

        let paragraph = Paragraph::new(self.preview.rendered().to_vec())
            .block(block)
            .style(Style::default().bg(palette.bg).fg(palette.fg))
            .scroll((self.preview.scroll_row as u16, 0));

        f.render_widget(paragraph, area);
    }
}
