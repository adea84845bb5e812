use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tabs::{QuickSearch, Tab, TabStore};
use crate::theme::Palette;

/// Tab quick-search overlay: a query input over a live-filtered,
/// arrow-navigable result list.
pub struct QuickSearchView<'a> {
    pub state: &'a QuickSearch,
    pub tabs: &'a TabStore,
    pub palette: &'a Palette,
}

impl<'a> QuickSearchView<'a> {
    pub fn new(state: &'a QuickSearch, tabs: &'a TabStore, palette: &'a Palette) -> Self {
        Self {
            state,
            tabs,
            palette,
        }
    }

    fn overlay_rect(&self, result_count: usize, area: Rect) -> Rect {
        let height = (result_count as u16 + 3).min(15);
        let width = 60.min(area.width.saturating_sub(4));

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length((area.height.saturating_sub(height)) / 3),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length((area.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Min(0),
            ])
            .split(vertical[1])[1]
    }
}

impl Widget for QuickSearchView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let results: Vec<&Tab> = self.tabs.search(&self.state.query);
        let overlay = self.overlay_rect(results.len().max(1), area);

        Clear.render(overlay, buf);

        let block = Block::default()
            .title(Span::styled(
                " Search tabs ",
                Style::default()
                    .fg(self.palette.search_fg)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.input_focus))
            .style(Style::default().bg(self.palette.search_bg));

        let inner = block.inner(overlay);
        block.render(overlay, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let input_line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(self.palette.input_focus)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.state.query.clone(),
                Style::default().fg(self.palette.search_fg),
            ),
            Span::styled("█", Style::default().fg(self.palette.input_focus)),
        ]);
        Paragraph::new(input_line)
            .style(Style::default().bg(self.palette.input_bg))
            .render(chunks[0], buf);

        if results.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No matching tabs",
                Style::default().fg(self.palette.muted),
            )))
            .render(chunks[1], buf);
            return;
        }

        let active_id = self.tabs.active_id();
        let lines: Vec<Line> = results
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let selected = i == self.state.selected;
                let row_bg = if selected {
                    self.palette.search_selected
                } else {
                    self.palette.search_bg
                };
                let name_fg = if tab.saved && !tab.has_changes {
                    self.palette.search_fg
                } else {
                    self.palette.tab_unsaved
                };

                let mut spans = vec![Span::styled(
                    format!("  {}", tab.name),
                    Style::default().fg(name_fg).bg(row_bg),
                )];
                if Some(tab.id) == active_id {
                    spans.push(Span::styled(
                        "  (active)",
                        Style::default().fg(self.palette.muted).bg(row_bg),
                    ));
                }
                Line::from(spans).style(Style::default().bg(row_bg))
            })
            .collect();

        Paragraph::new(lines).render(chunks[1], buf);
    }
}
