use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tabs::{SortOrder, TabStore};
use crate::theme::Palette;

/// Side panel listing tabs in sorted order: index number, name colored by
/// saved state, active row highlighted.
pub struct TabsPanel<'a> {
    pub tabs: &'a TabStore,
    pub palette: &'a Palette,
}

impl<'a> TabsPanel<'a> {
    pub fn new(tabs: &'a TabStore, palette: &'a Palette) -> Self {
        Self { tabs, palette }
    }
}

impl Widget for TabsPanel<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let sort_label = match self.tabs.sort_order() {
            SortOrder::Ascending => "Sort ↑",
            SortOrder::Descending => "Sort ↓",
        };

        let block = Block::default()
            .title(Span::styled(
                format!(" Tabs · {} ", sort_label),
                Style::default().fg(self.palette.panel_fg),
            ))
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(self.palette.border))
            .style(Style::default().bg(self.palette.tab_bg));

        let inner = block.inner(area);
        block.render(area, buf);

        let active_id = self.tabs.active_id();
        let mut lines: Vec<Line> = Vec::new();

        for (index, tab) in self.tabs.sorted().iter().enumerate() {
            if index as u16 >= inner.height {
                break;
            }
            let is_active = Some(tab.id) == active_id;
            let row_bg = if is_active {
                self.palette.tab_active
            } else {
                self.palette.tab_bg
            };
            let name_fg = if tab.saved && !tab.has_changes {
                self.palette.tab_fg
            } else {
                self.palette.tab_unsaved
            };

            let mut name_style = Style::default().fg(name_fg).bg(row_bg);
            if is_active {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }

            let mut name = tab.name.clone();
            let budget = (inner.width as usize).saturating_sub(4);
            if name.chars().count() > budget {
                name = name.chars().take(budget.saturating_sub(1)).collect();
                name.push('…');
            }

            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:>2} ", index + 1),
                    Style::default().fg(self.palette.muted).bg(row_bg),
                ),
                Span::styled(format!("{:<width$}", name, width = budget), name_style),
            ]));
        }

        Paragraph::new(lines)
            .style(Style::default().bg(self.palette.tab_bg))
            .render(inner, buf);
    }
}
