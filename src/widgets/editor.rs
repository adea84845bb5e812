use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::editor::EditSurface;
use crate::theme::Palette;

/// Renders the shared edit surface: line-number gutter, visible window of
/// lines, caret cell highlighted by inverting its style.
pub struct EditorView<'a> {
    pub surface: &'a EditSurface,
    pub palette: &'a Palette,
    pub show_line_numbers: bool,
}

impl<'a> EditorView<'a> {
    pub fn new(surface: &'a EditSurface, palette: &'a Palette) -> Self {
        Self {
            surface,
            palette,
            show_line_numbers: true,
        }
    }
}

impl Widget for EditorView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let start_row = self.surface.scroll_row;
        let end_row = (start_row + area.height as usize).min(self.surface.line_count());
        let gutter_width = if self.show_line_numbers {
            self.surface.line_number_width()
        } else {
            0
        };
        let (cursor_row, cursor_col) = self.surface.cursor;

        let base = Style::default().fg(self.palette.fg).bg(self.palette.bg);
        let gutter = Style::default().fg(self.palette.muted).bg(self.palette.bg);
        let caret = base.add_modifier(Modifier::REVERSED);

        let mut lines: Vec<Line> = Vec::with_capacity(end_row - start_row);
        for row in start_row..end_row {
            let text = &self.surface.lines()[row];
            let mut spans: Vec<Span> = Vec::new();

            if gutter_width > 0 {
                spans.push(Span::styled(
                    format!("{:>width$} ", row + 1, width = gutter_width - 1),
                    gutter,
                ));
            }

            if row == cursor_row {
                let chars: Vec<char> = text.chars().collect();
                let col = cursor_col.min(chars.len());
                let before: String = chars[..col].iter().collect();
                if !before.is_empty() {
                    spans.push(Span::styled(before, base));
                }
                if col < chars.len() {
                    spans.push(Span::styled(chars[col].to_string(), caret));
                    let after: String = chars[col + 1..].iter().collect();
                    if !after.is_empty() {
                        spans.push(Span::styled(after, base));
                    }
                } else {
                    spans.push(Span::styled(" ", caret));
                }
            } else {
                spans.push(Span::styled(text.clone(), base));
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .style(Style::default().bg(self.palette.bg))
            .render(area, buf);
    }
}
