use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::theme::Palette;

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
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

/// Centered modal dialog: a confirmation (accept/cancel) or a message
/// that only needs acknowledgment. A visible dialog routes all key input.
pub struct DialogView<'a> {
    pub title: &'a str,
    pub message: &'a str,
    /// False renders an acknowledge-only dialog.
    pub confirm: bool,
    pub palette: &'a Palette,
}

impl Widget for DialogView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let width = 56.min(area.width.saturating_sub(4));
        let modal_area = centered_rect(width, 8, area);

        Clear.render(modal_area, buf);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(self.palette.modal_fg)
                    .bg(self.palette.button_primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.modal_border))
            .style(Style::default().bg(self.palette.modal_bg));

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        Paragraph::new(self.message)
            .style(Style::default().fg(self.palette.modal_fg))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let buttons = if self.confirm {
            Line::from(vec![
                Span::styled(
                    " Enter: Accept ",
                    Style::default()
                        .fg(self.palette.modal_bg)
                        .bg(self.palette.button_primary),
                ),
                Span::raw("  "),
                Span::styled(
                    " Esc: Cancel ",
                    Style::default()
                        .fg(self.palette.modal_fg)
                        .bg(self.palette.input_bg),
                ),
            ])
        } else {
            Line::from(Span::styled(
                " Enter: Accept ",
                Style::default()
                    .fg(self.palette.modal_bg)
                    .bg(self.palette.button_primary),
            ))
        };

        Paragraph::new(buttons)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }
}

/// Centered single-line input prompt used for open/save-as paths and
/// renames.
pub struct PromptView<'a> {
    pub title: &'a str,
    pub input: &'a str,
    pub palette: &'a Palette,
}

impl Widget for PromptView<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let width = 70.min(area.width.saturating_sub(4));
        let modal_area = centered_rect(width, 5, area);

        Clear.render(modal_area, buf);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(self.palette.modal_fg)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.input_focus))
            .style(Style::default().bg(self.palette.modal_bg));

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let input_line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(self.palette.input_focus)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.input, Style::default().fg(self.palette.modal_fg)),
            Span::styled("█", Style::default().fg(self.palette.input_focus)),
        ]);

        Paragraph::new(input_line)
            .style(Style::default().bg(self.palette.input_bg))
            .render(
                Rect {
                    height: 1,
                    ..inner
                },
                buf,
            );

        if inner.height > 1 {
            Paragraph::new(Line::from(Span::styled(
                "Enter: accept   Esc: cancel",
                Style::default().fg(self.palette.muted),
            )))
            .alignment(Alignment::Center)
            .render(
                Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                },
                buf,
            );
        }
    }
}
