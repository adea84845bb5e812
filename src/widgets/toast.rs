use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use std::time::{Duration, Instant};

use crate::theme::Palette;

/// Kind of toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastType {
    fn color(&self, palette: &Palette) -> Color {
        match self {
            ToastType::Info => palette.input_focus,
            ToastType::Success => palette.accent,
            ToastType::Warning => Color::Yellow,
            ToastType::Error => palette.tab_unsaved,
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            ToastType::Info => "ℹ",
            ToastType::Success => "✓",
            ToastType::Warning => "⚠",
            ToastType::Error => "✗",
        }
    }
}

/// A single transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: String, toast_type: ToastType) -> Self {
        Self {
            message,
            toast_type,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }

    /// 0.0 = just created, 1.0 = expired.
    pub fn progress(&self) -> f32 {
        (self.created_at.elapsed().as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Notification stack with expiry.
pub struct ToastManager {
    toasts: Vec<Toast>,
    max_toasts: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: Vec::new(),
            max_toasts: 5,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, kind: ToastType) {
        self.toasts.push(Toast::new(message.into(), kind));
        while self.toasts.len() > self.max_toasts {
            self.toasts.remove(0);
        }
    }

    pub fn update(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    pub fn has_active_toasts(&self) -> bool {
        !self.toasts.is_empty()
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the toast stack in the top-right corner.
pub struct ToastWidget<'a> {
    manager: &'a ToastManager,
    palette: &'a Palette,
}

impl<'a> ToastWidget<'a> {
    pub fn new(manager: &'a ToastManager, palette: &'a Palette) -> Self {
        Self { manager, palette }
    }

    fn render_single(&self, toast: &Toast, area: Rect, buf: &mut TuiBuffer) {
        let progress = toast.progress();
        // Fade the border in the last 20% of the lifetime.
        let alpha = if progress > 0.8 {
            ((1.0 - progress) / 0.2).min(1.0)
        } else {
            1.0
        };

        let color = toast.toast_type.color(self.palette);
        let border_color = if alpha < 0.5 {
            self.palette.muted
        } else {
            color
        };

        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(self.palette.modal_bg));
        let inner = block.inner(area);
        block.render(area, buf);

        let max_len = (inner.width as usize).saturating_sub(4);
        let message = if toast.message.chars().count() > max_len {
            let truncated: String = toast.message.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", truncated)
        } else {
            toast.message.clone()
        };

        let content = Line::from(vec![
            Span::styled(
                format!("{} ", toast.toast_type.icon()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(message, Style::default().fg(self.palette.modal_fg)),
        ]);

        if inner.height >= 2 {
            Paragraph::new(content).render(
                Rect {
                    height: 1,
                    ..inner
                },
                buf,
            );

            let remaining = ((1.0 - progress) * inner.width as f32) as u16;
            let bar = Line::from(vec![
                Span::styled("█".repeat(remaining as usize), Style::default().fg(color)),
                Span::styled(
                    "░".repeat((inner.width - remaining) as usize),
                    Style::default().fg(self.palette.muted),
                ),
            ]);
            Paragraph::new(bar).render(
                Rect {
                    y: inner.y + 1,
                    height: 1,
                    ..inner
                },
                buf,
            );
        } else {
            Paragraph::new(content).render(inner, buf);
        }
    }
}

impl Widget for ToastWidget<'_> {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        if self.manager.toasts.is_empty() {
            return;
        }

        let toast_width = 40.min(area.width / 3);
        if toast_width < 8 {
            return;
        }
        for (i, toast) in self.manager.toasts.iter().enumerate() {
            let y = 2 + (i as u16) * 3;
            if y + 3 > area.height {
                break;
            }
            let toast_area = Rect {
                x: area.width.saturating_sub(toast_width + 2),
                y,
                width: toast_width,
                height: 3,
            };
            self.render_single(toast, toast_area, buf);
        }
    }
}
