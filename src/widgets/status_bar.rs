use ratatui::{
    buffer::Buffer as TuiBuffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::collections::HashMap;

/// Alignment group of a status bar slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotAlignment {
    Left,
    Center,
    Right,
}

/// A single slot in the status bar.
#[derive(Debug, Clone)]
pub struct StatusSlot {
    pub id: String,
    pub content: String,
    pub alignment: SlotAlignment,
    /// Higher priority renders first within its alignment group.
    pub priority: u8,
    /// None inherits the bar's background style.
    pub style: Option<Style>,
    pub visible: bool,
}

impl StatusSlot {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            alignment: SlotAlignment::Left,
            priority: 50,
            style: None,
            visible: true,
        }
    }

    pub fn with_alignment(mut self, alignment: SlotAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Slot-based status bar: named slots grouped by alignment, ordered by
/// priority, individually updatable and hideable.
#[derive(Clone)]
pub struct StatusBar {
    slots: HashMap<String, StatusSlot>,
    background_style: Style,
    separator: String,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            background_style: Style::default(),
            separator: " | ".to_string(),
        }
    }

    pub fn set_slot(&mut self, slot: StatusSlot) {
        self.slots.insert(slot.id.clone(), slot);
    }

    pub fn get_slot(&self, id: &str) -> Option<&StatusSlot> {
        self.slots.get(id)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn hide_slot(&mut self, id: &str) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.visible = false;
        }
    }

    pub fn show_slot(&mut self, id: &str) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.visible = true;
        }
    }

    pub fn update_slot_content(&mut self, id: &str, content: impl Into<String>) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.content = content.into();
        }
    }

    pub fn set_background_style(&mut self, style: Style) {
        self.background_style = style;
    }

    fn organized(&self) -> (Vec<&StatusSlot>, Vec<&StatusSlot>, Vec<&StatusSlot>) {
        let mut left: Vec<&StatusSlot> = Vec::new();
        let mut center: Vec<&StatusSlot> = Vec::new();
        let mut right: Vec<&StatusSlot> = Vec::new();

        for slot in self.slots.values().filter(|s| s.visible && !s.content.is_empty()) {
            match slot.alignment {
                SlotAlignment::Left => left.push(slot),
                SlotAlignment::Center => center.push(slot),
                SlotAlignment::Right => right.push(slot),
            }
        }
        left.sort_by(|a, b| b.priority.cmp(&a.priority));
        center.sort_by(|a, b| b.priority.cmp(&a.priority));
        right.sort_by(|a, b| b.priority.cmp(&a.priority));
        (left, center, right)
    }

    fn spans_for(&self, slots: &[&StatusSlot]) -> Vec<Span> {
        let mut spans = Vec::new();
        for (i, slot) in slots.iter().enumerate() {
            if i > 0 && !self.separator.is_empty() {
                spans.push(Span::styled(self.separator.clone(), self.background_style));
            }
            let style = slot.style.unwrap_or(self.background_style);
            spans.push(Span::styled(slot.content.clone(), style));
        }
        spans
    }

    fn width_of(spans: &[Span]) -> u16 {
        spans.iter().map(|s| s.content.chars().count() as u16).sum()
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut TuiBuffer) {
        let block = Block::default()
            .style(self.background_style)
            .borders(Borders::NONE);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 {
            return;
        }

        let (left, center, right) = self.organized();
        let left_spans = self.spans_for(&left);
        let center_spans = self.spans_for(&center);
        let right_spans = self.spans_for(&right);

        let left_width = Self::width_of(&left_spans);
        let center_width = Self::width_of(&center_spans);
        let right_width = Self::width_of(&right_spans);
        let available = inner.width;

        let mut all_spans = Vec::new();

        if left_width + center_width + right_width <= available {
            all_spans.extend(left_spans);
            let remaining = available - left_width - right_width;
            if center_width > 0 && remaining >= center_width {
                let pad = (remaining - center_width) / 2;
                if pad > 0 {
                    all_spans.push(Span::styled(
                        " ".repeat(pad as usize),
                        self.background_style,
                    ));
                }
                all_spans.extend(center_spans);
                let tail = remaining - center_width - pad;
                if tail > 0 {
                    all_spans.push(Span::styled(
                        " ".repeat(tail as usize),
                        self.background_style,
                    ));
                }
            } else if remaining > 0 {
                all_spans.push(Span::styled(
                    " ".repeat(remaining as usize),
                    self.background_style,
                ));
            }
            all_spans.extend(right_spans);
        } else {
            // Not enough room: left content wins, right content fills what
            // is left, center is dropped.
            let mut used = 0u16;
            for span in left_spans {
                let w = span.content.chars().count() as u16;
                if used + w > available {
                    break;
                }
                used += w;
                all_spans.push(span);
            }
            let mut kept_right = Vec::new();
            for span in right_spans.into_iter().rev() {
                let w = span.content.chars().count() as u16;
                if used + w > available {
                    break;
                }
                used += w;
                kept_right.push(span);
            }
            kept_right.reverse();
            let pad = available - used;
            if pad > 0 {
                all_spans.push(Span::styled(
                    " ".repeat(pad as usize),
                    self.background_style,
                ));
            }
            all_spans.extend(kept_right);
        }

        Paragraph::new(Line::from(all_spans))
            .style(self.background_style)
            .render(inner, buf);
    }
}
