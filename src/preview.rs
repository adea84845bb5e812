//! Markdown preview: availability gating, mode cycling and rendering.
//!
//! The preview has three modes cycled in a fixed order: `off`, `reading`
//! (the rendered document replaces the edit surface) and `sidebar` (a
//! split pane). It is only offered when the active document looks like
//! markdown (by file extension or by content heuristics) and falls back
//! to `off` the moment availability is lost.

use std::path::Path;
use std::time::{Duration, Instant};

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

use crate::debounce::Debounced;
use crate::theme::Palette;

const SCROLL_THROTTLE: Duration = Duration::from_millis(50);

const MARKDOWN_EXTENSIONS: [&str; 5] = ["md", "markdown", "mdown", "mkd", "mkdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    Off,
    Reading,
    Sidebar,
}

impl PreviewMode {
    fn next(self) -> Self {
        match self {
            PreviewMode::Off => PreviewMode::Reading,
            PreviewMode::Reading => PreviewMode::Sidebar,
            PreviewMode::Sidebar => PreviewMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreviewMode::Off => "Markdown: off",
            PreviewMode::Reading => "Reading view",
            PreviewMode::Sidebar => "Sidebar view",
        }
    }
}

pub struct MarkdownPreview {
    mode: PreviewMode,
    available: bool,
    last_source: Option<String>,
    rendered: Vec<Line<'static>>,
    render_requested: bool,
    /// First visible rendered row.
    pub scroll_row: usize,
    scroll_sync: Debounced<(usize, usize)>,
    heuristics: Vec<Regex>,
}

impl MarkdownPreview {
    pub fn new() -> Self {
        let patterns = [
            r"(?m)^#{1,6}\s.+",
            r"(?m)^\s{0,3}[-*+]\s.+",
            r"(?m)^\s{0,3}\d+\.\s.+",
            r"(?s)```.*?```",
            r"`[^`]+`",
            r"\[.+?\]\(.+?\)",
            r"(?m)^>{1,3}\s.+",
        ];
        Self {
            mode: PreviewMode::Off,
            available: false,
            last_source: None,
            rendered: Vec::new(),
            render_requested: false,
            scroll_row: 0,
            scroll_sync: Debounced::new(SCROLL_THROTTLE),
            heuristics: patterns
                .iter()
                .map(|p| Regex::new(p).expect("markdown heuristic pattern"))
                .collect(),
        }
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn rendered(&self) -> &[Line<'static>] {
        &self.rendered
    }

    pub fn is_markdown_path(path: Option<&Path>) -> bool {
        path.and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| MARKDOWN_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    pub fn has_markdown_syntax(&self, content: &str) -> bool {
        !content.is_empty() && self.heuristics.iter().any(|re| re.is_match(content))
    }

    /// Recompute the availability gate. Losing availability while a mode
    /// is active forces the preview off.
    pub fn evaluate_availability(&mut self, path: Option<&Path>, content: &str) {
        self.available = Self::is_markdown_path(path) || self.has_markdown_syntax(content);
        if !self.available && self.mode != PreviewMode::Off {
            self.mode = PreviewMode::Off;
            self.rendered.clear();
            self.last_source = None;
        }
    }

    /// Advance off → reading → sidebar → off. No-op while unavailable.
    pub fn cycle_mode(&mut self, source: &str, palette: &Palette) {
        if !self.available {
            return;
        }
        let next = self.mode.next();
        self.set_mode(next, source, palette);
    }

    /// Direct mode selection; same-mode calls and activation while
    /// unavailable are no-ops.
    pub fn set_mode(&mut self, mode: PreviewMode, source: &str, palette: &Palette) {
        if mode == self.mode {
            return;
        }
        if !self.available && mode != PreviewMode::Off {
            return;
        }
        self.mode = mode;
        if self.mode == PreviewMode::Off {
            self.rendered.clear();
            self.last_source = None;
        } else {
            self.render(source, true, palette);
        }
    }

    /// Input never renders directly; the request coalesces to one render
    /// per frame.
    pub fn handle_input(&mut self) {
        if self.mode == PreviewMode::Off {
            return;
        }
        self.render_requested = true;
    }

    /// Forced refresh after tab switches, renames and external content
    /// replacement (open, save-as).
    pub fn handle_content_replaced(&mut self, path: Option<&Path>, source: &str, palette: &Palette) {
        self.evaluate_availability(path, source);
        if self.mode != PreviewMode::Off {
            self.render(source, true, palette);
        }
    }

    /// Frame-loop hook servicing a coalesced input render request.
    pub fn render_pending(&mut self, source: &str, palette: &Palette) {
        if self.render_requested {
            self.render_requested = false;
            self.render(source, false, palette);
        }
    }

    /// Render unless off or the source is identical to the last render;
    /// `force` overrides the short-circuit.
    pub fn render(&mut self, source: &str, force: bool, palette: &Palette) {
        if self.mode == PreviewMode::Off {
            return;
        }
        if !force && self.last_source.as_deref() == Some(source) {
            return;
        }
        self.last_source = Some(source.to_string());
        self.rendered = render_markdown(source, palette);
    }

    /// Note an editor scroll for ratio mirroring; only meaningful in
    /// reading mode, throttled to one application per window.
    pub fn note_editor_scroll(&mut self, now: Instant, scroll_row: usize, scrollable_rows: usize) {
        if self.mode != PreviewMode::Reading {
            return;
        }
        self.scroll_sync.schedule(now, (scroll_row, scrollable_rows));
    }

    /// Apply a due scroll mirror against the preview's own scrollable
    /// height.
    pub fn poll_scroll(&mut self, now: Instant, preview_height: usize) {
        if self.mode != PreviewMode::Reading {
            self.scroll_sync.cancel();
            return;
        }
        if let Some((scroll_row, scrollable_rows)) = self.scroll_sync.take_due(now) {
            if scrollable_rows == 0 {
                return;
            }
            let ratio = scroll_row as f64 / scrollable_rows as f64;
            let preview_scrollable = self.rendered.len().saturating_sub(preview_height);
            self.scroll_row = (preview_scrollable as f64 * ratio).round() as usize;
        }
    }
}

impl Default for MarkdownPreview {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert markdown to styled terminal lines. Link destinations are
/// always emitted next to the link text so no navigation target is
/// hidden from the reader.
fn render_markdown(source: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, options);

    let base = Style::default().fg(palette.fg);
    let accent = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let code_style = Style::default().fg(palette.modal_secondary).bg(palette.input_bg);
    let muted = Style::default().fg(palette.muted);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut style_stack: Vec<Style> = vec![base];
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut quote_depth: usize = 0;
    let mut in_code_block = false;
    let mut link_dest: Option<String> = None;

    let prefix = |quote_depth: usize, list_depth: usize| -> String {
        let mut p = "│ ".repeat(quote_depth);
        p.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
        p
    };

    macro_rules! flush_line {
        ($lines:ident, $spans:ident) => {
            if !$spans.is_empty() {
                $lines.push(Line::from(std::mem::take(&mut $spans)));
            }
        };
    }

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush_line!(lines, spans);
                let hashes = "#".repeat(level as usize);
                spans.push(Span::styled(format!("{} ", hashes), accent));
                style_stack.push(accent);
            }
            Event::End(TagEnd::Heading(_)) => {
                style_stack.pop();
                flush_line!(lines, spans);
                lines.push(Line::default());
            }
            Event::Start(Tag::Paragraph) => {
                let p = prefix(quote_depth, list_stack.len());
                if !p.is_empty() {
                    spans.push(Span::styled(p, muted));
                }
            }
            Event::End(TagEnd::Paragraph) => {
                flush_line!(lines, spans);
                if quote_depth == 0 && list_stack.is_empty() {
                    lines.push(Line::default());
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                quote_depth = quote_depth.saturating_sub(1);
                lines.push(Line::default());
            }
            Event::Start(Tag::List(start)) => {
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    lines.push(Line::default());
                }
            }
            Event::Start(Tag::Item) => {
                flush_line!(lines, spans);
                let p = prefix(quote_depth, list_stack.len());
                let marker = match list_stack.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{}{}. ", p, n);
                        *n += 1;
                        m
                    }
                    _ => format!("{}• ", p),
                };
                spans.push(Span::styled(marker, Style::default().fg(palette.accent)));
            }
            Event::End(TagEnd::Item) => {
                flush_line!(lines, spans);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                flush_line!(lines, spans);
                in_code_block = true;
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => format!("``` {}", lang),
                    _ => "```".to_string(),
                };
                lines.push(Line::from(Span::styled(lang, muted)));
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(Span::styled("```".to_string(), muted)));
                lines.push(Line::default());
            }
            Event::Start(Tag::Emphasis) => {
                let top = *style_stack.last().unwrap_or(&base);
                style_stack.push(top.add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::Emphasis) => {
                style_stack.pop();
            }
            Event::Start(Tag::Strong) => {
                let top = *style_stack.last().unwrap_or(&base);
                style_stack.push(top.add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Strong) => {
                style_stack.pop();
            }
            Event::Start(Tag::Strikethrough) => {
                let top = *style_stack.last().unwrap_or(&base);
                style_stack.push(top.add_modifier(Modifier::CROSSED_OUT));
            }
            Event::End(TagEnd::Strikethrough) => {
                style_stack.pop();
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                link_dest = Some(dest_url.to_string());
                let top = *style_stack.last().unwrap_or(&base);
                style_stack.push(top.fg(palette.input_focus).add_modifier(Modifier::UNDERLINED));
            }
            Event::End(TagEnd::Link) => {
                style_stack.pop();
                if let Some(dest) = link_dest.take() {
                    spans.push(Span::styled(format!(" ({})", dest), muted));
                }
            }
            Event::Text(text) => {
                if in_code_block {
                    for code_line in text.lines() {
                        lines.push(Line::from(Span::styled(code_line.to_string(), code_style)));
                    }
                } else {
                    let style = *style_stack.last().unwrap_or(&base);
                    spans.push(Span::styled(text.to_string(), style));
                }
            }
            Event::Code(code) => {
                spans.push(Span::styled(code.to_string(), code_style));
            }
            Event::SoftBreak | Event::HardBreak => {
                flush_line!(lines, spans);
                let p = prefix(quote_depth, list_stack.len());
                if !p.is_empty() {
                    spans.push(Span::styled(p, muted));
                }
            }
            Event::Rule => {
                flush_line!(lines, spans);
                lines.push(Line::from(Span::styled("─".repeat(40), muted)));
                lines.push(Line::default());
            }
            _ => {}
        }
    }
    flush_line!(lines, spans);

    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }
    lines
}
