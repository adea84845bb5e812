//! Derived status-bar state.
//!
//! Pure recomputation over the edit surface and tab registry: cursor
//! line/column, character count, a format display name looked up from the
//! file extension, and the current path. Each field is pushed into its
//! status-bar slot only when the computed value actually changed since the
//! last update.

use std::path::Path;

use crate::editor::EditSurface;
use crate::preview::MarkdownPreview;
use crate::tabs::TabStore;
use crate::widgets::status_bar::StatusBar;

/// 1-based line/column derived by scanning all text up to the caret.
/// Deliberately a full rescan per call: correct across arbitrary caret
/// jumps without any cache to invalidate.
pub fn line_col_at(text: &str, caret: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for c in text.chars().take(caret) {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Display name for a file extension; unknown extensions are uppercased,
/// extension-less paths and pathless tabs read as plain text.
pub fn format_display_name(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return "Plain text".to_string();
    };
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return "Plain text".to_string();
    };
    let extension = extension.to_lowercase();

    let known = match extension.as_str() {
        "txt" => "Plain text",
        "md" => "Markdown",
        "json" => "JSON",
        "xml" => "XML",
        "html" => "HTML",
        "css" => "CSS",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "jsx" => "React JSX",
        "tsx" => "React TSX",
        "py" => "Python",
        "rs" => "Rust",
        "java" => "Java",
        "cpp" => "C++",
        "c" => "C",
        "h" => "C Header",
        "hpp" => "C++ Header",
        "cs" => "C#",
        "php" => "PHP",
        "rb" => "Ruby",
        "go" => "Go",
        "sh" => "Shell Script",
        "bat" => "Batch",
        "ps1" => "PowerShell",
        "yml" | "yaml" => "YAML",
        "toml" => "TOML",
        "ini" => "INI",
        "cfg" | "conf" => "Config",
        "log" => "Log",
        _ => "",
    };
    if known.is_empty() {
        extension.to_uppercase()
    } else {
        known.to_string()
    }
}

/// Change-tracking recomputer feeding the status-bar slots.
pub struct StatusState {
    last_line_col: (usize, usize),
    last_char_count: usize,
    last_format: String,
    last_path: String,
    last_markdown: String,
}

impl StatusState {
    pub fn new() -> Self {
        Self {
            last_line_col: (0, 0),
            last_char_count: usize::MAX,
            last_format: String::new(),
            last_path: String::new(),
            last_markdown: String::new(),
        }
    }

    /// Recompute every field and touch only the slots whose value moved.
    pub fn update(
        &mut self,
        surface: &EditSurface,
        tabs: &TabStore,
        preview: &MarkdownPreview,
        bar: &mut StatusBar,
    ) {
        let text = surface.text();
        let line_col = line_col_at(&text, surface.caret_offset());
        if line_col != self.last_line_col {
            bar.update_slot_content("cursor", format!("Ln {}, Col {}", line_col.0, line_col.1));
            self.last_line_col = line_col;
        }

        let char_count = surface.char_count();
        if char_count != self.last_char_count {
            bar.update_slot_content("chars", format!("{} chars", char_count));
            self.last_char_count = char_count;
        }

        let active_path = tabs.active().and_then(|t| t.file_path.clone());
        let format = format_display_name(active_path.as_deref());
        if format != self.last_format {
            bar.update_slot_content("format", format.clone());
            self.last_format = format;
        }

        let path = active_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        if path != self.last_path {
            if path.is_empty() {
                bar.hide_slot("path");
            } else {
                bar.update_slot_content("path", path.clone());
                bar.show_slot("path");
            }
            self.last_path = path;
        }

        let markdown = if preview.is_available() {
            preview.mode().label().to_string()
        } else {
            String::new()
        };
        if markdown != self.last_markdown {
            if markdown.is_empty() {
                bar.hide_slot("markdown");
            } else {
                bar.update_slot_content("markdown", markdown.clone());
                bar.show_slot("markdown");
            }
            self.last_markdown = markdown;
        }
    }
}

impl Default for StatusState {
    fn default() -> Self {
        Self::new()
    }
}
