//! # The shared edit surface
//!
//! One text widget serves every tab: switching tabs swaps content in and
//! out of this surface, so at any instant the surface holds the live text
//! of exactly the active tab.
//!
//! ## What it does
//!
//! - Stores text as lines in memory with a (row, column) caret
//! - Basic editing: insert, newline, backspace, delete, caret movement
//! - Converts to/from the flat string form the tab store works with
//!
//! Alongside it lives [`DraftGuard`], a crash-recovery net that persists
//! the raw surface text to the durable store on a one second debounce,
//! independent of any tab's saved/unsaved bookkeeping.

use std::time::{Duration, Instant};

use crate::debounce::Debounced;
use crate::store::{PersistentStore, KEY_DRAFT_CONTENT};

const DRAFT_DEBOUNCE: Duration = Duration::from_millis(1000);

pub enum CursorMovement {
    Up,
    Down,
    Left,
    Right,
    LineStart,
    LineEnd,
    PageUp(usize),
    PageDown(usize),
    BufferStart,
    BufferEnd,
}

/// The single shared text-editing widget state.
pub struct EditSurface {
    lines: Vec<String>,
    /// Caret as (row, column) in characters.
    pub cursor: (usize, usize),
    /// First visible row.
    pub scroll_row: usize,
}

impl Default for EditSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSurface {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: (0, 0),
            scroll_row: 0,
        }
    }

    /// Replace the whole surface content, resetting caret and scroll.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor = (0, 0);
        self.scroll_row = 0;
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Flat string form, lines joined by `\n`.
    pub fn text(&self) -> String {
        let total: usize = self.lines.iter().map(|line| line.len() + 1).sum();
        let mut out = String::with_capacity(total.saturating_sub(1));
        for (i, line) in self.lines.iter().enumerate() {
            out.push_str(line);
            if i + 1 < self.lines.len() {
                out.push('\n');
            }
        }
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn char_count(&self) -> usize {
        let newlines = self.lines.len().saturating_sub(1);
        self.lines.iter().map(|l| l.chars().count()).sum::<usize>() + newlines
    }

    /// Characters before the caret, counting newlines. This is the offset
    /// the status bar scans up to when deriving line/column.
    pub fn caret_offset(&self) -> usize {
        let (row, col) = self.cursor;
        let mut offset = 0;
        for line in self.lines.iter().take(row) {
            offset += line.chars().count() + 1;
        }
        offset + col.min(self.lines.get(row).map_or(0, |l| l.chars().count()))
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    pub fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        if row >= self.lines.len() {
            self.lines.push(String::new());
        }
        let line = &mut self.lines[row];
        let idx = Self::byte_index(line, col);
        line.insert(idx, c);
        self.cursor.1 += 1;
    }

    pub fn insert_newline(&mut self) {
        let (row, col) = self.cursor;
        if row >= self.lines.len() {
            self.lines.push(String::new());
            self.cursor = (row + 1, 0);
            return;
        }
        let idx = Self::byte_index(&self.lines[row], col);
        let rest = self.lines[row].split_off(idx);
        self.lines.insert(row + 1, rest);
        self.cursor = (row + 1, 0);
    }

    pub fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let idx = Self::byte_index(line, col - 1);
            line.remove(idx);
            self.cursor.1 -= 1;
        } else if row > 0 {
            let current = self.lines.remove(row);
            let prev = &mut self.lines[row - 1];
            let new_col = prev.chars().count();
            prev.push_str(&current);
            self.cursor = (row - 1, new_col);
        }
    }

    pub fn delete(&mut self) {
        let (row, col) = self.cursor;
        if row >= self.lines.len() {
            return;
        }
        if col < self.line_len(row) {
            let idx = Self::byte_index(&self.lines[row], col);
            self.lines[row].remove(idx);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    pub fn move_cursor(&mut self, movement: CursorMovement) {
        let (mut row, mut col) = self.cursor;

        match movement {
            CursorMovement::Up => {
                if row > 0 {
                    row -= 1;
                    col = col.min(self.line_len(row));
                }
            }
            CursorMovement::Down => {
                if row + 1 < self.lines.len() {
                    row += 1;
                    col = col.min(self.line_len(row));
                }
            }
            CursorMovement::Left => {
                if col > 0 {
                    col -= 1;
                } else if row > 0 {
                    row -= 1;
                    col = self.line_len(row);
                }
            }
            CursorMovement::Right => {
                if col < self.line_len(row) {
                    col += 1;
                } else if row + 1 < self.lines.len() {
                    row += 1;
                    col = 0;
                }
            }
            CursorMovement::LineStart => {
                col = 0;
            }
            CursorMovement::LineEnd => {
                col = self.line_len(row);
            }
            CursorMovement::PageUp(page) => {
                let page = page.max(1);
                row = row.saturating_sub(page);
                col = col.min(self.line_len(row));
            }
            CursorMovement::PageDown(page) => {
                let page = page.max(1);
                row = (row + page).min(self.lines.len().saturating_sub(1));
                col = col.min(self.line_len(row));
            }
            CursorMovement::BufferStart => {
                row = 0;
                col = 0;
            }
            CursorMovement::BufferEnd => {
                row = self.lines.len().saturating_sub(1);
                col = self.line_len(row);
            }
        }

        self.cursor = (row, col);
    }

    /// Keep the caret inside the visible window of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let row = self.cursor.0;
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + height {
            self.scroll_row = row + 1 - height;
        }
    }

    /// Width reserved for the line-number gutter.
    pub fn line_number_width(&self) -> usize {
        let mut digits = 1;
        let mut n = self.lines.len().max(1);
        while n >= 10 {
            digits += 1;
            n /= 10;
        }
        digits.max(4) + 1
    }
}

/// Debounced draft persistence over the edit surface.
///
/// Input (re)arms a one second timer; when it fires the raw surface text
/// is written to the store iff it changed since the last persist.
/// Programmatic content replacement persists immediately, and teardown
/// flushes any pending timer so at most the last keystroke burst is lost.
pub struct DraftGuard {
    last_persisted: String,
    timer: Debounced<()>,
}

impl DraftGuard {
    pub fn new() -> Self {
        Self {
            last_persisted: String::new(),
            timer: Debounced::new(DRAFT_DEBOUNCE),
        }
    }

    /// The saved draft from a previous session, if any.
    pub fn load(store: &PersistentStore) -> Option<String> {
        store.get(KEY_DRAFT_CONTENT).map(str::to_string)
    }

    /// Call on every edit of the surface.
    pub fn note_input(&mut self, now: Instant) {
        self.timer.schedule(now, ());
    }

    /// Frame-loop poll; persists once the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant, surface: &EditSurface, store: &mut PersistentStore) {
        if self.timer.take_due(now).is_some() {
            self.persist_if_changed(surface, store);
        }
    }

    /// Immediate persist, cancelling any pending debounce. Used by
    /// `set_content`/`clear` style replacements.
    pub fn record_set(&mut self, surface: &EditSurface, store: &mut PersistentStore) {
        self.timer.cancel();
        self.persist_if_changed(surface, store);
    }

    /// Teardown flush: deliver a pending debounce synchronously.
    pub fn flush(&mut self, surface: &EditSurface, store: &mut PersistentStore) {
        if self.timer.flush().is_some() {
            self.persist_if_changed(surface, store);
        }
    }

    fn persist_if_changed(&mut self, surface: &EditSurface, store: &mut PersistentStore) {
        let current = surface.text();
        if current != self.last_persisted {
            store.set(KEY_DRAFT_CONTENT, current.clone());
            self.last_persisted = current;
        }
    }
}

impl Default for DraftGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip_preserves_trailing_newline() {
        let mut surface = EditSurface::new();
        surface.set_text("one\ntwo\n");
        assert_eq!(surface.line_count(), 3);
        assert_eq!(surface.text(), "one\ntwo\n");
    }

    #[test]
    fn insert_and_newline_split_lines() {
        let mut surface = EditSurface::new();
        for c in "hello".chars() {
            surface.insert_char(c);
        }
        surface.cursor = (0, 2);
        surface.insert_newline();
        assert_eq!(surface.lines(), &["he".to_string(), "llo".to_string()]);
        assert_eq!(surface.cursor, (1, 0));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut surface = EditSurface::new();
        surface.set_text("ab\ncd");
        surface.cursor = (1, 0);
        surface.backspace();
        assert_eq!(surface.text(), "abcd");
        assert_eq!(surface.cursor, (0, 2));
    }

    #[test]
    fn caret_offset_counts_newlines() {
        let mut surface = EditSurface::new();
        surface.set_text("ab\ncd\nef");
        surface.cursor = (2, 1);
        // "ab\n" = 3, "cd\n" = 3, plus one column.
        assert_eq!(surface.caret_offset(), 7);
    }

    #[test]
    fn movement_clamps_to_shorter_lines() {
        let mut surface = EditSurface::new();
        surface.set_text("long line\nx");
        surface.cursor = (0, 8);
        surface.move_cursor(CursorMovement::Down);
        assert_eq!(surface.cursor, (1, 1));
    }
}
