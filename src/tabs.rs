//! # Tab registry
//!
//! Authoritative set of open documents and the single active-tab pointer.
//!
//! Every read or write of document text is mediated against the one
//! shared [`EditSurface`]: the active tab's true text lives in the
//! surface and is flushed back into the tab before any comparison, while
//! inactive tabs hold their text in `content`. The registry is a pure
//! state layer: it publishes change notifications and never touches the
//! terminal.

use std::path::{Path, PathBuf};

use crate::editor::EditSurface;
use crate::events::{AppEvent, EventSender};

/// One open logical document.
#[derive(Debug, Clone)]
pub struct Tab {
    /// Process-unique, monotonically increasing, never reused.
    pub id: u64,
    /// Display label: final path segment, or the literal `unnamed`.
    pub name: String,
    pub file_path: Option<PathBuf>,
    /// Authoritative only while the tab is inactive; the active tab's
    /// live text is in the edit surface until flushed.
    pub content: String,
    /// Snapshot at the last successful save or load.
    pub saved_content: String,
    /// True once the tab is associated with a real file path.
    pub saved: bool,
    /// Recomputed on every flush, never cached across edits.
    pub has_changes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Display label derived from a path's final segment.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "unnamed".to_string())
}

pub struct TabStore {
    tabs: Vec<Tab>,
    active_id: Option<u64>,
    next_id: u64,
    sort_order: SortOrder,
    events: EventSender,
}

impl TabStore {
    pub fn new(events: EventSender) -> Self {
        Self {
            tabs: Vec::new(),
            active_id: None,
            next_id: 1,
            sort_order: SortOrder::Ascending,
            events,
        }
    }

    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Append a new tab. `saved` follows the presence of a path, and the
    /// saved-content snapshot starts at `content` only for real files.
    pub fn create_tab(
        &mut self,
        name: impl Into<String>,
        file_path: Option<PathBuf>,
        content: impl Into<String>,
    ) -> u64 {
        let content = content.into();
        let saved = file_path.is_some();
        let tab = Tab {
            id: self.next_id,
            name: name.into(),
            saved_content: if saved { content.clone() } else { String::new() },
            file_path,
            content,
            saved,
            has_changes: false,
        };
        self.next_id += 1;
        let id = tab.id;
        self.tabs.push(tab);
        self.events.publish(AppEvent::TabListChanged);
        id
    }

    /// Guarantee the registry is never empty: create and activate a fresh
    /// unnamed tab when the last one is gone.
    pub fn ensure_not_empty(&mut self, surface: &mut EditSurface) {
        if self.tabs.is_empty() {
            let id = self.create_tab("unnamed", None, "");
            self.set_active(id, surface);
        }
    }

    /// Flush the edit surface into the currently active tab, recomputing
    /// its unsaved marker against the saved-content snapshot.
    pub fn flush_active(&mut self, surface: &EditSurface) {
        let Some(id) = self.active_id else { return };
        let text = surface.text();
        if let Some(tab) = self.get_mut(id) {
            tab.content = text;
            if !tab.content.is_empty() || tab.file_path.is_some() {
                let had_changes = tab.has_changes;
                tab.has_changes = tab.content != tab.saved_content;
                if had_changes != tab.has_changes {
                    self.events.publish(AppEvent::TabListChanged);
                }
            }
        }
    }

    /// Activate a tab: flush the previous one, swap the new tab's content
    /// into the surface, announce the change.
    ///
    /// Calling this with the already-active id still re-flushes the
    /// surface, an idempotent resync that doubles as the pre-save flush.
    pub fn set_active(&mut self, id: u64, surface: &mut EditSurface) {
        if self.active_id.is_some() {
            self.flush_active(surface);
        }
        let Some(tab) = self.get(id) else { return };
        let content = tab.content.clone();
        self.active_id = Some(id);
        surface.set_text(&content);
        self.events.publish(AppEvent::TabChanged { tab_id: id });
    }

    /// Unsaved-changes test used by the close flow: the live text (surface
    /// for the active tab) must differ from the saved snapshot, and the
    /// tab must either be marked changed or be a never-saved tab with
    /// non-blank content.
    pub fn has_unsaved(&self, id: u64, surface: &EditSurface) -> bool {
        let Some(tab) = self.get(id) else {
            return false;
        };
        let live = if self.active_id == Some(id) {
            surface.text()
        } else {
            tab.content.clone()
        };
        let dirty = tab.has_changes || (!tab.saved && !live.trim().is_empty());
        dirty && live != tab.saved_content
    }

    /// Remove a tab unconditionally. Confirmation and save-before-close
    /// negotiation happen in the close flow upstream; this is the final
    /// step. The registry auto-recreates an unnamed tab when the last one
    /// goes, and reactivates at `min(removed_index, len - 1)` of the
    /// unsorted list when the removed tab was active.
    pub fn remove(&mut self, id: u64, surface: &mut EditSurface) {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return;
        };
        self.tabs.remove(index);

        if self.tabs.is_empty() {
            self.active_id = None;
            let new_id = self.create_tab("unnamed", None, "");
            self.set_active(new_id, surface);
        } else if self.active_id == Some(id) {
            self.active_id = None;
            let new_index = index.min(self.tabs.len() - 1);
            let new_id = self.tabs[new_index].id;
            self.set_active(new_id, surface);
        }
        self.events.publish(AppEvent::TabListChanged);
    }

    /// Record a successful save or load: the path becomes the identity,
    /// the snapshot catches up, and the label is rederived. The surface
    /// is refreshed immediately when the tab is active.
    pub fn update_from_file(
        &mut self,
        id: u64,
        file_path: PathBuf,
        content: impl Into<String>,
        surface: &mut EditSurface,
    ) {
        let content = content.into();
        let is_active = self.active_id == Some(id);
        let Some(tab) = self.get_mut(id) else { return };

        tab.name = file_name_of(&file_path);
        tab.file_path = Some(file_path);
        tab.content = content.clone();
        tab.saved_content = content.clone();
        tab.saved = true;
        tab.has_changes = false;

        if is_active {
            surface.set_text(&content);
        }
        self.events.publish(AppEvent::TabListChanged);
    }

    /// Tabs in visible order: case-insensitive by name, direction per the
    /// sort toggle. Ids and the unsorted list are unaffected.
    pub fn sorted(&self) -> Vec<&Tab> {
        let mut tabs: Vec<&Tab> = self.tabs.iter().collect();
        tabs.sort_by(|a, b| {
            let (na, nb) = (a.name.to_lowercase(), b.name.to_lowercase());
            match self.sort_order {
                SortOrder::Ascending => na.cmp(&nb),
                SortOrder::Descending => nb.cmp(&na),
            }
        });
        tabs
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
        self.events.publish(AppEvent::TabListChanged);
    }

    /// Cycle to the next tab in sorted order, wrapping around. A single
    /// tab is a no-op.
    pub fn switch_to_next(&mut self, surface: &mut EditSurface) {
        if self.tabs.len() <= 1 {
            return;
        }
        let sorted_ids: Vec<u64> = self.sorted().iter().map(|t| t.id).collect();
        let current = sorted_ids
            .iter()
            .position(|&id| Some(id) == self.active_id)
            .unwrap_or(0);
        let next = sorted_ids[(current + 1) % sorted_ids.len()];
        self.set_active(next, surface);
    }

    /// Case-insensitive substring filter over tab names, in creation
    /// order. An empty query matches every tab.
    pub fn search(&self, query: &str) -> Vec<&Tab> {
        let query = query.to_lowercase();
        let query = query.trim();
        self.tabs
            .iter()
            .filter(|t| query.is_empty() || t.name.to_lowercase().contains(query))
            .collect()
    }
}

/// Quick-search overlay state: live query plus a selection index over the
/// filtered results, arrow-navigable with wraparound.
#[derive(Debug, Default)]
pub struct QuickSearch {
    pub query: String,
    pub selected: usize,
}

impl QuickSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp the selection after the result list changed size.
    pub fn clamp(&mut self, result_count: usize) {
        if result_count == 0 {
            self.selected = 0;
        } else if self.selected >= result_count {
            self.selected = result_count - 1;
        }
    }

    pub fn move_selection(&mut self, result_count: usize, delta: i32) {
        if result_count == 0 {
            return;
        }
        let len = result_count as i32;
        let mut index = self.selected as i32 + delta;
        if index < 0 {
            index = len - 1;
        } else if index >= len {
            index = 0;
        }
        self.selected = index as usize;
    }
}
