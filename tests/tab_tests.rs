//! Integration tests for the tab registry and its interplay with the
//! shared edit surface.

use jotter::editor::EditSurface;
use jotter::events::EventBus;
use jotter::tabs::{QuickSearch, SortOrder, TabStore};

fn setup() -> (EventBus, TabStore, EditSurface) {
    let bus = EventBus::new();
    let tabs = TabStore::new(bus.sender());
    let surface = EditSurface::new();
    (bus, tabs, surface)
}

#[test]
fn registry_is_never_empty_after_settle() {
    let (_bus, mut tabs, mut surface) = setup();
    tabs.ensure_not_empty(&mut surface);
    assert_eq!(tabs.count(), 1);
    assert_eq!(tabs.active().unwrap().name, "unnamed");

    let id = tabs.active_id().unwrap();
    tabs.remove(id, &mut surface);

    // Removing the last tab recreates a fresh unnamed tab.
    assert_eq!(tabs.count(), 1);
    let fresh = tabs.active().unwrap();
    assert_eq!(fresh.name, "unnamed");
    assert!(fresh.file_path.is_none());
    assert!(!fresh.saved);
}

#[test]
fn tab_ids_are_monotonic_and_never_reused() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    let b = tabs.create_tab("b.txt", None, "");
    tabs.remove(b, &mut surface);
    let c = tabs.create_tab("c.txt", None, "");

    assert!(b > a);
    assert!(c > b);
}

#[test]
fn has_changes_tracks_live_content_against_snapshot() {
    let (_bus, mut tabs, mut surface) = setup();
    let id = tabs.create_tab("a.txt", Some("/tmp/a.txt".into()), "saved text");
    tabs.set_active(id, &mut surface);
    assert_eq!(surface.text(), "saved text");
    assert!(!tabs.get(id).unwrap().has_changes);

    surface.insert_char('!');
    tabs.flush_active(&surface);
    assert!(tabs.get(id).unwrap().has_changes);

    // Reverting the edit clears the marker on the next flush.
    surface.backspace();
    tabs.flush_active(&surface);
    assert!(!tabs.get(id).unwrap().has_changes);
}

#[test]
fn update_from_file_resets_state_and_renames() {
    let (_bus, mut tabs, mut surface) = setup();
    let id = tabs.create_tab("unnamed", None, "");
    tabs.set_active(id, &mut surface);

    surface.set_text("hello");
    tabs.flush_active(&surface);

    tabs.update_from_file(id, "/tmp/x.md".into(), "hello", &mut surface);
    let tab = tabs.get(id).unwrap();
    assert_eq!(tab.name, "x.md");
    assert!(tab.saved);
    assert!(!tab.has_changes);
    assert_eq!(tab.saved_content, "hello");
    // Active tab: the surface is refreshed immediately.
    assert_eq!(surface.text(), "hello");
}

#[test]
fn set_active_flushes_previous_tab_first() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    let b = tabs.create_tab("b.txt", None, "");
    tabs.set_active(a, &mut surface);

    surface.set_text("typed into a");
    tabs.set_active(b, &mut surface);

    assert_eq!(tabs.get(a).unwrap().content, "typed into a");
    assert_eq!(surface.text(), "");

    tabs.set_active(a, &mut surface);
    assert_eq!(surface.text(), "typed into a");
}

#[test]
fn set_active_with_current_id_still_resyncs() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    tabs.set_active(a, &mut surface);

    surface.set_text("fresh edits");
    tabs.set_active(a, &mut surface);

    // The self-call flushed the surface into the tab before re-loading it.
    assert_eq!(tabs.get(a).unwrap().content, "fresh edits");
    assert_eq!(surface.text(), "fresh edits");
}

#[test]
fn closing_active_tab_activates_same_unsorted_index() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    let b = tabs.create_tab("b.txt", None, "");
    let c = tabs.create_tab("c.txt", None, "");
    tabs.set_active(b, &mut surface);

    tabs.remove(b, &mut surface);
    // Removed index 1; the tab now at index 1 becomes active.
    assert_eq!(tabs.active_id(), Some(c));

    tabs.remove(c, &mut surface);
    // Removed the last index; clamps to the new last element.
    assert_eq!(tabs.active_id(), Some(a));
}

#[test]
fn closing_inactive_tab_keeps_active_pointer() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    let b = tabs.create_tab("b.txt", None, "");
    tabs.set_active(a, &mut surface);

    tabs.remove(b, &mut surface);
    assert_eq!(tabs.active_id(), Some(a));
}

#[test]
fn sort_is_case_insensitive_and_toggleable() {
    let (_bus, mut tabs, _surface) = setup();
    tabs.create_tab("b.txt", None, "");
    tabs.create_tab("A.txt", None, "");
    tabs.create_tab("c.txt", None, "");

    let names: Vec<&str> = tabs.sorted().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["A.txt", "b.txt", "c.txt"]);

    tabs.toggle_sort_order();
    assert_eq!(tabs.sort_order(), SortOrder::Descending);
    let names: Vec<&str> = tabs.sorted().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["c.txt", "b.txt", "A.txt"]);
}

#[test]
fn switch_to_next_walks_sorted_order_with_wraparound() {
    let (_bus, mut tabs, mut surface) = setup();
    let b = tabs.create_tab("b.txt", None, "");
    let a = tabs.create_tab("A.txt", None, "");
    let c = tabs.create_tab("c.txt", None, "");
    tabs.set_active(a, &mut surface);

    tabs.switch_to_next(&mut surface);
    assert_eq!(tabs.active_id(), Some(b));
    tabs.switch_to_next(&mut surface);
    assert_eq!(tabs.active_id(), Some(c));
    tabs.switch_to_next(&mut surface);
    assert_eq!(tabs.active_id(), Some(a));
}

#[test]
fn switch_to_next_is_noop_with_single_tab() {
    let (_bus, mut tabs, mut surface) = setup();
    let a = tabs.create_tab("a.txt", None, "");
    tabs.set_active(a, &mut surface);
    tabs.switch_to_next(&mut surface);
    assert_eq!(tabs.active_id(), Some(a));
}

#[test]
fn search_filters_by_case_insensitive_substring() {
    let (_bus, mut tabs, _surface) = setup();
    tabs.create_tab("notes.md", None, "");
    tabs.create_tab("README.txt", None, "");
    tabs.create_tab("todo.md", None, "");

    let hits: Vec<&str> = tabs.search("ME").iter().map(|t| t.name.as_str()).collect();
    assert_eq!(hits, vec!["README.txt"]);

    let hits: Vec<&str> = tabs.search(".md").iter().map(|t| t.name.as_str()).collect();
    assert_eq!(hits, vec!["notes.md", "todo.md"]);

    assert_eq!(tabs.search("").len(), 3);
    assert!(tabs.search("zzz").is_empty());
}

#[test]
fn quick_search_selection_wraps_both_ways() {
    let mut search = QuickSearch::new();
    search.move_selection(3, 1);
    assert_eq!(search.selected, 1);
    search.move_selection(3, 1);
    search.move_selection(3, 1);
    assert_eq!(search.selected, 0);
    search.move_selection(3, -1);
    assert_eq!(search.selected, 2);
}

#[test]
fn unsaved_detection_ignores_blank_never_saved_tabs() {
    let (_bus, mut tabs, mut surface) = setup();
    let id = tabs.create_tab("unnamed", None, "");
    tabs.set_active(id, &mut surface);

    surface.set_text("   \n  ");
    tabs.flush_active(&surface);
    assert!(!tabs.has_unsaved(id, &surface));

    surface.set_text("real content");
    tabs.flush_active(&surface);
    assert!(tabs.has_unsaved(id, &surface));
}

#[test]
fn unsaved_detection_uses_live_surface_for_active_tab() {
    let (_bus, mut tabs, mut surface) = setup();
    let id = tabs.create_tab("a.txt", Some("/tmp/a.txt".into()), "stored");
    tabs.set_active(id, &mut surface);

    surface.insert_char('!');
    tabs.flush_active(&surface);
    assert!(tabs.has_unsaved(id, &surface));

    // Saving catches the snapshot up and clears the verdict.
    tabs.update_from_file(id, "/tmp/a.txt".into(), "stored!", &mut surface);
    assert!(!tabs.has_unsaved(id, &surface));
}
