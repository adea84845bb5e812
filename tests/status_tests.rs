//! Integration tests for the derived status-bar state.

use std::path::Path;

use jotter::editor::EditSurface;
use jotter::events::EventBus;
use jotter::preview::MarkdownPreview;
use jotter::status::{format_display_name, line_col_at, StatusState};
use jotter::tabs::TabStore;
use jotter::widgets::status_bar::{StatusBar, StatusSlot};

#[test]
fn line_col_is_one_based_and_counts_newlines() {
    assert_eq!(line_col_at("", 0), (1, 1));
    assert_eq!(line_col_at("abc", 2), (1, 3));
    assert_eq!(line_col_at("ab\ncd", 3), (2, 1));
    assert_eq!(line_col_at("ab\ncd", 5), (2, 3));
    assert_eq!(line_col_at("a\n\n\nb", 4), (4, 1));
}

#[test]
fn line_col_matches_surface_cursor_position() {
    let mut surface = EditSurface::new();
    surface.set_text("first line\nsecond\nthird one");
    surface.cursor = (2, 4);

    let (line, col) = line_col_at(&surface.text(), surface.caret_offset());
    assert_eq!((line, col), (3, 5));
}

#[test]
fn format_lookup_knows_common_extensions() {
    assert_eq!(format_display_name(Some(Path::new("a.md"))), "Markdown");
    assert_eq!(format_display_name(Some(Path::new("a.rs"))), "Rust");
    assert_eq!(format_display_name(Some(Path::new("a.yml"))), "YAML");
    assert_eq!(format_display_name(Some(Path::new("a.yaml"))), "YAML");
    assert_eq!(format_display_name(Some(Path::new("a.conf"))), "Config");
    assert_eq!(format_display_name(Some(Path::new("a.JSON"))), "JSON");
}

#[test]
fn unknown_extensions_are_uppercased() {
    assert_eq!(format_display_name(Some(Path::new("a.zig"))), "ZIG");
}

#[test]
fn missing_path_or_extension_reads_plain_text() {
    assert_eq!(format_display_name(None), "Plain text");
    assert_eq!(format_display_name(Some(Path::new("Makefile"))), "Plain text");
}

fn bar_with_slots() -> StatusBar {
    let mut bar = StatusBar::new();
    bar.set_slot(StatusSlot::new("cursor", ""));
    bar.set_slot(StatusSlot::new("chars", ""));
    bar.set_slot(StatusSlot::new("format", ""));
    bar.set_slot(StatusSlot::new("path", "").with_visibility(false));
    bar.set_slot(StatusSlot::new("markdown", "").with_visibility(false));
    bar
}

#[test]
fn update_populates_every_slot() {
    let bus = EventBus::new();
    let mut tabs = TabStore::new(bus.sender());
    let mut surface = EditSurface::new();
    let id = tabs.create_tab("x.md", Some("/tmp/x.md".into()), "# hi\nworld");
    tabs.set_active(id, &mut surface);
    surface.cursor = (1, 3);

    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(Some(Path::new("/tmp/x.md")), &surface.text());

    let mut bar = bar_with_slots();
    let mut status = StatusState::new();
    status.update(&surface, &tabs, &preview, &mut bar);

    assert_eq!(bar.get_slot("cursor").unwrap().content, "Ln 2, Col 4");
    assert_eq!(bar.get_slot("chars").unwrap().content, "10 chars");
    assert_eq!(bar.get_slot("format").unwrap().content, "Markdown");
    assert_eq!(bar.get_slot("path").unwrap().content, "/tmp/x.md");
    assert!(bar.get_slot("path").unwrap().visible);
    assert_eq!(bar.get_slot("markdown").unwrap().content, "Markdown: off");
    assert!(bar.get_slot("markdown").unwrap().visible);
}

#[test]
fn pathless_tab_hides_the_path_slot() {
    let bus = EventBus::new();
    let mut tabs = TabStore::new(bus.sender());
    let mut surface = EditSurface::new();
    tabs.ensure_not_empty(&mut surface);

    let preview = MarkdownPreview::new();
    let mut bar = bar_with_slots();
    let mut status = StatusState::new();
    status.update(&surface, &tabs, &preview, &mut bar);

    assert!(!bar.get_slot("path").unwrap().visible);
    assert!(!bar.get_slot("markdown").unwrap().visible);
    assert_eq!(bar.get_slot("format").unwrap().content, "Plain text");
}

#[test]
fn unchanged_values_do_not_rewrite_slots() {
    let bus = EventBus::new();
    let mut tabs = TabStore::new(bus.sender());
    let mut surface = EditSurface::new();
    tabs.ensure_not_empty(&mut surface);

    let preview = MarkdownPreview::new();
    let mut bar = bar_with_slots();
    let mut status = StatusState::new();
    status.update(&surface, &tabs, &preview, &mut bar);

    // Poison the slot: a second update with unchanged state must not
    // touch it.
    bar.update_slot_content("cursor", "sentinel");
    status.update(&surface, &tabs, &preview, &mut bar);
    assert_eq!(bar.get_slot("cursor").unwrap().content, "sentinel");

    // A caret move rewrites it.
    surface.insert_char('x');
    status.update(&surface, &tabs, &preview, &mut bar);
    assert_eq!(bar.get_slot("cursor").unwrap().content, "Ln 1, Col 2");
}
