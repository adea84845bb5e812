//! Integration tests for markdown preview availability, mode cycling and
//! rendering behavior.

use std::path::Path;

use jotter::preview::{MarkdownPreview, PreviewMode};
use jotter::theme::ThemeManager;

fn palette() -> &'static jotter::theme::Palette {
    &ThemeManager::get("default").palette
}

#[test]
fn heading_content_makes_preview_available() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# Title");
    assert!(preview.is_available());
}

#[test]
fn plain_text_with_non_markdown_path_is_unavailable() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(Some(Path::new("/tmp/notes.txt")), "plain text");
    assert!(!preview.is_available());
}

#[test]
fn markdown_extension_is_enough_without_syntax() {
    let mut preview = MarkdownPreview::new();
    for name in ["a.md", "a.markdown", "a.mdown", "a.mkd", "a.mkdown", "a.MD"] {
        preview.evaluate_availability(Some(Path::new(name)), "no syntax here");
        assert!(preview.is_available(), "extension {} should gate on", name);
    }
}

#[test]
fn each_heuristic_triggers_on_its_own() {
    let preview = MarkdownPreview::new();
    let samples = [
        "## Heading",
        "- list item",
        "  1. ordered item",
        "```\ncode\n```",
        "uses `inline` code",
        "[label](https://example.com)",
        "> quoted line",
    ];
    for sample in samples {
        assert!(
            preview.has_markdown_syntax(sample),
            "sample {:?} should match",
            sample
        );
    }
    assert!(!preview.has_markdown_syntax("nothing special here"));
    assert!(!preview.has_markdown_syntax(""));
}

#[test]
fn mode_cycles_in_fixed_order() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# Title");

    assert_eq!(preview.mode(), PreviewMode::Off);
    preview.cycle_mode("# Title", palette());
    assert_eq!(preview.mode(), PreviewMode::Reading);
    preview.cycle_mode("# Title", palette());
    assert_eq!(preview.mode(), PreviewMode::Sidebar);
    preview.cycle_mode("# Title", palette());
    assert_eq!(preview.mode(), PreviewMode::Off);
}

#[test]
fn cycling_while_unavailable_is_a_noop() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "plain");
    preview.cycle_mode("plain", palette());
    assert_eq!(preview.mode(), PreviewMode::Off);

    preview.set_mode(PreviewMode::Reading, "plain", palette());
    assert_eq!(preview.mode(), PreviewMode::Off);
}

#[test]
fn losing_availability_forces_off() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# Title");
    preview.set_mode(PreviewMode::Reading, "# Title", palette());
    assert_eq!(preview.mode(), PreviewMode::Reading);

    // The heading is deleted and the path is not markdown.
    preview.evaluate_availability(Some(Path::new("/tmp/a.txt")), "Title");
    assert!(!preview.is_available());
    assert_eq!(preview.mode(), PreviewMode::Off);
    assert!(preview.rendered().is_empty());
}

#[test]
fn activating_a_mode_renders_the_source() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# Title");
    preview.set_mode(PreviewMode::Reading, "# Title\n\nbody text", palette());

    assert!(!preview.rendered().is_empty());
    let all_text: String = preview
        .rendered()
        .iter()
        .flat_map(|l| l.spans.iter())
        .map(|s| s.content.to_string())
        .collect();
    assert!(all_text.contains("Title"));
    assert!(all_text.contains("body text"));
}

#[test]
fn link_destinations_are_always_visible() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "[docs](https://example.com/docs)");
    preview.set_mode(
        PreviewMode::Reading,
        "[docs](https://example.com/docs)",
        palette(),
    );

    let all_text: String = preview
        .rendered()
        .iter()
        .flat_map(|l| l.spans.iter())
        .map(|s| s.content.to_string())
        .collect();
    assert!(all_text.contains("docs"));
    assert!(all_text.contains("https://example.com/docs"));
}

#[test]
fn identical_source_short_circuits_unless_forced() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# One");
    preview.set_mode(PreviewMode::Reading, "# One", palette());
    let first_len = preview.rendered().len();

    // Same source again: no change either way.
    preview.render("# One", false, palette());
    assert_eq!(preview.rendered().len(), first_len);

    // New source renders.
    preview.render("# One\n\n- item", false, palette());
    assert!(preview.rendered().len() > first_len);
}

#[test]
fn off_mode_never_renders() {
    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# Title");
    preview.render("# Title", true, palette());
    assert!(preview.rendered().is_empty());
}

#[test]
fn reading_scroll_mirrors_editor_ratio_after_throttle() {
    use std::time::{Duration, Instant};

    let mut preview = MarkdownPreview::new();
    let source: String = (0..100).map(|i| format!("line {}\n\n", i)).collect();
    preview.evaluate_availability(None, "# any");
    preview.set_mode(PreviewMode::Reading, &source, palette());
    let rendered_len = preview.rendered().len();
    assert!(rendered_len > 20);

    let now = Instant::now();
    // Editor is halfway through its scrollable range.
    preview.note_editor_scroll(now, 50, 100);

    // Before the throttle window nothing moves.
    preview.poll_scroll(now + Duration::from_millis(10), 10);
    assert_eq!(preview.scroll_row, 0);

    preview.poll_scroll(now + Duration::from_millis(60), 10);
    let expected = ((rendered_len - 10) as f64 * 0.5).round() as usize;
    assert_eq!(preview.scroll_row, expected);
}

#[test]
fn scroll_sync_is_inert_outside_reading_mode() {
    use std::time::{Duration, Instant};

    let mut preview = MarkdownPreview::new();
    preview.evaluate_availability(None, "# any");
    preview.set_mode(PreviewMode::Sidebar, "# any\n\nbody", palette());

    let now = Instant::now();
    preview.note_editor_scroll(now, 10, 20);
    preview.poll_scroll(now + Duration::from_millis(100), 5);
    assert_eq!(preview.scroll_row, 0);
}

#[test]
fn fenced_code_and_quotes_render_line_structures() {
    let mut preview = MarkdownPreview::new();
    let source = "```rust\nlet x = 1;\n```\n\n> quoted";
    preview.evaluate_availability(None, source);
    preview.set_mode(PreviewMode::Sidebar, source, palette());

    let all_text: String = preview
        .rendered()
        .iter()
        .flat_map(|l| l.spans.iter())
        .map(|s| s.content.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(all_text.contains("let x = 1;"));
    assert!(all_text.contains("quoted"));
}
