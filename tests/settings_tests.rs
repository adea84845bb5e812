//! Integration tests for the settings record, shortcut bindings and
//! conflict validation.

use tempfile::TempDir;

use jotter::settings::{Action, SettingsManager, ShortcutBinding};
use jotter::store::{PersistentStore, KEY_SETTINGS};

fn fresh_manager() -> (TempDir, PersistentStore, SettingsManager) {
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::new(dir.path());
    let settings = SettingsManager::load(&store);
    (dir, store, settings)
}

#[test]
fn defaults_cover_every_field() {
    let (_dir, _store, settings) = fresh_manager();

    assert!(!settings.is_autosave_enabled());
    assert_eq!(settings.autosave_interval_ms(), 30_000);
    assert!(settings.is_smart_autosave_enabled());
    assert_eq!(settings.font_family(), "Consolas");
    assert_eq!(settings.font_size(), 14);
    assert_eq!(settings.theme(), "default");

    for action in Action::ALL {
        assert!(
            settings.shortcut(action).is_some(),
            "missing default binding for {:?}",
            action
        );
    }
    assert_eq!(
        settings.shortcut(Action::SwitchTab).unwrap(),
        &ShortcutBinding::new(true, false, false, "Tab")
    );
    assert_eq!(
        settings.shortcut(Action::Rename).unwrap(),
        &ShortcutBinding::new(false, false, false, "F2")
    );
}

#[test]
fn bindings_match_case_insensitively() {
    let lower = ShortcutBinding::new(true, false, false, "s");
    let upper = ShortcutBinding::new(true, false, false, "S");
    assert!(lower.matches(&upper));
}

#[test]
fn modifier_differences_are_not_conflicts() {
    let save = ShortcutBinding::new(true, false, false, "s");
    let save_as = ShortcutBinding::new(true, true, false, "s");
    let bare = ShortcutBinding::new(false, false, false, "s");

    assert!(!save.matches(&save_as));
    assert!(!save.matches(&bare));
}

#[test]
fn validate_detects_conflict_and_names_the_action() {
    let (_dir, _store, settings) = fresh_manager();

    // ctrl+S collides with the default save binding.
    let candidate = ShortcutBinding::new(true, false, false, "S");
    assert_eq!(
        settings.validate_shortcut(&candidate, None),
        Err(Action::Save)
    );

    // Validating save's own binding against itself is fine.
    assert_eq!(
        settings.validate_shortcut(&candidate, Some(Action::Save)),
        Ok(())
    );
}

#[test]
fn rebinding_rename_to_plain_s_is_not_a_conflict() {
    let (_dir, _store, settings) = fresh_manager();
    let candidate = ShortcutBinding::new(false, false, false, "s");
    assert_eq!(
        settings.validate_shortcut(&candidate, Some(Action::Rename)),
        Ok(())
    );
}

#[test]
fn detect_conflicts_reports_both_sides() {
    let (_dir, mut store, mut settings) = fresh_manager();
    settings.set_shortcut(
        Action::New,
        ShortcutBinding::new(true, false, false, "S"),
        &mut store,
    );

    let conflicts = settings.detect_conflicts();
    assert!(conflicts.contains(&Action::New));
    assert!(conflicts.contains(&Action::Save));
    assert_eq!(conflicts.len(), 2);
}

#[test]
fn settings_round_trip_through_the_store() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = PersistentStore::new(dir.path());
        let mut settings = SettingsManager::load(&store);
        settings.set_theme("gruvbox-dark", &mut store);
        settings.set_font_size(20, &mut store).unwrap();
        settings.set_shortcut(
            Action::Open,
            ShortcutBinding::new(true, true, false, "o"),
            &mut store,
        );
    }

    let store = PersistentStore::new(dir.path());
    let settings = SettingsManager::load(&store);
    assert_eq!(settings.theme(), "gruvbox-dark");
    assert_eq!(settings.font_size(), 20);
    assert_eq!(
        settings.shortcut(Action::Open).unwrap(),
        &ShortcutBinding::new(true, true, false, "o")
    );
}

#[test]
fn corrupt_settings_blob_resets_to_defaults() {
    let (_dir, mut store, _settings) = fresh_manager();
    store.set(KEY_SETTINGS, "{definitely not json");

    let settings = SettingsManager::load(&store);
    assert_eq!(settings.theme(), "default");
    assert_eq!(settings.font_size(), 14);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let (_dir, mut store, _settings) = fresh_manager();
    store.set(KEY_SETTINGS, r#"{"theme":"ayu-dark"}"#);

    let settings = SettingsManager::load(&store);
    assert_eq!(settings.theme(), "ayu-dark");
    assert_eq!(settings.font_size(), 14);
    assert!(settings.shortcut(Action::Save).is_some());
}

#[test]
fn unknown_fields_are_ignored() {
    let (_dir, mut store, _settings) = fresh_manager();
    store.set(
        KEY_SETTINGS,
        r#"{"theme":"ayu-dark","someFutureSetting":42}"#,
    );

    let settings = SettingsManager::load(&store);
    assert_eq!(settings.theme(), "ayu-dark");
}

#[test]
fn font_size_bounds_are_inclusive() {
    let (_dir, mut store, mut settings) = fresh_manager();

    assert!(settings.set_font_size(7, &mut store).is_err());
    assert_eq!(settings.font_size(), 14);

    assert!(settings.set_font_size(8, &mut store).is_ok());
    assert!(settings.set_font_size(48, &mut store).is_ok());

    assert!(settings.set_font_size(49, &mut store).is_err());
    assert_eq!(settings.font_size(), 48);
}

#[test]
fn reset_restores_defaults_after_changes() {
    let (_dir, mut store, mut settings) = fresh_manager();
    settings.set_theme("ayu-dark", &mut store);
    settings.set_autosave(true, &mut store);

    settings.reset_to_defaults(&mut store);
    assert_eq!(settings.theme(), "default");
    assert!(!settings.is_autosave_enabled());

    let reloaded = SettingsManager::load(&store);
    assert_eq!(reloaded.theme(), "default");
}

#[test]
fn binding_display_formats_chords() {
    assert_eq!(
        ShortcutBinding::new(true, true, false, "s").display(),
        "Ctrl + Shift + S"
    );
    assert_eq!(
        ShortcutBinding::new(false, false, false, "F2").display(),
        "F2"
    );
    assert_eq!(
        ShortcutBinding::new(true, false, false, "Tab").display(),
        "Ctrl + Tab"
    );
}
