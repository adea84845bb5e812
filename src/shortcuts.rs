//! Global shortcut routing and rebinding.
//!
//! The dispatcher turns raw key events into logical [`Action`]s by
//! matching them against the user's binding table; the recorder implements
//! the modal "press the new chord" flow used by the config panel.

use std::collections::HashMap;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::settings::{Action, ShortcutBinding};

/// Application-scope actions checked first, in priority order.
const APP_SCOPE: [Action; 4] = [Action::Open, Action::SaveAs, Action::Save, Action::New];
/// Tab-scope actions checked after the app scope.
const TAB_SCOPE: [Action; 3] = [Action::SwitchTab, Action::SearchTab, Action::Rename];

/// Normalized key label for a key event, mirroring how bindings store
/// their `key` field. Keys that cannot carry a binding map to `None`.
pub fn key_label(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Tab | KeyCode::BackTab => Some("Tab".to_string()),
        KeyCode::F(n) => Some(format!("F{}", n)),
        KeyCode::Enter => Some("Enter".to_string()),
        KeyCode::Backspace => Some("Backspace".to_string()),
        KeyCode::Delete => Some("Delete".to_string()),
        KeyCode::Insert => Some("Insert".to_string()),
        KeyCode::Home => Some("Home".to_string()),
        KeyCode::End => Some("End".to_string()),
        KeyCode::PageUp => Some("PageUp".to_string()),
        KeyCode::PageDown => Some("PageDown".to_string()),
        KeyCode::Up => Some("ArrowUp".to_string()),
        KeyCode::Down => Some("ArrowDown".to_string()),
        KeyCode::Left => Some("ArrowLeft".to_string()),
        KeyCode::Right => Some("ArrowRight".to_string()),
        _ => None,
    }
}

fn ctrl_or_meta(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
}

/// Whether a key event satisfies a binding: ctrl means "Ctrl or Meta
/// pressed" (and its absence means neither), shift and alt match exactly,
/// and keys compare case-insensitively with `Tab` special-cased so a
/// bound Tab matches regardless of shift-induced BackTab reporting.
pub fn binding_matches(binding: &ShortcutBinding, key: &KeyEvent) -> bool {
    let ctrl_match = if binding.ctrl {
        ctrl_or_meta(key.modifiers)
    } else {
        !ctrl_or_meta(key.modifiers)
    };
    let shift_match = binding.shift == key.modifiers.contains(KeyModifiers::SHIFT);
    let alt_match = binding.alt == key.modifiers.contains(KeyModifiers::ALT);
    let key_match = match key_label(key.code) {
        Some(label) => {
            label.eq_ignore_ascii_case(&binding.key)
                || (binding.key == "Tab" && matches!(key.code, KeyCode::Tab | KeyCode::BackTab))
        }
        None => false,
    };
    ctrl_match && shift_match && alt_match && key_match
}

/// Routes key-down events to editor actions.
pub struct ShortcutDispatcher {
    /// Set while a modal configuration surface is open; gates dispatch
    /// entirely.
    pub suspended: bool,
}

impl ShortcutDispatcher {
    pub fn new() -> Self {
        Self { suspended: false }
    }

    /// First matching action in priority order, or `None`. A returned
    /// action consumes the event.
    pub fn dispatch(
        &self,
        key: &KeyEvent,
        shortcuts: &HashMap<Action, ShortcutBinding>,
    ) -> Option<Action> {
        if self.suspended {
            return None;
        }
        APP_SCOPE
            .iter()
            .chain(TAB_SCOPE.iter())
            .copied()
            .find(|action| {
                shortcuts
                    .get(action)
                    .is_some_and(|binding| binding_matches(binding, key))
            })
    }
}

impl Default for ShortcutDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of feeding one key event to an active recording session.
#[derive(Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Not a recordable press (bare modifier, unmodified plain key);
    /// keep listening.
    Ignored,
    /// Escape pressed; the session ended without change.
    Cancelled,
    /// A valid chord was captured; the caller validates and commits it.
    Captured(ShortcutBinding),
}

/// Modal "listening" state for rebinding one action at a time.
pub struct ShortcutRecorder {
    listening: Option<Action>,
}

impl ShortcutRecorder {
    pub fn new() -> Self {
        Self { listening: None }
    }

    pub fn listening(&self) -> Option<Action> {
        self.listening
    }

    /// Begin recording for an action; invoking it again for the same
    /// action toggles the session off.
    pub fn toggle(&mut self, action: Action) {
        if self.listening == Some(action) {
            self.listening = None;
        } else {
            self.listening = Some(action);
        }
    }

    pub fn cancel(&mut self) {
        self.listening = None;
    }

    /// Accepts only presses that are modifier-chorded or one of the
    /// twelve function keys; bare modifier presses are skipped.
    pub fn handle_key(&mut self, key: &KeyEvent) -> RecordOutcome {
        if self.listening.is_none() {
            return RecordOutcome::Ignored;
        }
        if key.code == KeyCode::Esc {
            self.listening = None;
            return RecordOutcome::Cancelled;
        }
        if matches!(key.code, KeyCode::Modifier(_)) {
            return RecordOutcome::Ignored;
        }

        let chorded = ctrl_or_meta(key.modifiers)
            || key.modifiers.contains(KeyModifiers::SHIFT)
            || key.modifiers.contains(KeyModifiers::ALT);
        let function_key = matches!(key.code, KeyCode::F(n) if (1..=12).contains(&n));
        if !chorded && !function_key {
            return RecordOutcome::Ignored;
        }

        let Some(label) = key_label(key.code) else {
            return RecordOutcome::Ignored;
        };

        self.listening = None;
        RecordOutcome::Captured(ShortcutBinding::new(
            ctrl_or_meta(key.modifiers),
            key.modifiers.contains(KeyModifiers::SHIFT),
            key.modifiers.contains(KeyModifiers::ALT),
            label,
        ))
    }
}

impl Default for ShortcutRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn ctrl_binding_matches_meta_too() {
        let binding = ShortcutBinding::new(true, false, false, "s");
        assert!(binding_matches(
            &binding,
            &key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        ));
        assert!(binding_matches(
            &binding,
            &key(KeyCode::Char('s'), KeyModifiers::SUPER)
        ));
        assert!(!binding_matches(
            &binding,
            &key(KeyCode::Char('s'), KeyModifiers::NONE)
        ));
    }

    #[test]
    fn shift_must_match_exactly() {
        let save = ShortcutBinding::new(true, false, false, "s");
        let save_as = ShortcutBinding::new(true, true, false, "s");
        let chord = key(
            KeyCode::Char('S'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert!(!binding_matches(&save, &chord));
        assert!(binding_matches(&save_as, &chord));
    }

    #[test]
    fn bound_tab_matches_backtab() {
        let binding = ShortcutBinding::new(true, false, false, "Tab");
        assert!(binding_matches(
            &binding,
            &key(KeyCode::Tab, KeyModifiers::CONTROL)
        ));
        assert!(binding_matches(
            &binding,
            &key(KeyCode::BackTab, KeyModifiers::CONTROL)
        ));
    }

    #[test]
    fn recorder_skips_plain_keys_and_accepts_function_keys() {
        let mut recorder = ShortcutRecorder::new();
        recorder.toggle(Action::Rename);

        assert_eq!(
            recorder.handle_key(&key(KeyCode::Char('x'), KeyModifiers::NONE)),
            RecordOutcome::Ignored
        );
        assert!(recorder.listening().is_some());

        let outcome = recorder.handle_key(&key(KeyCode::F(2), KeyModifiers::NONE));
        assert_eq!(
            outcome,
            RecordOutcome::Captured(ShortcutBinding::new(false, false, false, "F2"))
        );
        assert!(recorder.listening().is_none());
    }

    #[test]
    fn recorder_escape_cancels_without_change() {
        let mut recorder = ShortcutRecorder::new();
        recorder.toggle(Action::Save);
        assert_eq!(
            recorder.handle_key(&key(KeyCode::Esc, KeyModifiers::NONE)),
            RecordOutcome::Cancelled
        );
        assert!(recorder.listening().is_none());
    }
}
