//! Settings record and typed accessors.
//!
//! The whole configuration is one flat record serialized into the
//! persistent store under a single key. Every field carries a serde
//! default so partially-written or older blobs still load; a blob that
//! fails to parse at all resets the record to defaults wholesale.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::store::{PersistentStore, KEY_SETTINGS};

/// Inclusive font size bounds accepted by the config panel.
pub const FONT_SIZE_MIN: u16 = 8;
pub const FONT_SIZE_MAX: u16 = 48;

/// Logical editor actions that can carry a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Open,
    Save,
    SaveAs,
    New,
    SearchTab,
    SwitchTab,
    Rename,
}

impl Action {
    /// Every action, in the order the config panel lists them.
    pub const ALL: [Action; 7] = [
        Action::Open,
        Action::Save,
        Action::SaveAs,
        Action::New,
        Action::SearchTab,
        Action::SwitchTab,
        Action::Rename,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Open => "Open file",
            Action::Save => "Save",
            Action::SaveAs => "Save as",
            Action::New => "New file",
            Action::SearchTab => "Search tab",
            Action::SwitchTab => "Switch tab",
            Action::Rename => "Rename file",
        }
    }
}

/// One key chord bound to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutBinding {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    pub key: String,
}

impl ShortcutBinding {
    pub fn new(ctrl: bool, shift: bool, alt: bool, key: impl Into<String>) -> Self {
        Self {
            ctrl,
            shift,
            alt,
            key: key.into(),
        }
    }

    /// Two bindings collide iff the modifier set matches exactly and the
    /// keys compare equal case-insensitively.
    pub fn matches(&self, other: &ShortcutBinding) -> bool {
        self.ctrl == other.ctrl
            && self.shift == other.shift
            && self.alt == other.alt
            && self.key.to_lowercase() == other.key.to_lowercase()
    }

    /// Human-readable chord, e.g. `Ctrl + Shift + S`.
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if !self.key.is_empty() {
            if self.key == "Tab" || self.key.starts_with('F') {
                parts.push(self.key.clone());
            } else {
                parts.push(self.key.to_uppercase());
            }
        }
        if parts.is_empty() {
            "Unbound".to_string()
        } else {
            parts.join(" + ")
        }
    }
}

/// The persisted settings record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_autosave")]
    pub autosave: bool,

    /// Interval autosave period in milliseconds.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_ms: u64,

    /// Save shortly after the user finishes a line.
    #[serde(default = "default_smart_autosave")]
    pub smart_autosave: bool,

    #[serde(default = "default_shortcuts")]
    pub shortcuts: HashMap<Action, ShortcutBinding>,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: u16,

    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_autosave() -> bool {
    false
}
fn default_autosave_interval() -> u64 {
    30_000
}
fn default_smart_autosave() -> bool {
    true
}
fn default_font_family() -> String {
    "Consolas".to_string()
}
fn default_font_size() -> u16 {
    14
}
fn default_theme() -> String {
    "default".to_string()
}

fn default_shortcuts() -> HashMap<Action, ShortcutBinding> {
    HashMap::from([
        (Action::Open, ShortcutBinding::new(true, false, false, "o")),
        (Action::Save, ShortcutBinding::new(true, false, false, "s")),
        (Action::SaveAs, ShortcutBinding::new(true, true, false, "s")),
        (Action::New, ShortcutBinding::new(true, false, false, "n")),
        (
            Action::SearchTab,
            ShortcutBinding::new(true, false, false, "p"),
        ),
        (
            Action::SwitchTab,
            ShortcutBinding::new(true, false, false, "Tab"),
        ),
        (
            Action::Rename,
            ShortcutBinding::new(false, false, false, "F2"),
        ),
    ])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave: default_autosave(),
            autosave_interval_ms: default_autosave_interval(),
            smart_autosave: default_smart_autosave(),
            shortcuts: default_shortcuts(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            theme: default_theme(),
        }
    }
}

/// Typed accessor over the settings blob in the persistent store.
pub struct SettingsManager {
    settings: Settings,
}

impl SettingsManager {
    pub fn load(store: &PersistentStore) -> Self {
        let settings = store
            .get(KEY_SETTINGS)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn persist(&self, store: &mut PersistentStore) {
        if let Ok(raw) = serde_json::to_string(&self.settings) {
            store.set(KEY_SETTINGS, raw);
        }
    }

    pub fn is_autosave_enabled(&self) -> bool {
        self.settings.autosave
    }

    pub fn autosave_interval_ms(&self) -> u64 {
        self.settings.autosave_interval_ms
    }

    pub fn set_autosave(&mut self, enabled: bool, store: &mut PersistentStore) {
        self.settings.autosave = enabled;
        self.persist(store);
    }

    pub fn is_smart_autosave_enabled(&self) -> bool {
        self.settings.smart_autosave
    }

    pub fn set_smart_autosave(&mut self, enabled: bool, store: &mut PersistentStore) {
        self.settings.smart_autosave = enabled;
        self.persist(store);
    }

    pub fn shortcuts(&self) -> &HashMap<Action, ShortcutBinding> {
        &self.settings.shortcuts
    }

    pub fn shortcut(&self, action: Action) -> Option<&ShortcutBinding> {
        self.settings.shortcuts.get(&action)
    }

    pub fn set_shortcut(
        &mut self,
        action: Action,
        binding: ShortcutBinding,
        store: &mut PersistentStore,
    ) {
        self.settings.shortcuts.insert(action, binding);
        self.persist(store);
    }

    pub fn font_family(&self) -> &str {
        &self.settings.font_family
    }

    pub fn set_font_family(&mut self, family: impl Into<String>, store: &mut PersistentStore) {
        self.settings.font_family = family.into();
        self.persist(store);
    }

    pub fn font_size(&self) -> u16 {
        self.settings.font_size
    }

    /// Rejects sizes outside the accepted range; the stored value is
    /// untouched on failure.
    pub fn set_font_size(&mut self, size: u16, store: &mut PersistentStore) -> Result<()> {
        if !(FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&size) {
            return Err(anyhow!(
                "Font size must be between {} and {}",
                FONT_SIZE_MIN,
                FONT_SIZE_MAX
            ));
        }
        self.settings.font_size = size;
        self.persist(store);
        Ok(())
    }

    pub fn theme(&self) -> &str {
        &self.settings.theme
    }

    pub fn set_theme(&mut self, theme: impl Into<String>, store: &mut PersistentStore) {
        self.settings.theme = theme.into();
        self.persist(store);
    }

    /// Check a candidate binding against every other bound action.
    /// Returns the first colliding action.
    pub fn validate_shortcut(
        &self,
        candidate: &ShortcutBinding,
        exclude: Option<Action>,
    ) -> Result<(), Action> {
        for (&action, existing) in &self.settings.shortcuts {
            if Some(action) == exclude {
                continue;
            }
            if candidate.matches(existing) {
                return Err(action);
            }
        }
        Ok(())
    }

    /// All actions involved in any pairwise binding collision.
    pub fn detect_conflicts(&self) -> HashSet<Action> {
        let mut conflicts = HashSet::new();
        let entries: Vec<(&Action, &ShortcutBinding)> = self.settings.shortcuts.iter().collect();
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                if entries[i].1.matches(entries[j].1) {
                    conflicts.insert(*entries[i].0);
                    conflicts.insert(*entries[j].0);
                }
            }
        }
        conflicts
    }

    /// Restore every setting to its default and persist the result.
    pub fn reset_to_defaults(&mut self, store: &mut PersistentStore) {
        self.settings = Settings::default();
        self.persist(store);
    }
}
