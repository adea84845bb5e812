use std::collections::VecDeque;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::{
    backend::CrosstermBackend,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    Terminal,
};
use tokio::task::JoinHandle;

use crate::bridge::{is_cancelled, FileBridge, WindowTitle};
use crate::debounce::{Debounced, IntervalTimer};
use crate::editor::{CursorMovement, DraftGuard, EditSurface};
use crate::events::{AppEvent, EventBus};
use crate::preview::MarkdownPreview;
use crate::settings::{Action, SettingsManager};
use crate::shortcuts::{RecordOutcome, ShortcutDispatcher, ShortcutRecorder};
use crate::status::StatusState;
use crate::store::PersistentStore;
use crate::tabs::{file_name_of, QuickSearch, TabStore};
use crate::theme::ThemeManager;
use crate::update::{AssetType, ReleaseChecker, UpdateStatus};
use crate::widgets::config::{ConfigPanel, ConfigRow, FONT_FAMILIES};
use crate::widgets::status_bar::{SlotAlignment, StatusBar, StatusSlot};
use crate::widgets::toast::{ToastManager, ToastType};

const SMART_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);
const THEME_APPLY_DEBOUNCE: Duration = Duration::from_millis(100);
const FONT_APPLY_DEBOUNCE: Duration = Duration::from_millis(50);

/// A pending modal dialog. Dialogs queue: the next one shows once the
/// current is dismissed.
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
}

pub enum DialogKind {
    /// Acknowledge-only.
    Message,
    /// Accept/cancel with a follow-up action on resolution.
    Confirm(PendingAction),
}

/// What a confirmed dialog does next.
#[derive(Debug, Clone, Copy)]
pub enum PendingAction {
    /// First stage of the close flow: offer to save unsaved changes.
    SaveBeforeClose { tab_id: u64 },
    /// Second stage: actually close the tab.
    ConfirmClose { tab_id: u64 },
    /// Restore all settings to defaults.
    ResetConfig,
}

/// A single-line input overlay for paths and names.
pub struct Prompt {
    pub title: String,
    pub input: String,
    pub kind: PromptKind,
}

pub enum PromptKind {
    OpenPath,
    SaveAsPath {
        tab_id: u64,
        /// Set when the prompt belongs to a close flow: the close
        /// confirmation follows no matter how the save attempt ends.
        then_close: bool,
    },
    RenameTab {
        tab_id: u64,
    },
}

/// Composition root: owns every component and drives the frame loop.
pub struct App {
    pub running: bool,
    pub store: PersistentStore,
    pub settings: SettingsManager,
    pub themes: ThemeManager,
    pub bus: EventBus,
    pub tabs: TabStore,
    pub surface: EditSurface,
    pub draft: DraftGuard,
    pub bridge: FileBridge,
    pub dispatcher: ShortcutDispatcher,
    pub recorder: ShortcutRecorder,
    pub preview: MarkdownPreview,
    pub status: StatusState,
    pub status_bar: StatusBar,
    pub toasts: ToastManager,
    pub config: ConfigPanel,
    pub quick_search: Option<QuickSearch>,
    pub prompt: Option<Prompt>,
    dialogs: VecDeque<Dialog>,

    autosave: Option<IntervalTimer>,
    smart_autosave: Debounced<()>,
    theme_apply: Debounced<String>,
    font_apply: Debounced<()>,
    update_task: Option<JoinHandle<Result<UpdateStatus>>>,

    /// Viewport heights captured during the last render, used for paging
    /// and scroll mirroring.
    pub editor_height: u16,
    pub preview_height: u16,
    last_scroll_row: usize,
}

impl App {
    pub fn new() -> Self {
        Self::with_config_dir(&PersistentStore::default_dir())
    }

    /// Construct against an explicit config directory (tests point this
    /// at a temp dir).
    pub fn with_config_dir(config_dir: &Path) -> Self {
        let store = PersistentStore::new(config_dir);
        let settings = SettingsManager::load(&store);
        let mut themes = ThemeManager::new();
        themes.apply(settings.theme());

        let bus = EventBus::new();
        let mut tabs = TabStore::new(bus.sender());
        let mut surface = EditSurface::new();
        tabs.ensure_not_empty(&mut surface);

        let bridge = FileBridge::new(&store);
        let autosave_enabled = settings.is_autosave_enabled();
        let autosave_interval = settings.autosave_interval_ms();

        let mut app = Self {
            running: true,
            store,
            settings,
            themes,
            bus,
            tabs,
            surface,
            draft: DraftGuard::new(),
            bridge,
            dispatcher: ShortcutDispatcher::new(),
            recorder: ShortcutRecorder::new(),
            preview: MarkdownPreview::new(),
            status: StatusState::new(),
            status_bar: StatusBar::new(),
            toasts: ToastManager::new(),
            config: ConfigPanel::new(),
            quick_search: None,
            prompt: None,
            dialogs: VecDeque::new(),
            autosave: autosave_enabled.then(|| {
                IntervalTimer::new(Instant::now(), Duration::from_millis(autosave_interval))
            }),
            smart_autosave: Debounced::new(SMART_AUTOSAVE_DEBOUNCE),
            theme_apply: Debounced::new(THEME_APPLY_DEBOUNCE),
            font_apply: Debounced::new(FONT_APPLY_DEBOUNCE),
            update_task: None,
            editor_height: 24,
            preview_height: 24,
            last_scroll_row: 0,
        };

        app.init_status_bar();
        app.apply_theme();
        app.restore_draft();
        app
    }

    /// Load a previous session's draft into the initial tab.
    fn restore_draft(&mut self) {
        if let Some(draft) = DraftGuard::load(&self.store) {
            if !draft.is_empty() {
                self.surface.set_text(&draft);
                self.tabs.flush_active(&self.surface);
                self.preview.evaluate_availability(None, &draft);
            }
        }
    }

    /// Open a file straight into the session (CLI argument). Reuses a
    /// pristine initial tab instead of leaving it dangling.
    pub async fn open_file(&mut self, path: &Path) -> Result<()> {
        let (path, content) = self.bridge.open(path, &mut self.store).await?;
        let reuse = self
            .tabs
            .active()
            .filter(|t| self.tabs.count() == 1 && t.file_path.is_none() && t.content.is_empty())
            .map(|t| t.id);
        match reuse {
            Some(id) => {
                self.tabs
                    .update_from_file(id, path.clone(), content, &mut self.surface)
            }
            None => {
                let id = self
                    .tabs
                    .create_tab(file_name_of(&path), Some(path.clone()), content);
                self.tabs.set_active(id, &mut self.surface);
            }
        }
        let source = self.surface.text();
        self.preview
            .handle_content_replaced(Some(&path), &source, self.themes.palette());
        WindowTitle::update(Some(&path));
        Ok(())
    }

    fn init_status_bar(&mut self) {
        self.status_bar.set_slot(
            StatusSlot::new("cursor", "Ln 1, Col 1")
                .with_alignment(SlotAlignment::Left)
                .with_priority(100),
        );
        self.status_bar.set_slot(
            StatusSlot::new("chars", "0 chars")
                .with_alignment(SlotAlignment::Left)
                .with_priority(90),
        );
        self.status_bar.set_slot(
            StatusSlot::new("format", "Plain text")
                .with_alignment(SlotAlignment::Left)
                .with_priority(80),
        );
        self.status_bar.set_slot(
            StatusSlot::new("path", "")
                .with_alignment(SlotAlignment::Left)
                .with_priority(70)
                .with_visibility(false),
        );
        self.status_bar.set_slot(
            StatusSlot::new("markdown", "")
                .with_alignment(SlotAlignment::Right)
                .with_priority(100)
                .with_visibility(false),
        );
    }

    /// Make the configured palette current and restyle everything that
    /// bakes colors instead of reading them per frame.
    fn apply_theme(&mut self) {
        self.themes.apply(self.settings.theme());
        let palette = self.themes.palette();
        self.status_bar.set_background_style(
            ratatui::style::Style::default()
                .bg(palette.panel_bg)
                .fg(palette.panel_fg),
        );
        let source = self.surface.text();
        self.preview.render(&source, true, palette);
    }

    pub fn push_dialog(&mut self, title: impl Into<String>, message: impl Into<String>, kind: DialogKind) {
        self.dialogs.push_back(Dialog {
            title: title.into(),
            message: message.into(),
            kind,
        });
    }

    pub fn current_dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    fn toast(&mut self, message: impl Into<String>, kind: ToastType) {
        self.bus.publish(AppEvent::Toast {
            message: message.into().into(),
            kind,
        });
    }

    /// Main event loop: fixed frame budget, non-blocking input poll,
    /// timer ticks between frames.
    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let frame_duration = Duration::from_millis(16);
        let mut last_frame = Instant::now();

        WindowTitle::update(self.bridge.current_path());

        while self.running {
            let now = Instant::now();
            self.tick(now).await;

            if now.duration_since(last_frame) >= frame_duration {
                terminal.draw(|f| self.render(f))?;
                last_frame = now;
            }

            if event::poll(Duration::from_millis(1))? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        self.handle_key(key).await?;
                    }
                    _ => {}
                }
            } else {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Teardown: flush the pending draft so nothing typed in the last
    /// debounce window is lost.
    pub fn shutdown(&mut self) {
        self.draft.flush(&self.surface, &mut self.store);
    }

    /// Per-frame work outside of input: event fan-out, timers, async task
    /// completion.
    pub async fn tick(&mut self, now: Instant) {
        self.process_events();

        self.draft.poll(now, &self.surface, &mut self.store);

        if self.smart_autosave.take_due(now).is_some() {
            let has_path = self
                .tabs
                .active()
                .is_some_and(|t| t.file_path.is_some());
            if has_path {
                self.handle_save().await;
            }
        }

        let autosave_due = self
            .autosave
            .as_mut()
            .map(|timer| timer.due(now))
            .unwrap_or(false);
        if autosave_due {
            let has_path = self
                .tabs
                .active()
                .is_some_and(|t| t.file_path.is_some());
            if has_path {
                self.handle_save().await;
            }
        }

        if let Some(theme_id) = self.theme_apply.take_due(now) {
            self.settings.set_theme(theme_id, &mut self.store);
            self.apply_theme();
        }

        if self.font_apply.take_due(now).is_some() {
            if let Ok(size) = self.config.font_size_input.parse::<u16>() {
                // Out-of-range values stay pending until committed with
                // Enter, which surfaces the validation dialog.
                let _ = self.settings.set_font_size(size, &mut self.store);
            }
        }

        self.preview.poll_scroll(now, self.preview_height as usize);
        let source = self.surface.text();
        self.preview.render_pending(&source, self.themes.palette());

        self.toasts.update();
        self.poll_update_task().await;
    }

    fn process_events(&mut self) {
        for event in self.bus.drain() {
            match event {
                AppEvent::TabChanged { .. } => {
                    let path = self.tabs.active().and_then(|t| t.file_path.clone());
                    let source = self.surface.text();
                    self.preview.handle_content_replaced(
                        path.as_deref(),
                        &source,
                        self.themes.palette(),
                    );
                    self.draft.record_set(&self.surface, &mut self.store);
                    WindowTitle::update(path.as_deref());
                }
                AppEvent::TabRenamed { new_path, .. } => {
                    let source = self.surface.text();
                    self.preview.handle_content_replaced(
                        Some(&new_path),
                        &source,
                        self.themes.palette(),
                    );
                    WindowTitle::update(Some(&new_path));
                }
                AppEvent::TabListChanged => {}
                AppEvent::ConfigSaved => {
                    self.apply_theme();
                    self.restart_autosave();
                }
                AppEvent::StatusMessage { message } => {
                    self.toasts.push(message.to_string(), ToastType::Info);
                }
                AppEvent::Toast { message, kind } => {
                    self.toasts.push(message.to_string(), kind);
                }
                AppEvent::Quit => {
                    self.running = false;
                }
            }
        }
    }

    fn restart_autosave(&mut self) {
        self.autosave = self.settings.is_autosave_enabled().then(|| {
            IntervalTimer::new(
                Instant::now(),
                Duration::from_millis(self.settings.autosave_interval_ms()),
            )
        });
    }

    pub fn toggle_autosave(&mut self) {
        let enabled = !self.settings.is_autosave_enabled();
        self.settings.set_autosave(enabled, &mut self.store);
        self.restart_autosave();
        let label = if enabled {
            "Autosave: on"
        } else {
            "Autosave: off"
        };
        self.bus.publish(AppEvent::StatusMessage {
            message: label.into(),
        });
    }

    async fn poll_update_task(&mut self) {
        let finished = self
            .update_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.update_task.take() else {
            return;
        };
        self.config.checking_update = false;
        match task.await {
            Ok(Ok(UpdateStatus::UpdateAvailable(info))) => {
                let asset_label = match info.asset_type {
                    Some(AssetType::Msi) => "MSI installer",
                    _ => "installer available",
                };
                self.config.update_status =
                    format!("v{} available ({})", info.version, asset_label);
                self.config.pending_update = Some(info);
            }
            Ok(Ok(UpdateStatus::UpToDate)) => {
                self.config.update_status = "No updates available".to_string();
                self.config.pending_update = None;
            }
            Ok(Err(err)) => {
                self.config.update_status = crate::update::classify_error(&err);
                self.config.pending_update = None;
            }
            Err(_) => {
                self.config.update_status = "Could not check for updates".to_string();
                self.config.pending_update = None;
            }
        }
    }

    // ---- key routing ----------------------------------------------------

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if !self.dialogs.is_empty() {
            self.handle_dialog_key(key).await;
            return Ok(());
        }
        if self.config.open {
            self.handle_config_key(key).await;
            return Ok(());
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key).await;
            return Ok(());
        }
        if self.quick_search.is_some() {
            self.handle_quick_search_key(key);
            return Ok(());
        }

        if let Some(action) = self.dispatcher.dispatch(&key, self.settings.shortcuts()) {
            self.run_action(action).await;
            return Ok(());
        }

        self.handle_editor_key(key).await;
        Ok(())
    }

    async fn run_action(&mut self, action: Action) {
        match action {
            Action::New => self.handle_new(),
            Action::Open => {
                let prefill = self
                    .bridge
                    .current_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.prompt = Some(Prompt {
                    title: "Open file".to_string(),
                    input: prefill,
                    kind: PromptKind::OpenPath,
                });
            }
            Action::Save => self.handle_save().await,
            Action::SaveAs => {
                if let Some(id) = self.tabs.active_id() {
                    self.start_save_as_prompt(id, false);
                }
            }
            Action::SearchTab => {
                self.quick_search = Some(QuickSearch::new());
            }
            Action::SwitchTab => {
                self.tabs.switch_to_next(&mut self.surface);
            }
            Action::Rename => self.start_rename_prompt(),
        }
    }

    pub fn handle_new(&mut self) {
        let id = self.tabs.create_tab("unnamed", None, "");
        self.tabs.set_active(id, &mut self.surface);
    }

    /// Save the active tab. Pathless (or placeholder-pathed) tabs fall
    /// through to save-as.
    pub async fn handle_save(&mut self) {
        let Some(id) = self.tabs.active_id() else { return };
        self.tabs.flush_active(&self.surface);
        let content = self.surface.text();

        let path = self.tabs.get(id).and_then(|t| {
            t.file_path.as_ref().and_then(|p| {
                let display = p.display().to_string();
                let trimmed = display.trim();
                if trimmed.is_empty() || trimmed == "unnamed" {
                    None
                } else {
                    Some(p.clone())
                }
            })
        });

        let Some(path) = path else {
            self.start_save_as_prompt(id, false);
            return;
        };

        match self.bridge.save(&content, &path, &mut self.store).await {
            Ok(saved_path) => {
                self.tabs
                    .update_from_file(id, saved_path.clone(), content, &mut self.surface);
                let source = self.surface.text();
                self.preview
                    .handle_content_replaced(Some(&saved_path), &source, self.themes.palette());
                WindowTitle::update(Some(&saved_path));
                self.toast(format!("Saved {}", file_name_of(&saved_path)), ToastType::Success);
            }
            Err(err) => {
                if !is_cancelled(&err) {
                    self.push_dialog(
                        "Error",
                        format!("Could not save the file: {}", err),
                        DialogKind::Message,
                    );
                }
            }
        }
    }

    fn start_save_as_prompt(&mut self, tab_id: u64, then_close: bool) {
        let prefill = self
            .tabs
            .get(tab_id)
            .and_then(|t| t.file_path.as_ref())
            .map(|p| p.display().to_string())
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.bridge.current_path().map(|p| p.display().to_string()))
            .unwrap_or_default();
        self.prompt = Some(Prompt {
            title: "Save as".to_string(),
            input: prefill,
            kind: PromptKind::SaveAsPath { tab_id, then_close },
        });
    }

    fn start_rename_prompt(&mut self) {
        let Some(tab) = self.tabs.active() else { return };
        // Renaming is only offered for tabs backed by a real file.
        if tab.file_path.is_none() {
            return;
        }
        self.prompt = Some(Prompt {
            title: "Rename file".to_string(),
            input: tab.name.clone(),
            kind: PromptKind::RenameTab { tab_id: tab.id },
        });
    }

    /// Begin the close flow for a tab: offer to save unsaved work, then
    /// require an explicit close confirmation.
    pub fn begin_close(&mut self, tab_id: u64, skip_confirm: bool) {
        if self.tabs.get(tab_id).is_none() {
            return;
        }
        if skip_confirm {
            self.tabs.remove(tab_id, &mut self.surface);
            return;
        }
        if self.tabs.active_id() == Some(tab_id) {
            self.tabs.flush_active(&self.surface);
        }
        if self.tabs.has_unsaved(tab_id, &self.surface) {
            self.push_dialog(
                "Save changes",
                "Do you want to save the changes before closing?",
                DialogKind::Confirm(PendingAction::SaveBeforeClose { tab_id }),
            );
        } else {
            self.push_confirm_close(tab_id);
        }
    }

    fn push_confirm_close(&mut self, tab_id: u64) {
        self.push_dialog(
            "Close tab",
            "Are you sure you want to close this tab?",
            DialogKind::Confirm(PendingAction::ConfirmClose { tab_id }),
        );
    }

    async fn handle_dialog_key(&mut self, key: KeyEvent) {
        let accepted = match key.code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => false,
            _ => return,
        };
        let Some(dialog) = self.dialogs.pop_front() else { return };
        match dialog.kind {
            DialogKind::Message => {}
            DialogKind::Confirm(action) => self.resolve_pending(action, accepted).await,
        }
    }

    async fn resolve_pending(&mut self, action: PendingAction, accepted: bool) {
        match action {
            PendingAction::SaveBeforeClose { tab_id } => {
                if accepted {
                    self.save_then_confirm_close(tab_id).await;
                } else {
                    self.push_confirm_close(tab_id);
                }
            }
            PendingAction::ConfirmClose { tab_id } => {
                if accepted {
                    self.tabs.remove(tab_id, &mut self.surface);
                }
            }
            PendingAction::ResetConfig => {
                if accepted {
                    self.settings.reset_to_defaults(&mut self.store);
                    self.config.font_size_input = self.settings.font_size().to_string();
                    self.bus.publish(AppEvent::ConfigSaved);
                }
            }
        }
    }

    /// Save a closing tab and only then queue the close confirmation, so
    /// the second prompt always runs against post-save state. Pathless
    /// tabs detour through the save-as prompt, which re-queues the
    /// confirmation on resolution.
    async fn save_then_confirm_close(&mut self, tab_id: u64) {
        if self.tabs.active_id() != Some(tab_id) {
            self.tabs.set_active(tab_id, &mut self.surface);
        }
        let has_path = self
            .tabs
            .get(tab_id)
            .is_some_and(|t| t.file_path.is_some());
        if has_path {
            self.handle_save().await;
            self.push_confirm_close(tab_id);
        } else {
            self.start_save_as_prompt(tab_id, true);
        }
    }

    async fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                // Dismissal is the cancellation sentinel: swallowed, with
                // one exception. A close-flow save still proceeds to the
                // close confirmation.
                if let Some(prompt) = self.prompt.take() {
                    if let PromptKind::SaveAsPath {
                        tab_id,
                        then_close: true,
                    } = prompt.kind
                    {
                        self.push_confirm_close(tab_id);
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.finish_prompt(prompt).await;
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.input.push(c);
                }
            }
            _ => {}
        }
    }

    async fn finish_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim().to_string();
        match prompt.kind {
            PromptKind::OpenPath => {
                if input.is_empty() {
                    return;
                }
                self.finish_open(PathBuf::from(input)).await;
            }
            PromptKind::SaveAsPath { tab_id, then_close } => {
                if input.is_empty() {
                    if then_close {
                        self.push_confirm_close(tab_id);
                    }
                    return;
                }
                self.finish_save_as(tab_id, PathBuf::from(input)).await;
                if then_close {
                    self.push_confirm_close(tab_id);
                }
            }
            PromptKind::RenameTab { tab_id } => {
                self.finish_rename(tab_id, &input).await;
            }
        }
    }

    async fn finish_open(&mut self, path: PathBuf) {
        match self.bridge.open(&path, &mut self.store).await {
            Ok((path, content)) => {
                let id = self
                    .tabs
                    .create_tab(file_name_of(&path), Some(path.clone()), content);
                self.tabs.set_active(id, &mut self.surface);
                WindowTitle::update(Some(&path));
            }
            Err(err) => {
                if !is_cancelled(&err) {
                    self.push_dialog(
                        "Error",
                        format!("Could not open the file: {}", err),
                        DialogKind::Message,
                    );
                }
            }
        }
    }

    async fn finish_save_as(&mut self, tab_id: u64, path: PathBuf) {
        if self.tabs.active_id() != Some(tab_id) {
            self.tabs.set_active(tab_id, &mut self.surface);
        }
        self.tabs.flush_active(&self.surface);
        let content = self.surface.text();

        match self.bridge.save_as(&content, &path, &mut self.store).await {
            Ok(saved_path) => {
                self.tabs
                    .update_from_file(tab_id, saved_path.clone(), content, &mut self.surface);
                let source = self.surface.text();
                self.preview
                    .handle_content_replaced(Some(&saved_path), &source, self.themes.palette());
                WindowTitle::update(Some(&saved_path));
                self.toast(format!("Saved {}", file_name_of(&saved_path)), ToastType::Success);
            }
            Err(err) => {
                if !is_cancelled(&err) {
                    self.push_dialog(
                        "Error",
                        format!("Could not save the file: {}", err),
                        DialogKind::Message,
                    );
                }
            }
        }
    }

    async fn finish_rename(&mut self, tab_id: u64, new_name: &str) {
        let Some(tab) = self.tabs.get(tab_id) else { return };
        if new_name.is_empty() || new_name == tab.name {
            return;
        }
        let Some(old_path) = tab.file_path.clone() else { return };

        if self.tabs.active_id() == Some(tab_id) {
            self.tabs.flush_active(&self.surface);
        }
        let content = self
            .tabs
            .get(tab_id)
            .map(|t| t.content.clone())
            .unwrap_or_default();

        match self
            .bridge
            .rename(&old_path, new_name, &mut self.store)
            .await
        {
            Ok(new_path) => {
                self.tabs
                    .update_from_file(tab_id, new_path.clone(), content, &mut self.surface);
                self.bus.publish(AppEvent::TabRenamed { tab_id, new_path });
            }
            Err(err) => {
                // The displayed name was never changed, so it reverts by
                // itself; just surface the failure.
                self.push_dialog(
                    "Error",
                    format!("Could not rename the file: {}", err),
                    DialogKind::Message,
                );
            }
        }
    }

    fn handle_quick_search_key(&mut self, key: KeyEvent) {
        let Some(search) = self.quick_search.as_mut() else { return };
        match key.code {
            KeyCode::Esc => {
                self.quick_search = None;
            }
            KeyCode::Down => {
                let count = self.tabs.search(&search.query).len();
                search.move_selection(count, 1);
            }
            KeyCode::Up => {
                let count = self.tabs.search(&search.query).len();
                search.move_selection(count, -1);
            }
            KeyCode::Enter => {
                let selected = self
                    .tabs
                    .search(&search.query)
                    .get(search.selected)
                    .map(|t| t.id);
                if let Some(id) = selected {
                    self.tabs.set_active(id, &mut self.surface);
                }
                self.quick_search = None;
            }
            KeyCode::Backspace => {
                search.query.pop();
                let count = self.tabs.search(&search.query).len();
                search.clamp(count);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                search.query.push(c);
                let count = self.tabs.search(&search.query).len();
                search.clamp(count);
            }
            _ => {}
        }
    }

    async fn handle_config_key(&mut self, key: KeyEvent) {
        if let Some(action) = self.recorder.listening() {
            match self.recorder.handle_key(&key) {
                RecordOutcome::Captured(binding) => {
                    match self.settings.validate_shortcut(&binding, Some(action)) {
                        Ok(()) => {
                            self.settings.set_shortcut(action, binding, &mut self.store);
                        }
                        Err(conflict) => {
                            self.push_dialog(
                                "Shortcut conflict",
                                format!(
                                    "This shortcut is already assigned to: {}",
                                    conflict.label()
                                ),
                                DialogKind::Message,
                            );
                        }
                    }
                }
                RecordOutcome::Cancelled | RecordOutcome::Ignored => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.close_config();
            }
            KeyCode::Down => self.config.move_selection(1),
            KeyCode::Up => self.config.move_selection(-1),
            KeyCode::Enter => self.activate_config_row().await,
            KeyCode::Backspace => {
                if self.config.selected_row() == ConfigRow::FontSize {
                    self.config.font_size_input.pop();
                    self.font_apply.schedule(Instant::now(), ());
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.config.selected_row() == ConfigRow::FontSize {
                    self.config.font_size_input.push(c);
                    self.font_apply.schedule(Instant::now(), ());
                }
            }
            _ => {}
        }
    }

    pub fn open_config(&mut self) {
        self.config.show(&self.settings);
        self.dispatcher.suspended = true;
    }

    fn close_config(&mut self) {
        self.config.hide();
        self.recorder.cancel();
        self.dispatcher.suspended = false;
    }

    async fn activate_config_row(&mut self) {
        match self.config.selected_row() {
            ConfigRow::Shortcut(action) => {
                self.recorder.toggle(action);
            }
            ConfigRow::Theme => {
                let themes: Vec<&str> = ThemeManager::all().map(|t| t.id).collect();
                let current = self.settings.theme().to_string();
                let index = themes.iter().position(|id| *id == current).unwrap_or(0);
                let next = themes[(index + 1) % themes.len()].to_string();
                self.theme_apply.schedule(Instant::now(), next);
            }
            ConfigRow::FontFamily => {
                let current = self.settings.font_family().to_string();
                let index = FONT_FAMILIES
                    .iter()
                    .position(|f| *f == current)
                    .unwrap_or(0);
                let next = FONT_FAMILIES[(index + 1) % FONT_FAMILIES.len()];
                self.settings.set_font_family(next, &mut self.store);
            }
            ConfigRow::FontSize => {
                match self.config.font_size_input.parse::<u16>() {
                    Ok(size) => {
                        if let Err(err) = self.settings.set_font_size(size, &mut self.store) {
                            self.push_dialog("Invalid font size", err.to_string(), DialogKind::Message);
                            self.config.font_size_input = self.settings.font_size().to_string();
                        }
                    }
                    Err(_) => {
                        self.push_dialog(
                            "Invalid font size",
                            "Font size must be a number",
                            DialogKind::Message,
                        );
                        self.config.font_size_input = self.settings.font_size().to_string();
                    }
                }
            }
            ConfigRow::Update => self.handle_update_row().await,
            ConfigRow::Reset => {
                self.push_dialog(
                    "Restore settings",
                    "Restore every setting to its default value?",
                    DialogKind::Confirm(PendingAction::ResetConfig),
                );
            }
            ConfigRow::Save => self.save_config(),
        }
    }

    /// Settings save is blocked while any two shortcuts collide.
    fn save_config(&mut self) {
        let conflicts = self.settings.detect_conflicts();
        if !conflicts.is_empty() {
            let mut names: Vec<&str> = conflicts.iter().map(|a| a.label()).collect();
            names.sort_unstable();
            self.push_dialog(
                "Cannot save",
                format!(
                    "There are conflicting shortcuts: {}. Fix the conflicts before saving.",
                    names.join(", ")
                ),
                DialogKind::Message,
            );
            return;
        }
        self.close_config();
        self.bus.publish(AppEvent::ConfigSaved);
    }

    async fn handle_update_row(&mut self) {
        if self.config.checking_update {
            return;
        }
        if let Some(update) = self.config.pending_update.take() {
            let Some(ref url) = update.download_url else {
                self.config.update_status = "No pending update".to_string();
                return;
            };
            match ReleaseChecker::open_download(url) {
                Ok(()) => {
                    let message = match update.asset_type {
                        Some(AssetType::Msi) => {
                            "Download started. Install the MSI and restart Jotter."
                        }
                        _ => "Download started. Install and restart Jotter.",
                    };
                    self.config.update_status = message.to_string();
                }
                Err(err) => {
                    self.config.update_status = err.to_string();
                    // Keep the pending update so the user can retry.
                    self.config.pending_update = Some(update);
                }
            }
            return;
        }

        self.config.checking_update = true;
        self.config.update_status.clear();
        self.update_task = Some(tokio::task::spawn_blocking(|| {
            ReleaseChecker::new().check()
        }));
    }

    async fn handle_editor_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        let page = self.editor_height.saturating_sub(1).max(1) as usize;
        let mut edited = false;

        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.bus.publish(AppEvent::Quit);
                return;
            }
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                if let Some(id) = self.tabs.active_id() {
                    self.begin_close(id, false);
                }
                return;
            }
            (KeyCode::Char('m'), KeyModifiers::CONTROL) => {
                let source = self.surface.text();
                self.preview.cycle_mode(&source, self.themes.palette());
                return;
            }
            (KeyCode::Char(','), KeyModifiers::CONTROL) => {
                self.open_config();
                return;
            }
            (KeyCode::Char('a'), KeyModifiers::ALT) => {
                self.toggle_autosave();
                return;
            }
            (KeyCode::Char('s'), KeyModifiers::ALT) => {
                self.tabs.toggle_sort_order();
                return;
            }
            (KeyCode::Char(c), mods)
                if !mods.contains(KeyModifiers::CONTROL) && !mods.contains(KeyModifiers::ALT) =>
            {
                self.surface.insert_char(c);
                edited = true;
            }
            (KeyCode::Enter, _) => {
                self.surface.insert_newline();
                edited = true;
                if self.settings.is_smart_autosave_enabled() {
                    self.smart_autosave.schedule(now, ());
                }
            }
            (KeyCode::Tab, KeyModifiers::NONE) => {
                for _ in 0..4 {
                    self.surface.insert_char(' ');
                }
                edited = true;
            }
            (KeyCode::Backspace, _) => {
                self.surface.backspace();
                edited = true;
            }
            (KeyCode::Delete, _) => {
                self.surface.delete();
                edited = true;
            }
            (KeyCode::Up, _) => self.surface.move_cursor(CursorMovement::Up),
            (KeyCode::Down, _) => self.surface.move_cursor(CursorMovement::Down),
            (KeyCode::Left, _) => self.surface.move_cursor(CursorMovement::Left),
            (KeyCode::Right, _) => self.surface.move_cursor(CursorMovement::Right),
            (KeyCode::Home, mods) => {
                let movement = if mods.contains(KeyModifiers::CONTROL) {
                    CursorMovement::BufferStart
                } else {
                    CursorMovement::LineStart
                };
                self.surface.move_cursor(movement);
            }
            (KeyCode::End, mods) => {
                let movement = if mods.contains(KeyModifiers::CONTROL) {
                    CursorMovement::BufferEnd
                } else {
                    CursorMovement::LineEnd
                };
                self.surface.move_cursor(movement);
            }
            (KeyCode::PageUp, _) => self.surface.move_cursor(CursorMovement::PageUp(page)),
            (KeyCode::PageDown, _) => self.surface.move_cursor(CursorMovement::PageDown(page)),
            _ => return,
        }

        self.surface.scroll_to_cursor(self.editor_height as usize);

        if edited {
            self.tabs.flush_active(&self.surface);
            self.draft.note_input(now);
            let path = self.tabs.active().and_then(|t| t.file_path.clone());
            let text = self.surface.text();
            self.preview.evaluate_availability(path.as_deref(), &text);
            self.preview.handle_input();
        }

        if self.surface.scroll_row != self.last_scroll_row {
            self.last_scroll_row = self.surface.scroll_row;
            let scrollable = self
                .surface
                .line_count()
                .saturating_sub(self.editor_height as usize);
            self.preview
                .note_editor_scroll(now, self.surface.scroll_row, scrollable);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
