use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::widgets::toast::ToastType;

/// Notifications emitted by the state layer and routed by the frame loop.
///
/// Observers (status bar, markdown preview, window title) never hook into
/// the stores directly; mutations publish onto the bus and the loop fans
/// the drained events out. This keeps the state layer free of rendering
/// concerns and testable without a terminal.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The active tab pointer moved (or was re-asserted).
    TabChanged { tab_id: u64 },

    /// A tab's backing file was renamed on disk.
    TabRenamed { tab_id: u64, new_path: PathBuf },

    /// Tabs were created, removed, re-sorted or re-labelled.
    TabListChanged,

    /// The config panel committed its changes.
    ConfigSaved,

    /// Transient text for the status line.
    StatusMessage { message: Arc<str> },

    /// Popup notification.
    Toast { message: Arc<str>, kind: ToastType },

    /// Application shutdown requested.
    Quit,
}

/// Cloneable publishing half of the bus, handed to state components.
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    pub fn publish(&self, event: AppEvent) {
        // The receiver lives as long as the app; a send failure only
        // happens during teardown and is safe to drop.
        let _ = self.sender.send(event);
    }
}

/// Event bus connecting state mutations to frame-loop observers.
pub struct EventBus {
    sender: EventSender,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: EventSender { sender },
            receiver,
        }
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn publish(&self, event: AppEvent) {
        self.sender.publish(event);
    }

    /// Pull everything queued since the last frame without blocking.
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
