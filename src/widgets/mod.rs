pub mod config;
pub mod editor;
pub mod modal;
pub mod quick_search;
pub mod status_bar;
pub mod tabs_panel;
pub mod toast;

pub use config::{ConfigPanel, ConfigRow, ConfigView, FONT_FAMILIES};
pub use status_bar::{SlotAlignment, StatusBar, StatusSlot};
