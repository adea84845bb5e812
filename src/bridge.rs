//! Host-side file operations and window title management.
//!
//! All document I/O funnels through [`FileBridge`]. Operations fail with
//! descriptive errors; the one special case is the cancellation sentinel
//! produced when the user dismisses a path prompt, which every caller
//! swallows instead of surfacing.

use std::io::stdout;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use ratatui::crossterm::{execute, terminal::SetTitle};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::store::{PersistentStore, KEY_DRAFT_PATH};

/// Sentinel message meaning "the user dismissed the dialog". Swallowed
/// everywhere it is caught; never shown.
pub const CANCELLED_MESSAGE: &str = "no file was selected";

/// Refuse to load anything bigger than this.
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub fn cancelled() -> anyhow::Error {
    anyhow!(CANCELLED_MESSAGE)
}

pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|c| c.to_string() == CANCELLED_MESSAGE)
}

/// File open/save/rename primitives with last-path bookkeeping.
pub struct FileBridge {
    current_path: Option<PathBuf>,
}

impl FileBridge {
    pub fn new(store: &PersistentStore) -> Self {
        Self {
            current_path: store.get(KEY_DRAFT_PATH).map(PathBuf::from),
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn remember_path(&mut self, path: &Path, store: &mut PersistentStore) {
        self.current_path = Some(path.to_path_buf());
        store.set(KEY_DRAFT_PATH, path.display().to_string());
    }

    /// Read a file, refusing oversized ones.
    pub async fn open(
        &mut self,
        path: &Path,
        store: &mut PersistentStore,
    ) -> Result<(PathBuf, String)> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| anyhow!("Could not read file metadata: {}", e))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(anyhow!(
                "File is too large (maximum {}MB)",
                MAX_FILE_SIZE / 1024 / 1024
            ));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Could not read file: {}", e))?;

        self.remember_path(path, store);
        Ok((path.to_path_buf(), content))
    }

    /// Write to a known path. The path must be non-blank and its parent
    /// directory must already exist.
    pub async fn save(
        &mut self,
        content: &str,
        path: &Path,
        store: &mut PersistentStore,
    ) -> Result<PathBuf> {
        let trimmed = path.as_os_str().to_string_lossy();
        if trimmed.trim().is_empty() {
            return Err(anyhow!("File path cannot be empty"));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow!("Parent directory does not exist: {:?}", parent));
            }
        }

        self.write_synced(path, content).await?;
        self.remember_path(path, store);
        Ok(path.to_path_buf())
    }

    /// Write to a freely chosen path, creating parent directories.
    pub async fn save_as(
        &mut self,
        content: &str,
        path: &Path,
        store: &mut PersistentStore,
    ) -> Result<PathBuf> {
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(cancelled());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| anyhow!("Could not create directory: {}", e))?;
            }
        }

        self.write_synced(path, content).await?;
        self.remember_path(path, store);
        Ok(path.to_path_buf())
    }

    /// Rename a file within its directory, refusing to clobber.
    pub async fn rename(
        &mut self,
        old_path: &Path,
        new_filename: &str,
        store: &mut PersistentStore,
    ) -> Result<PathBuf> {
        let parent = old_path
            .parent()
            .ok_or_else(|| anyhow!("Could not determine the parent directory"))?;
        let new_path = parent.join(new_filename);

        if new_path.exists() {
            return Err(anyhow!("A file with that name already exists"));
        }

        fs::rename(old_path, &new_path)
            .await
            .map_err(|e| anyhow!("Could not rename file: {}", e))?;

        self.remember_path(&new_path, store);
        Ok(new_path)
    }

    async fn write_synced(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = fs::File::create(path)
            .await
            .map_err(|e| anyhow!("Could not create file: {}", e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| anyhow!("Could not write file: {}", e))?;
        file.sync_all()
            .await
            .map_err(|e| anyhow!("Could not sync file: {}", e))?;
        Ok(())
    }
}

/// Host window title collaborator; failures are silently ignored.
pub struct WindowTitle;

pub const APP_NAME: &str = "Jotter";

impl WindowTitle {
    pub fn update(path: Option<&Path>) {
        let title = match path.and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            Some(name) => format!("{} - {}", APP_NAME, name),
            None => APP_NAME.to_string(),
        };
        let _ = execute!(stdout(), SetTitle(title));
    }
}
