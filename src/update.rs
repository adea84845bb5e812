//! Release metadata checks against a GitHub releases endpoint.
//!
//! The checker is blocking (`ureq`) and runs on a blocking task from the
//! config panel. The endpoint and current version are injected so tests
//! can point the checker at a local server.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::Value;

const RELEASE_ENDPOINT: &str =
    "https://api.github.com/repos/jotter-editor/jotter/releases/latest";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Msi,
    Exe,
}

#[derive(Debug, Clone)]
pub struct ReleaseInfo {
    pub version: String,
    pub download_url: Option<String>,
    pub asset_name: String,
    pub asset_type: Option<AssetType>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub enum UpdateStatus {
    UpdateAvailable(ReleaseInfo),
    UpToDate,
}

/// `remote > current` under dotted numeric comparison: a leading `v` is
/// stripped, segments compare numerically, missing segments count as 0.
pub fn is_newer_version(remote: &str, current: &str) -> bool {
    if remote.is_empty() || current.is_empty() {
        return false;
    }
    let parse = |v: &str| -> Vec<u64> {
        v.trim_start_matches(['v', 'V'])
            .split('.')
            .map(|s| s.parse().unwrap_or(0))
            .collect()
    };
    let remote_parts = parse(remote);
    let current_parts = parse(current);

    for i in 0..remote_parts.len().max(current_parts.len()) {
        let r = remote_parts.get(i).copied().unwrap_or(0);
        let c = current_parts.get(i).copied().unwrap_or(0);
        if r > c {
            return true;
        }
        if r < c {
            return false;
        }
    }
    false
}

/// Map a check failure to one of a small set of user-facing messages.
pub fn classify_error(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.contains("Network") || message.contains("Connection") || message.contains("Dns") {
        "No connection available".to_string()
    } else if message.contains("HTTP") {
        "No releases available".to_string()
    } else if !message.is_empty() {
        message
    } else {
        "Could not check for updates".to_string()
    }
}

pub struct ReleaseChecker {
    endpoint: String,
    current_version: String,
}

impl ReleaseChecker {
    pub fn new() -> Self {
        Self {
            endpoint: RELEASE_ENDPOINT.to_string(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_endpoint(endpoint: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            current_version: current_version.into(),
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Fetch the latest release and compare it against the running
    /// version. Blocking; run on a blocking task from async contexts.
    pub fn check(&self) -> Result<UpdateStatus> {
        let info = self.fetch_latest()?;
        if info.version.is_empty() || info.download_url.is_none() {
            return Err(anyhow!("The latest release has no installer available"));
        }
        if is_newer_version(&info.version, &self.current_version) {
            Ok(UpdateStatus::UpdateAvailable(info))
        } else {
            Ok(UpdateStatus::UpToDate)
        }
    }

    fn fetch_latest(&self) -> Result<ReleaseInfo> {
        let response = ureq::get(&self.endpoint)
            .set("Accept", "application/vnd.github+json")
            .set("Cache-Control", "no-cache")
            .timeout(REQUEST_TIMEOUT)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    anyhow!("Could not fetch release information (HTTP {})", code)
                }
                ureq::Error::Transport(t) => anyhow!("Network error: {}", t),
            })?;

        let body = response
            .into_string()
            .map_err(|e| anyhow!("Could not read release response: {}", e))?;
        let release: Value =
            serde_json::from_str(&body).map_err(|e| anyhow!("Invalid release payload: {}", e))?;

        let tag = release["tag_name"]
            .as_str()
            .or_else(|| release["name"].as_str())
            .unwrap_or("");
        let version = tag.trim_start_matches(['v', 'V']).to_string();

        let empty = Vec::new();
        let assets = release["assets"].as_array().unwrap_or(&empty);
        let selected = select_asset(assets);

        let notes = release["body"].as_str().unwrap_or("").trim().to_string();

        let Some(asset) = selected else {
            return Ok(ReleaseInfo {
                version,
                download_url: None,
                asset_name: String::new(),
                asset_type: None,
                notes,
            });
        };

        let asset_name = asset["name"].as_str().unwrap_or("").to_string();
        let asset_type = if asset_name.to_lowercase().ends_with(".msi") {
            Some(AssetType::Msi)
        } else {
            Some(AssetType::Exe)
        };

        Ok(ReleaseInfo {
            version,
            download_url: asset["browser_download_url"].as_str().map(str::to_string),
            asset_name,
            asset_type,
            notes,
        })
    }

    /// Launch the pending installer download in the system browser.
    pub fn open_download(url: &str) -> Result<()> {
        open::that(url).map_err(|e| anyhow!("Could not open download: {}", e))
    }
}

impl Default for ReleaseChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Installer preference: the x64 en-us MSI, then any MSI, then the x64
/// setup exe, then any exe.
fn select_asset(assets: &[Value]) -> Option<&Value> {
    let name_of = |asset: &Value| {
        asset["name"]
            .as_str()
            .map(str::to_lowercase)
            .unwrap_or_default()
    };
    assets
        .iter()
        .find(|a| name_of(a).ends_with("_x64_en-us.msi"))
        .or_else(|| assets.iter().find(|a| name_of(a).ends_with(".msi")))
        .or_else(|| {
            assets
                .iter()
                .find(|a| name_of(a).ends_with("_x64-setup_windows.exe"))
        })
        .or_else(|| assets.iter().find(|a| name_of(a).ends_with(".exe")))
}
