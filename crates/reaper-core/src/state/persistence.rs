use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::resources::types::ResourceKind;

use super::errors::StateStoreError;
use super::types::FlagState;

/// Load/store seam for the flag state. The lifecycle only ever sees this.
pub trait FlagStateStore {
    /// Returns an empty state when nothing has been stored yet.
    fn load(&self) -> Result<FlagState, StateStoreError>;

    /// Replace the stored state as a whole.
    fn store(&self, state: &FlagState) -> Result<(), StateStoreError>;
}

/// One pretty-printed JSON file per (cloud, kind): `<dir>/<cloud>-<kind>.json`.
///
/// The cloud part is percent-encoded, so distinct cloud names never share a
/// file. A file whose recorded cloud or kind differs is rejected on load.
pub struct JsonFileStore {
    path: PathBuf,
    cloud: String,
    kind: ResourceKind,
}

impl JsonFileStore {
    pub fn new(dir: &Path, cloud: &str, kind: ResourceKind) -> Self {
        let file_name = format!("{}-{}.json", encode_file_stem(cloud), kind.as_str());
        Self {
            path: dir.join(file_name),
            cloud: cloud.to_string(),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlagStateStore for JsonFileStore {
    fn load(&self) -> Result<FlagState, StateStoreError> {
        if !self.path.exists() {
            debug!(event = "core.state.not_found", path = %self.path.display());
            return Ok(FlagState::empty(&self.cloud, self.kind));
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StateStoreError::ReadFailed {
                path: self.path.clone(),
                source: e,
            })?;

        let state: FlagState =
            serde_json::from_str(&content).map_err(|e| StateStoreError::Corrupted {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        if state.cloud != self.cloud || state.kind != self.kind {
            return Err(StateStoreError::Corrupted {
                path: self.path.clone(),
                message: format!(
                    "file belongs to cloud '{}' ({}), expected '{}' ({})",
                    state.cloud, state.kind, self.cloud, self.kind
                ),
            });
        }

        debug!(
            event = "core.state.loaded",
            path = %self.path.display(),
            flagged = state.flagged.len(),
            deleted = state.deleted.len()
        );
        Ok(state)
    }

    fn store(&self, state: &FlagState) -> Result<(), StateStoreError> {
        let write_failed = |message: String| StateStoreError::WriteFailed {
            path: self.path.clone(),
            message,
        };

        let dir = self
            .path
            .parent()
            .ok_or_else(|| write_failed("state path has no parent directory".to_string()))?;
        std::fs::create_dir_all(dir).map_err(|e| {
            write_failed(format!(
                "Failed to create directory ({}): {}",
                dir.display(),
                e
            ))
        })?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| write_failed(format!("Failed to serialize state: {}", e)))?;

        // Temp file in the same directory so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| write_failed(format!("Failed to create temp file: {}", e)))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| write_failed(format!("Failed to write temp file: {}", e)))?;
        tmp.persist(&self.path).map_err(|e| {
            error!(
                event = "core.state.persist_failed",
                path = %self.path.display(),
                error = %e.error
            );
            write_failed(format!("Failed to replace state file: {}", e.error))
        })?;

        info!(
            event = "core.state.saved",
            path = %self.path.display(),
            flagged = state.flagged.len(),
            deleted = state.deleted.len()
        );
        Ok(())
    }
}

/// Resolve the state directory: `REAPER_STATE_DIR`, then `~/.reaper/state`.
///
/// Falls back to `./.reaper/state` if the home directory cannot be determined.
pub fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REAPER_STATE_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    match dirs::home_dir() {
        Some(home) => home.join(".reaper").join("state"),
        None => {
            error!(
                event = "core.state.home_dir_not_found",
                fallback = ".",
                "Could not determine home directory - using current directory as fallback"
            );
            PathBuf::from(".").join(".reaper").join("state")
        }
    }
}

/// Percent-encode everything outside `[A-Za-z0-9._-]`. `%` itself is
/// encoded, so the mapping is injective.
fn encode_file_stem(cloud: &str) -> String {
    let mut out = String::with_capacity(cloud.len());
    for byte in cloud.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
