//! # Snapshot and Log Files
//!
//! Files ending in `.json` are read as JSON; anything else is read as YAML.
//! Snapshots are always written as pretty-printed JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use odim_state::{OperationLog, RegistrySnapshot};

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn read_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} {}", path.display()))?;
    let parsed = if is_json(path) {
        serde_json::from_str(&raw).with_context(|| format!("invalid {what} {}", path.display()))?
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid {what} {}", path.display()))?
    };
    Ok(parsed)
}

/// Read a registry snapshot.
pub fn load_snapshot(path: &Path) -> Result<RegistrySnapshot> {
    read_document(path, "snapshot")
}

/// Read a snapshot if `path` is given and exists, otherwise the empty one.
pub fn load_snapshot_or_empty(path: Option<&Path>) -> Result<RegistrySnapshot> {
    match path {
        Some(p) if p.exists() => load_snapshot(p),
        Some(p) => {
            tracing::info!(path = %p.display(), "no snapshot yet; starting from an empty registry");
            Ok(RegistrySnapshot::default())
        }
        None => Ok(RegistrySnapshot::default()),
    }
}

/// Write a snapshot as pretty JSON, creating parent directories.
pub fn write_snapshot(path: &Path, snapshot: &RegistrySnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    tracing::debug!(path = %path.display(), principals = snapshot.cycles.len(), "wrote snapshot");
    Ok(())
}

/// Read an operation log.
pub fn load_log(path: &Path) -> Result<OperationLog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read operation log {}", path.display()))?;
    let log = if is_json(path) {
        OperationLog::from_json(&raw)
    } else {
        OperationLog::from_yaml(&raw)
    };
    log.with_context(|| format!("invalid operation log {}", path.display()))
}
