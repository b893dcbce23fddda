//! Reading snapshots from JSON documents.

use std::fs;
use std::path::Path;

use super::models::ExportSnapshot;
use crate::error::Result;

impl ExportSnapshot {
    /// Parses a snapshot from a JSON document.
    ///
    /// Every post keeps its JSON text in [`RawPost::original`](super::RawPost::original)
    /// and every channel's kind is set from the collection it was listed in.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut snapshot: ExportSnapshot = serde_json::from_str(content)?;
        snapshot.stamp_channel_kinds();
        Ok(snapshot)
    }
}

/// Reads a snapshot from a JSON file.
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<ExportSnapshot> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let snapshot = ExportSnapshot::from_json_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        team = %snapshot.team_name,
        channels = snapshot.channel_count(),
        users = snapshot.users.len(),
        posts = snapshot.post_count(),
        "Loaded export snapshot"
    );
    Ok(snapshot)
}
