//! Configuration types for the transform pipeline.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`TransformConfig`] - switches for attachments, raw originals and naming
//! - [`Limits`] - size ceilings imposed by the target platform
//!
//! # Example
//!
//! ```rust
//! use slackbridge::config::TransformConfig;
//!
//! let config = TransformConfig::new()
//!     .with_attachments_dir("data")
//!     .with_add_original(true)
//!     .with_discard_invalid_props(true);
//!
//! assert!(config.add_original);
//! assert_eq!(config.limits.group_max_members, 8);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directory inside the attachments dir that receives copied payloads.
pub const ATTACHMENTS_INTERNAL: &str = "bulk-export-attachments";

/// Size ceilings of the target platform.
///
/// The defaults match Mattermost's model limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum channel handle length in bytes (default: 64)
    pub channel_name_max_len: usize,

    /// Maximum channel display name length in runes (default: 64)
    pub display_name_max_runes: usize,

    /// Maximum channel purpose length in runes (default: 250)
    pub purpose_max_runes: usize,

    /// Maximum channel header length in runes (default: 1024)
    pub header_max_runes: usize,

    /// Largest member count a group message channel may have (default: 8)
    pub group_max_members: usize,

    /// Maximum serialized size of a post's props in runes (default: 800000)
    pub post_props_max_runes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            channel_name_max_len: 64,
            display_name_max_runes: 64,
            purpose_max_runes: 250,
            header_max_runes: 1024,
            group_max_members: 8,
            post_props_max_runes: 800_000,
        }
    }
}

/// Configuration for a transform run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Root directory for copied attachments (default: "data")
    pub attachments_dir: PathBuf,

    /// Do not copy attachment payloads at all (default: false)
    pub skip_attachments: bool,

    /// Fetch payloads missing from the archive through the downloader (default: false)
    pub allow_download: bool,

    /// Store each post's raw JSON as a prop (default: false)
    pub add_original: bool,

    /// Drop posts whose props are too large instead of dropping the props (default: false)
    pub discard_invalid_props: bool,

    /// Import direct and group messages as private channels (default: false)
    pub team_internal_only: bool,

    /// Target platform ceilings
    pub limits: Limits,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            attachments_dir: PathBuf::from("data"),
            skip_attachments: false,
            allow_download: false,
            add_original: false,
            discard_invalid_props: false,
            team_internal_only: false,
            limits: Limits::default(),
        }
    }
}

impl TransformConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attachments root directory.
    #[must_use]
    pub fn with_attachments_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachments_dir = dir.into();
        self
    }

    /// Sets whether attachment payloads are skipped.
    #[must_use]
    pub fn with_skip_attachments(mut self, skip: bool) -> Self {
        self.skip_attachments = skip;
        self
    }

    /// Sets whether missing payloads may be downloaded.
    #[must_use]
    pub fn with_allow_download(mut self, allow: bool) -> Self {
        self.allow_download = allow;
        self
    }

    /// Sets whether raw post JSON is kept as a prop.
    #[must_use]
    pub fn with_add_original(mut self, add: bool) -> Self {
        self.add_original = add;
        self
    }

    /// Sets whether posts with oversized props are dropped.
    #[must_use]
    pub fn with_discard_invalid_props(mut self, discard: bool) -> Self {
        self.discard_invalid_props = discard;
        self
    }

    /// Sets whether direct and group messages become private channels.
    #[must_use]
    pub fn with_team_internal_only(mut self, internal: bool) -> Self {
        self.team_internal_only = internal;
        self
    }

    /// Replaces the platform limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_config_default() {
        let config = TransformConfig::default();
        assert_eq!(config.attachments_dir, PathBuf::from("data"));
        assert!(!config.skip_attachments);
        assert!(!config.add_original);
        assert!(!config.team_internal_only);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_transform_config_builder() {
        let config = TransformConfig::new()
            .with_skip_attachments(true)
            .with_allow_download(true)
            .with_team_internal_only(true)
            .with_limits(Limits {
                post_props_max_runes: 100,
                ..Limits::default()
            });

        assert!(config.skip_attachments);
        assert!(config.allow_download);
        assert!(config.team_internal_only);
        assert_eq!(config.limits.post_props_max_runes, 100);
        assert_eq!(config.limits.header_max_runes, 1024);
    }

    #[test]
    fn test_limits_default() {
        let limits = Limits::default();
        assert_eq!(limits.channel_name_max_len, 64);
        assert_eq!(limits.display_name_max_runes, 64);
        assert_eq!(limits.purpose_max_runes, 250);
        assert_eq!(limits.group_max_members, 8);
        assert_eq!(limits.post_props_max_runes, 800_000);
    }

    #[test]
    fn test_config_serde() {
        let config = TransformConfig::new().with_add_original(true);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TransformConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.add_original);
        assert_eq!(parsed.limits, config.limits);
    }
}
