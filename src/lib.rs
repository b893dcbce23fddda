//! # Slackbridge
//!
//! A Rust library for merging Slack workspace exports and transforming them
//! into a sanitized model ready for a Mattermost bulk import.
//!
//! ## Overview
//!
//! Slackbridge works on fully parsed export snapshots:
//! - **Merge** several exports of one workspace, unifying entities that agree
//!   and rejecting those that conflict
//! - **Transform** the merged export: user identities, channel names and
//!   limits, memberships, reply trees, reactions and attachments
//! - **Report** every skipped or adjusted item through an injected reporter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slackbridge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let snapshots = vec![
//!         read_snapshot("export-alice.json")?,
//!         read_snapshot("export-bob.json")?,
//!     ];
//!     let merged = merge_exports(snapshots)?;
//!
//!     let config = TransformConfig::new().with_attachments_dir("data");
//!     let mut transformer = Transformer::new()
//!         .with_config(config)
//!         .with_upload_reader(DirUploadReader::new("extracted-export"));
//!     let intermediate = transformer.transform(&merged);
//!
//!     write_json(&intermediate, "my-team", "bulk-export.json")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Collecting Warnings
//!
//! ```rust
//! use slackbridge::prelude::*;
//! use std::sync::Arc;
//!
//! let reporter = Arc::new(CollectingReporter::new());
//! let mut snapshot = ExportSnapshot::new("acme");
//! snapshot.users.push(RawUser::new("U1", "alice"));
//!
//! let intermediate = Transformer::new()
//!     .with_reporter(reporter.clone())
//!     .transform(&snapshot);
//!
//! assert_eq!(intermediate.users_by_id["U1"].email, "alice@example.com");
//! assert_eq!(reporter.count(WarningKind::MissingEmail), 1);
//! ```
//!
//! ## Module Structure
//!
//! - [`export`] — Raw snapshot model and JSON loader
//! - [`merge`] — [`merge_exports`](merge::merge_exports) and the equivalence checks in [`merge::compare`]
//! - [`overrides`] — CSV user/channel overrides
//! - [`transform`] — [`Transformer`](transform::Transformer) and the intermediate model
//! - [`timestamp`] — Exact Slack timestamp conversion
//! - [`report`] — [`Reporter`](report::Reporter) capability and warning kinds
//! - [`output`] — JSON writer for the intermediate model
//! - [`config`] — [`TransformConfig`](config::TransformConfig) and [`Limits`](config::Limits)
//! - [`error`] — Unified error types ([`BridgeError`], [`Result`])
//! - [`prelude`] — Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod merge;
pub mod output;
pub mod overrides;
pub mod report;
pub mod timestamp;
pub mod transform;

// Re-export the main types at the crate root for convenience
pub use error::{BridgeError, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use slackbridge::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{BridgeError, Result};

    // Configuration
    pub use crate::config::{Limits, TransformConfig};

    // Raw export model
    pub use crate::export::{
        ChannelKind, ExportSnapshot, RawChannel, RawPost, RawUser, Upload, read_snapshot,
    };

    // Merging
    pub use crate::merge::merge_exports;

    // Overrides
    pub use crate::overrides::Overrides;

    // Transform
    pub use crate::transform::{
        DirUploadReader, Downloader, Intermediate, IntermediateChannel, IntermediatePost,
        IntermediateUser, Transformer, UploadReader,
    };

    // Reporting
    pub use crate::report::{CollectingReporter, Reporter, SharedReporter, Warning, WarningKind};

    // Output
    pub use crate::output::{to_json, write_json};
}
