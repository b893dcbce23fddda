//! Raw Slack export snapshots.
//!
//! An [`ExportSnapshot`] is one workspace's export fully parsed into memory.
//! Several snapshots are combined with [`merge_exports`](crate::merge::merge_exports)
//! and then handed to the [`Transformer`](crate::transform::Transformer).
//!
//! # Example
//!
//! ```rust
//! use slackbridge::export::{ChannelKind, ExportSnapshot};
//!
//! let json = r#"{
//!     "team_name": "acme",
//!     "private_channels": [{"id": "G1", "name": "secret", "type": "O"}],
//!     "posts": {"secret": [{"type": "message", "user": "U1", "ts": "1.000100"}]}
//! }"#;
//!
//! let snapshot = ExportSnapshot::from_json_str(json)?;
//! assert_eq!(snapshot.private_channels[0].kind, ChannelKind::Private);
//! assert_eq!(snapshot.post_count(), 1);
//! # Ok::<(), slackbridge::BridgeError>(())
//! ```

mod loader;
mod models;

pub use loader::read_snapshot;
pub use models::{
    ChannelKind, ChannelText, ExportSnapshot, PostKind, RawChannel, RawComment, RawFile,
    RawPost, RawProfile, RawReaction, RawUser, Upload,
};
