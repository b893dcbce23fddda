//! Transformation of a merged export into the intermediate model.
//!
//! The [`Transformer`] runs five steps over an [`ExportSnapshot`]:
//!
//! 1. users: identity, passwords, overrides and placeholder emails
//! 2. channels: member validation, naming, reclassification and limits
//! 3. memberships of users and of direct/group channels
//! 4. posts: classification, reactions, files, props and thread trees
//! 5. optionally, compaction of reply originals onto their roots
//!
//! Problems that only affect one item are reported through the injected
//! [`Reporter`](crate::report::Reporter) and the item is skipped.
//!
//! # Example
//!
//! ```rust
//! use slackbridge::export::{ChannelKind, ExportSnapshot, RawChannel, RawPost, RawUser};
//! use slackbridge::transform::Transformer;
//!
//! let mut snapshot = ExportSnapshot::new("acme");
//! snapshot.users.push(RawUser::new("U1", "alice").with_email("alice@acme.io"));
//! snapshot.public_channels.push(
//!     RawChannel::new("C1", "general", ChannelKind::Public).with_members(["U1"]),
//! );
//! snapshot.posts.insert(
//!     "general".into(),
//!     vec![RawPost::message("U1", "1549307811.074500", "hello")],
//! );
//!
//! let intermediate = Transformer::new().transform(&snapshot);
//! assert_eq!(intermediate.posts[0].create_at, 1549307811075);
//! assert_eq!(intermediate.users_by_id["U1"].memberships, vec!["general"]);
//! ```

mod attachments;
mod channels;
mod emoji;
mod models;
mod posts;
mod replies;
mod threads;
mod users;

pub use attachments::{
    DirUploadReader, Downloader, UploadReader, human_size, make_alpha_num, normalized_file_path,
};
pub use channels::{is_valid_channel_name, truncate_runes};
pub use emoji::{convert_emoji_name, is_supported_emoji};
pub use models::{
    Intermediate, IntermediateChannel, IntermediatePost, IntermediateUser, PROP_ATTACHMENTS,
    PROP_ORIGINAL, PROP_REPLIES_ARCHIVE, Reaction,
};
pub use replies::encode_reply_archive;
pub use threads::ThreadBuilder;
pub use users::new_password;

use crate::config::TransformConfig;
use crate::export::ExportSnapshot;
use crate::overrides::Overrides;
use crate::report::{SharedReporter, tracing_reporter};

/// Converts a merged export into the intermediate model.
pub struct Transformer {
    config: TransformConfig,
    reporter: SharedReporter,
    overrides: Overrides,
    upload_reader: Option<Box<dyn UploadReader>>,
    downloader: Option<Box<dyn Downloader>>,
    intermediate: Intermediate,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    /// Creates a transformer with the default configuration, no overrides and
    /// a reporter that logs through `tracing`.
    pub fn new() -> Self {
        Self {
            config: TransformConfig::default(),
            reporter: tracing_reporter(),
            overrides: Overrides::default(),
            upload_reader: None,
            downloader: None,
            intermediate: Intermediate::default(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the reporter receiving warnings.
    #[must_use]
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the user and channel overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets the source of payloads stored in the export archive.
    #[must_use]
    pub fn with_upload_reader(mut self, reader: impl UploadReader + 'static) -> Self {
        self.upload_reader = Some(Box::new(reader));
        self
    }

    /// Sets the downloader for payloads missing from the archive.
    #[must_use]
    pub fn with_downloader(mut self, downloader: impl Downloader + 'static) -> Self {
        self.downloader = Some(Box::new(downloader));
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Runs every transform step and returns the result.
    ///
    /// Attachment payloads are written below the configured attachments
    /// directory as a side effect.
    pub fn transform(&mut self, snapshot: &ExportSnapshot) -> Intermediate {
        self.intermediate = Intermediate::default();

        self.transform_users(&snapshot.users);
        self.transform_all_channels(snapshot);
        self.populate_user_memberships();
        self.populate_channel_memberships();
        self.transform_posts(snapshot);

        tracing::info!(
            users = self.intermediate.users_by_id.len(),
            channels = self.intermediate.channels().count(),
            posts = self.intermediate.post_count(),
            "Transformation finished"
        );
        std::mem::take(&mut self.intermediate)
    }

    /// Returns the model built so far by the individual steps.
    pub fn intermediate(&self) -> &Intermediate {
        &self.intermediate
    }
}
