//! Warning reporting for recoverable problems.
//!
//! Transformation keeps going when a single item cannot be imported: the item
//! is skipped and a [`Warning`] is handed to the injected [`Reporter`]. The
//! reporter is a capability passed to the transformer rather than a global
//! logger, so callers decide where advisories end up.
//!
//! # Example
//!
//! ```rust
//! use slackbridge::report::{CollectingReporter, Reporter, Warning, WarningKind};
//! use std::sync::Arc;
//!
//! let collector = Arc::new(CollectingReporter::new());
//! collector.report(Warning::new(WarningKind::UnsupportedEmoji, "emoji=party_parrot"));
//!
//! assert_eq!(collector.count(WarningKind::UnsupportedEmoji), 1);
//! ```
//!
//! Any `Fn(Warning)` closure is a reporter too:
//!
//! ```rust
//! use slackbridge::report::{Reporter, SharedReporter, Warning, WarningKind};
//! use std::sync::Arc;
//!
//! let reporter: SharedReporter = Arc::new(|warning: Warning| {
//!     eprintln!("warning: {}", warning.message);
//! });
//! reporter.report(Warning::new(WarningKind::MissingEmail, "user has no email"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WarningKind {
    /// A user had no email and received a placeholder.
    MissingEmail,
    /// A user override table exists but has no entry for this user.
    UserOverrideNotFound,
    /// A channel override table exists but has no entry for this channel.
    ChannelOverrideNotFound,
    /// An override file has a column that is not recognized.
    UnknownOverrideColumn,
    /// A direct or group channel has at most one importable member.
    SingleMemberChannel,
    /// A channel name, display name, purpose or header was truncated.
    ChannelFieldTruncated,
    /// A user referenced by a post or reaction was missing and got synthesized.
    PlaceholderUser,
    /// A post has no usable author field.
    MissingAuthor,
    /// A file comment post carries no comment.
    MissingComment,
    /// A post type/subtype combination that cannot be imported.
    UnsupportedPost,
    /// Posts reference a channel that is not in the export.
    UnknownChannel,
    /// A reply references a thread root that was never seen.
    MissingThreadRoot,
    /// Two posts claim the same thread root key.
    ThreadRootOverwritten,
    /// A post's props exceed the size ceiling and were dropped.
    PropsDropped,
    /// A post was dropped because its props exceed the size ceiling.
    PostDiscarded,
    /// Compacted reply originals take more than 5% of the props ceiling.
    LargeReplyArchive,
    /// A reply's raw original could not be added to the reply archive.
    ReplyOriginalUnavailable,
    /// A reaction's count does not match its user list.
    ReactionCountMismatch,
    /// An emoji name still contained compound syntax after conversion.
    CompoundEmoji,
    /// An emoji name is not in the supported set.
    UnsupportedEmoji,
    /// A file entry has no accessible name.
    InaccessibleFile,
    /// An attachment payload could not be written.
    AttachmentFailed,
}

impl WarningKind {
    /// Returns `true` for problems that lose data rather than merely adjust it.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            WarningKind::MissingThreadRoot | WarningKind::AttachmentFailed
        )
    }
}

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// What kind of problem this is.
    pub kind: WarningKind,
    /// Human readable description including the offending identifiers.
    pub message: String,
}

impl Warning {
    /// Creates a new warning.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Sink for recoverable problems.
pub trait Reporter: Send + Sync {
    /// Records one warning.
    fn report(&self, warning: Warning);
}

impl<F> Reporter for F
where
    F: Fn(Warning) + Send + Sync,
{
    fn report(&self, warning: Warning) {
        self(warning);
    }
}

/// Shared reporter handle, cheap to clone into every component.
pub type SharedReporter = Arc<dyn Reporter>;

/// Reporter that forwards every warning to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, warning: Warning) {
        if warning.kind.is_error() {
            tracing::error!(kind = ?warning.kind, "{}", warning.message);
        } else {
            tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        }
    }
}

/// Creates the default reporter, which logs through `tracing`.
pub fn tracing_reporter() -> SharedReporter {
    Arc::new(TracingReporter)
}

/// Reporter that keeps every warning in memory.
///
/// Useful in tests and for callers that want a summary at the end of a run.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingReporter {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all warnings recorded so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.lock().clone()
    }

    /// Returns how many warnings of `kind` were recorded.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.lock().iter().filter(|w| w.kind == kind).count()
    }

    /// Returns `true` if no warning was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        // A poisoned lock still holds valid warnings.
        self.warnings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, warning: Warning) {
        self.lock().push(warning);
    }
}
