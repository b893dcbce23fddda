//! Unified error types for slackbridge.
//!
//! Every fatal condition of a merge or transform run is a variant of
//! [`BridgeError`]. Recoverable problems (a post that cannot be imported, an
//! override that matches nothing) are not errors: they are reported through a
//! [`Reporter`](crate::report::Reporter) and the offending item is skipped.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for slackbridge operations.
///
/// # Example
///
/// ```rust
/// use slackbridge::error::Result;
/// use slackbridge::export::ExportSnapshot;
///
/// fn load() -> Result<ExportSnapshot> {
///     ExportSnapshot::from_json_str(r#"{"team_name": "acme"}"#)
/// }
/// # assert!(load().is_ok());
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;

/// The error type for all slackbridge operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// An I/O error occurred while reading inputs or writing attachments.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing/serialization error.
    ///
    /// Raised for unreadable snapshots and for post originals that cannot be
    /// parsed while checking merge equivalence.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Override CSV could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `merge_exports` was called without any snapshot.
    #[error("no Slack exports to merge")]
    NoExports,

    /// Two snapshots come from workspaces with different team names.
    #[error("cannot merge Slack exports with different team names: {left} and {right}")]
    TeamMismatch {
        /// Team name of the accumulated result
        left: String,
        /// Team name of the snapshot being merged in
        right: String,
    },

    /// Two records share an identity key but cannot be reconciled.
    #[error("cannot merge {entity}s with different {field}: {left} and {right}")]
    Conflict {
        /// Entity kind, e.g. "channel" or "upload"
        entity: &'static str,
        /// Name of the differing field
        field: &'static str,
        /// Rendering of the first operand's value
        left: String,
        /// Rendering of the second operand's value
        right: String,
    },

    /// An upload's extra-field blob is not a valid sequence of records.
    #[error("cannot parse extra fields of {name}: {message}")]
    MalformedExtraField {
        /// Upload name
        name: String,
        /// What is wrong with the blob
        message: String,
    },

    /// An override row has no value in its key column.
    #[error("{kind} override record does not have an {column} value")]
    MissingOverrideKey {
        /// "user" or "channel"
        kind: &'static str,
        /// The required key column
        column: &'static str,
    },

    /// An attachment payload could not be copied into the attachments directory.
    #[error("attachment {file_id} failed{}: {message}", path.as_ref().map(|p| format!(" (dest: {})", p.display())).unwrap_or_default())]
    Attachment {
        /// Slack file id
        file_id: String,
        /// Destination path, if it was computed
        path: Option<PathBuf>,
        /// Description of the failure
        message: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl BridgeError {
    /// Creates a merge conflict error.
    pub fn conflict(
        entity: &'static str,
        field: &'static str,
        left: impl std::fmt::Debug,
        right: impl std::fmt::Debug,
    ) -> Self {
        BridgeError::Conflict {
            entity,
            field,
            left: format!("{left:?}"),
            right: format!("{right:?}"),
        }
    }

    /// Creates a malformed extra-field error.
    pub fn malformed_extra(name: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::MalformedExtraField {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an attachment error.
    pub fn attachment(
        file_id: impl Into<String>,
        path: Option<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        BridgeError::Attachment {
            file_id: file_id.into(),
            path,
            message: message.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, BridgeError::Io(_))
    }

    /// Returns `true` if this is a merge conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BridgeError::Conflict { .. })
    }

    /// Returns `true` if this error aborted a merge.
    pub fn is_merge_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::NoExports
                | BridgeError::TeamMismatch { .. }
                | BridgeError::Conflict { .. }
                | BridgeError::MalformedExtraField { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = BridgeError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
        assert!(err.is_io());
    }

    #[test]
    fn test_conflict_names_both_values() {
        let err = BridgeError::conflict("channel", "creators", "U1", "U2");
        let display = err.to_string();
        assert_eq!(
            display,
            r#"cannot merge channels with different creators: "U1" and "U2""#
        );
        assert!(err.is_conflict());
        assert!(err.is_merge_failure());
    }

    #[test]
    fn test_team_mismatch_display() {
        let err = BridgeError::TeamMismatch {
            left: "acme".into(),
            right: "globex".into(),
        };
        assert!(err.to_string().contains("acme and globex"));
        assert!(!err.is_conflict());
        assert!(err.is_merge_failure());
    }

    #[test]
    fn test_missing_override_key_display() {
        let err = BridgeError::MissingOverrideKey {
            kind: "user",
            column: "apply_to_username",
        };
        assert_eq!(
            err.to_string(),
            "user override record does not have an apply_to_username value"
        );
    }

    #[test]
    fn test_attachment_error_with_and_without_path() {
        let err = BridgeError::attachment("F1", None, "not in archive");
        assert!(!err.to_string().contains("dest:"));

        let err = BridgeError::attachment("F1", Some(PathBuf::from("/data/F1/a.png")), "denied");
        let display = err.to_string();
        assert!(display.contains("/data/F1/a.png"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
        assert!(!err.is_merge_failure());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = BridgeError::from(io_err);
        assert!(err.source().is_some());
    }
}
