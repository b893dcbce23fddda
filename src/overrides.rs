//! Per-user and per-channel field overrides.
//!
//! Overrides are read from CSV files with a header row. The key column
//! (`apply_to_username` or `apply_to_channelname`) names the target; every
//! other recognized column replaces one field of it.
//!
//! In an override field, an empty cell means "keep the exported value" and a
//! single dash (`-`) means "clear the field".
//!
//! # Example
//!
//! ```rust
//! use slackbridge::overrides::Overrides;
//! use slackbridge::report::CollectingReporter;
//!
//! let csv = "apply_to_username,first_name,position\nalice,Alicia,-\n";
//! let reporter = CollectingReporter::new();
//! let overrides = Overrides::new().with_users_from_reader(csv.as_bytes(), &reporter)?;
//!
//! let alice = &overrides.users["alice"];
//! assert_eq!(alice.first_name, "Alicia");
//! assert_eq!(alice.position, "-");
//! # Ok::<(), slackbridge::BridgeError>(())
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::report::{Reporter, Warning, WarningKind};
use crate::transform::{IntermediateChannel, IntermediateUser};

/// Override value that clears a field.
pub const CLEAR_SENTINEL: &str = "-";

/// Replacement values for one user. Empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserOverride {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
    pub password: String,
}

/// Replacement values for one channel. Empty fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOverride {
    pub name: String,
    pub display_name: String,
    pub purpose: String,
    pub header: String,
    pub topic: String,
}

/// A row type of an override file.
trait OverrideRecord: Default {
    /// Entity name used in messages
    const KIND: &'static str;
    /// Column naming the target
    const KEY_COLUMN: &'static str;
    /// Recognized value columns
    const COLUMNS: &'static [&'static str];

    fn set(&mut self, column: &str, value: &str);
}

impl OverrideRecord for UserOverride {
    const KIND: &'static str = "user";
    const KEY_COLUMN: &'static str = "apply_to_username";
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "first_name",
        "last_name",
        "position",
        "email",
        "password",
    ];

    fn set(&mut self, column: &str, value: &str) {
        let field = match column {
            "username" => &mut self.username,
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "position" => &mut self.position,
            "email" => &mut self.email,
            "password" => &mut self.password,
            _ => return,
        };
        *field = value.to_string();
    }
}

impl OverrideRecord for ChannelOverride {
    const KIND: &'static str = "channel";
    const KEY_COLUMN: &'static str = "apply_to_channelname";
    const COLUMNS: &'static [&'static str] = &["name", "display_name", "purpose", "header", "topic"];

    fn set(&mut self, column: &str, value: &str) {
        let field = match column {
            "name" => &mut self.name,
            "display_name" => &mut self.display_name,
            "purpose" => &mut self.purpose,
            "header" => &mut self.header,
            "topic" => &mut self.topic,
            _ => return,
        };
        *field = value.to_string();
    }
}

/// Both override tables.
///
/// A table that was never loaded is empty, and applying an empty table is a
/// silent no-op.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// User overrides keyed by exported username
    pub users: HashMap<String, UserOverride>,
    /// Channel overrides keyed by channel name
    pub channels: HashMap<String, ChannelOverride>,
}

impl Overrides {
    /// Creates empty override tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads both tables from optional CSV files.
    ///
    /// A `None` path leaves the corresponding table empty.
    pub fn from_files(
        user_path: Option<&Path>,
        channel_path: Option<&Path>,
        reporter: &dyn Reporter,
    ) -> Result<Self> {
        let mut overrides = Self::new();
        if let Some(path) = user_path {
            tracing::info!("Parsing user overrides");
            overrides = overrides.with_users_from_reader(File::open(path)?, reporter)?;
            tracing::info!("Parsed {} user overrides", overrides.users.len());
        }
        if let Some(path) = channel_path {
            tracing::info!("Parsing channel overrides");
            overrides = overrides.with_channels_from_reader(File::open(path)?, reporter)?;
            tracing::info!("Parsed {} channel overrides", overrides.channels.len());
        }
        Ok(overrides)
    }

    /// Replaces the user table with the rows of a CSV document.
    pub fn with_users_from_reader<R: Read>(
        mut self,
        reader: R,
        reporter: &dyn Reporter,
    ) -> Result<Self> {
        self.users = parse_table(reader, reporter)?;
        Ok(self)
    }

    /// Replaces the channel table with the rows of a CSV document.
    pub fn with_channels_from_reader<R: Read>(
        mut self,
        reader: R,
        reporter: &dyn Reporter,
    ) -> Result<Self> {
        self.channels = parse_table(reader, reporter)?;
        Ok(self)
    }

    /// Applies the override registered for `user.username`, if any.
    pub fn apply_user(&self, user: &mut IntermediateUser, reporter: &dyn Reporter) {
        if self.users.is_empty() {
            return;
        }
        let Some(o) = self.users.get(&user.username) else {
            reporter.report(Warning::new(
                WarningKind::UserOverrideNotFound,
                format!("No user override found for user {}", user.username),
            ));
            return;
        };

        apply_field(&mut user.username, &o.username);
        apply_field(&mut user.first_name, &o.first_name);
        apply_field(&mut user.last_name, &o.last_name);
        apply_field(&mut user.position, &o.position);
        apply_field(&mut user.email, &o.email);
        apply_field(&mut user.password, &o.password);
    }

    /// Applies the override registered for `channel.name`, if any.
    pub fn apply_channel(&self, channel: &mut IntermediateChannel, reporter: &dyn Reporter) {
        if self.channels.is_empty() {
            return;
        }
        let Some(o) = self.channels.get(&channel.name) else {
            reporter.report(Warning::new(
                WarningKind::ChannelOverrideNotFound,
                format!("No channel override found for channel {}", channel.name),
            ));
            return;
        };

        apply_field(&mut channel.name, &o.name);
        apply_field(&mut channel.display_name, &o.display_name);
        apply_field(&mut channel.purpose, &o.purpose);
        apply_field(&mut channel.header, &o.header);
        apply_field(&mut channel.topic, &o.topic);
    }
}

fn apply_field(target: &mut String, value: &str) {
    if value.is_empty() {
        return;
    }
    if value == CLEAR_SENTINEL {
        target.clear();
    } else {
        value.clone_into(target);
    }
}

fn parse_table<T: OverrideRecord, R: Read>(
    reader: R,
    reporter: &dyn Reporter,
) -> Result<HashMap<String, T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    for column in headers.iter() {
        if column != T::KEY_COLUMN && !T::COLUMNS.contains(&column) {
            reporter.report(Warning::new(
                WarningKind::UnknownOverrideColumn,
                format!("Unknown field {column} in {} override record", T::KIND),
            ));
        }
    }

    let mut table = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let mut key = "";
        let mut row = T::default();
        for (column, value) in headers.iter().zip(record.iter()) {
            if column == T::KEY_COLUMN {
                key = value;
            } else {
                row.set(column, value);
            }
        }
        if key.is_empty() {
            return Err(BridgeError::MissingOverrideKey {
                kind: T::KIND,
                column: T::KEY_COLUMN,
            });
        }
        table.insert(key.to_string(), row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ChannelKind;
    use crate::report::CollectingReporter;

    fn user(username: &str) -> IntermediateUser {
        IntermediateUser {
            id: "U1".into(),
            username: username.into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            position: "Engineer".into(),
            email: "alice@example.com".into(),
            password: "secret".into(),
            ..IntermediateUser::default()
        }
    }

    fn channel(name: &str) -> IntermediateChannel {
        IntermediateChannel {
            id: "C1".into(),
            name: name.into(),
            display_name: name.into(),
            purpose: "chat".into(),
            header: "welcome".into(),
            kind: ChannelKind::Public,
            ..IntermediateChannel::default()
        }
    }

    #[test]
    fn test_parse_user_table() {
        let csv = "apply_to_username,username,email,password\n\
                   alice,alice2,alice@corp.io,\n\
                   bob,,,hunter2\n";
        let reporter = CollectingReporter::new();
        let overrides = Overrides::new()
            .with_users_from_reader(csv.as_bytes(), &reporter)
            .unwrap();

        assert_eq!(overrides.users.len(), 2);
        assert_eq!(overrides.users["alice"].username, "alice2");
        assert_eq!(overrides.users["bob"].password, "hunter2");
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_unknown_columns_warn_once_per_file() {
        let csv = "apply_to_channelname,colour,name\ngeneral,red,town-square\nrandom,blue,\n";
        let reporter = CollectingReporter::new();
        let overrides = Overrides::new()
            .with_channels_from_reader(csv.as_bytes(), &reporter)
            .unwrap();

        assert_eq!(overrides.channels["general"].name, "town-square");
        assert_eq!(reporter.count(WarningKind::UnknownOverrideColumn), 1);
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let csv = "apply_to_username,first_name\n,Nobody\n";
        let reporter = CollectingReporter::new();
        let err = Overrides::new()
            .with_users_from_reader(csv.as_bytes(), &reporter)
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingOverrideKey {
                kind: "user",
                column: "apply_to_username"
            }
        ));
    }

    #[test]
    fn test_missing_key_column_is_fatal() {
        let csv = "name\ngeneral\n";
        let reporter = CollectingReporter::new();
        let err = Overrides::new()
            .with_channels_from_reader(csv.as_bytes(), &reporter)
            .unwrap_err();
        assert!(err.to_string().contains("apply_to_channelname"));
    }

    #[test]
    fn test_apply_user_replaces_and_clears() {
        let mut overrides = Overrides::new();
        overrides.users.insert(
            "alice".into(),
            UserOverride {
                first_name: "Alicia".into(),
                last_name: CLEAR_SENTINEL.into(),
                ..UserOverride::default()
            },
        );
        let reporter = CollectingReporter::new();
        let mut target = user("alice");
        overrides.apply_user(&mut target, &reporter);

        assert_eq!(target.first_name, "Alicia");
        assert_eq!(target.last_name, "");
        assert_eq!(target.position, "Engineer");
        assert_eq!(target.password, "secret");
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_apply_user_without_match_warns() {
        let mut overrides = Overrides::new();
        overrides
            .users
            .insert("bob".into(), UserOverride::default());
        let reporter = CollectingReporter::new();
        let mut target = user("alice");
        overrides.apply_user(&mut target, &reporter);

        assert_eq!(target, user("alice"));
        assert_eq!(reporter.count(WarningKind::UserOverrideNotFound), 1);
    }

    #[test]
    fn test_empty_table_is_silent() {
        let reporter = CollectingReporter::new();
        let mut target = channel("general");
        Overrides::new().apply_channel(&mut target, &reporter);
        assert_eq!(target, channel("general"));
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_apply_channel() {
        let mut overrides = Overrides::new();
        overrides.channels.insert(
            "general".into(),
            ChannelOverride {
                display_name: "Town Square".into(),
                purpose: CLEAR_SENTINEL.into(),
                topic: "news".into(),
                ..ChannelOverride::default()
            },
        );
        let reporter = CollectingReporter::new();
        let mut target = channel("general");
        overrides.apply_channel(&mut target, &reporter);

        assert_eq!(target.name, "general");
        assert_eq!(target.display_name, "Town Square");
        assert_eq!(target.purpose, "");
        assert_eq!(target.header, "welcome");
        assert_eq!(target.topic, "news");
    }

    #[test]
    fn test_from_files_without_paths() {
        let reporter = CollectingReporter::new();
        let overrides = Overrides::from_files(None, None, &reporter).unwrap();
        assert!(overrides.users.is_empty());
        assert!(overrides.channels.is_empty());
    }

    #[test]
    fn test_from_files_missing_file() {
        let reporter = CollectingReporter::new();
        let err =
            Overrides::from_files(Some(Path::new("/nonexistent/users.csv")), None, &reporter)
                .unwrap_err();
        assert!(err.is_io());
    }
}
