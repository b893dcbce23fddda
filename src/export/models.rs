//! Raw records of a Slack workspace export.
//!
//! These types mirror the JSON written by Slack's export tool closely enough
//! to deserialize it directly. Field names follow Slack (`ts`, `thread_ts`,
//! `subtype`, ...) through serde renames.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

/// Visibility of a channel.
///
/// Serialized with Mattermost's one-letter channel type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Public channel
    #[default]
    #[serde(rename = "O")]
    Public,

    /// Private channel
    #[serde(rename = "P")]
    Private,

    /// Group message between a handful of users
    #[serde(rename = "G")]
    Group,

    /// Direct message between two users
    #[serde(rename = "D")]
    Direct,
}

impl ChannelKind {
    /// Returns `true` for direct and group message channels.
    pub fn is_direct_or_group(self) -> bool {
        matches!(self, ChannelKind::Direct | ChannelKind::Group)
    }

    /// Returns `true` for public and private channels.
    pub fn is_team_channel(self) -> bool {
        matches!(self, ChannelKind::Public | ChannelKind::Private)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Public => write!(f, "public"),
            ChannelKind::Private => write!(f, "private"),
            ChannelKind::Group => write!(f, "group"),
            ChannelKind::Direct => write!(f, "direct"),
        }
    }
}

/// Purpose or topic of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelText {
    #[serde(default)]
    pub value: String,
}

impl From<&str> for ChannelText {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// A channel as found in `channels.json`, `groups.json`, `mpims.json` or `dms.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    /// Member ids, unordered
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub purpose: ChannelText,
    #[serde(default)]
    pub topic: ChannelText,
    #[serde(rename = "type", default)]
    pub kind: ChannelKind,
}

impl RawChannel {
    /// Creates a channel with no members, purpose or topic.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Builder method to set the member ids.
    #[must_use]
    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the creator id.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Builder method to set the purpose text.
    #[must_use]
    pub fn with_purpose(mut self, purpose: &str) -> Self {
        self.purpose = purpose.into();
        self
    }

    /// Builder method to set the topic text.
    #[must_use]
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = topic.into();
        self
    }

    /// Key under which this channel's posts are stored in the export.
    ///
    /// Direct messages have no name, so their id is used instead.
    pub fn original_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Profile fields of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bot_id: String,
}

/// A user as found in `users.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    pub id: String,
    #[serde(rename = "name", default)]
    pub username: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub profile: RawProfile,
}

impl RawUser {
    /// Creates a human user with an empty profile.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.profile.email = email.into();
        self
    }

    /// Builder method to set first and last name.
    #[must_use]
    pub fn with_names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.profile.first_name = first.into();
        self.profile.last_name = last.into();
        self
    }

    /// Builder method to mark the user as a bot with the given bot id.
    #[must_use]
    pub fn with_bot_id(mut self, bot_id: impl Into<String>) -> Self {
        self.is_bot = true;
        self.profile.bot_id = bot_id.into();
        self
    }
}

/// Comment attached to a `file_comment` post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user: String,
}

/// One emoji reaction with every user who reacted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawReaction {
    pub name: String,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// File shared in a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "url_private_download", default)]
    pub download_url: String,
    #[serde(default)]
    pub size: i64,
}

/// What a post is, derived from its `type` and `subtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    /// Ordinary message, possibly with files
    Plain,
    /// Comment on a shared file
    FileComment,
    /// Message posted by an integration
    Bot,
    /// Channel join or leave notice
    JoinLeave,
    /// `/me` message
    Me,
    /// Topic change notice
    TopicChange,
    /// Purpose change notice
    PurposeChange,
    /// Rename notice
    NameChange,
    /// Anything else
    Unsupported,
}

/// A single entry of a channel's daily message files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub bot_id: String,
    #[serde(default)]
    pub bot_username: String,
    #[serde(default)]
    pub text: String,
    /// Identity key within a channel
    #[serde(rename = "ts", default)]
    pub timestamp: String,
    /// Timestamp of the thread root, empty when not threaded
    #[serde(rename = "thread_ts", default)]
    pub thread_timestamp: String,
    #[serde(rename = "type", default)]
    pub post_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub comment: Option<RawComment>,
    #[serde(default)]
    pub reactions: Option<Vec<RawReaction>>,
    #[serde(default)]
    pub file: Option<RawFile>,
    #[serde(default)]
    pub files: Option<Vec<RawFile>>,
    /// Slack message attachments, kept as opaque JSON
    #[serde(default)]
    pub attachments: Vec<Value>,
    /// The post's JSON exactly as it appeared in the export
    #[serde(skip)]
    pub original: String,
}

impl RawPost {
    /// Creates a plain message post.
    pub fn message(
        user: impl Into<String>,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            timestamp: timestamp.into(),
            text: text.into(),
            post_type: "message".to_string(),
            ..Self::default()
        }
    }

    /// Builder method to place the post in a thread.
    #[must_use]
    pub fn in_thread(mut self, thread_timestamp: impl Into<String>) -> Self {
        self.thread_timestamp = thread_timestamp.into();
        self
    }

    /// Builder method to set the subtype.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    /// Builder method to set the verbatim JSON capture.
    #[must_use]
    pub fn with_original(mut self, original: impl Into<String>) -> Self {
        self.original = original.into();
        self
    }

    /// Parses one post and keeps its JSON text verbatim in `original`.
    pub fn from_raw_json(raw: &RawValue) -> serde_json::Result<Self> {
        let mut post: RawPost = serde_json::from_str(raw.get())?;
        post.original = raw.get().to_string();
        Ok(post)
    }

    /// Classifies the post by its `type`/`subtype` discriminator.
    pub fn kind(&self) -> PostKind {
        if self.post_type != "message" {
            return PostKind::Unsupported;
        }
        match self.subtype.as_str() {
            "" | "file_share" | "thread_broadcast" => PostKind::Plain,
            "file_comment" => PostKind::FileComment,
            "bot_message" => PostKind::Bot,
            "channel_join" | "channel_leave" => PostKind::JoinLeave,
            "me_message" => PostKind::Me,
            "channel_topic" => PostKind::TopicChange,
            "channel_purpose" => PostKind::PurposeChange,
            "channel_name" => PostKind::NameChange,
            _ => PostKind::Unsupported,
        }
    }

    /// Returns `true` when this post replies inside another post's thread.
    pub fn is_reply(&self) -> bool {
        !self.thread_timestamp.is_empty() && self.thread_timestamp != self.timestamp
    }

    /// Compares every field except `original`.
    pub fn eq_ignoring_original(&self, other: &Self) -> bool {
        let RawPost {
            user,
            bot_id,
            bot_username,
            text,
            timestamp,
            thread_timestamp,
            post_type,
            subtype,
            comment,
            reactions,
            file,
            files,
            attachments,
            original: _,
        } = self;

        *user == other.user
            && *bot_id == other.bot_id
            && *bot_username == other.bot_username
            && *text == other.text
            && *timestamp == other.timestamp
            && *thread_timestamp == other.thread_timestamp
            && *post_type == other.post_type
            && *subtype == other.subtype
            && *comment == other.comment
            && *reactions == other.reactions
            && *file == other.file
            && *files == other.files
            && *attachments == other.attachments
    }
}

/// Metadata of an uploaded file stored in the export archive.
///
/// Descriptors are never modified after they are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Path of the entry inside the archive
    pub name: String,
    /// The entry name is not valid UTF-8
    #[serde(default)]
    pub non_utf8: bool,
    /// CRC-32 of the payload, 0 when unknown
    #[serde(default)]
    pub crc32: u32,
    #[serde(default)]
    pub uncompressed_size: u64,
    /// Raw extra-field blob of the archive entry
    #[serde(default)]
    pub extra: Vec<u8>,
    /// Host-specific permission bits
    #[serde(default)]
    pub external_attrs: u32,
}

/// One workspace's fully parsed export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportSnapshot {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub public_channels: Vec<RawChannel>,
    #[serde(default)]
    pub private_channels: Vec<RawChannel>,
    #[serde(default)]
    pub group_channels: Vec<RawChannel>,
    #[serde(default)]
    pub direct_channels: Vec<RawChannel>,
    #[serde(default)]
    pub users: Vec<RawUser>,
    /// Posts keyed by the channel's original name
    #[serde(default, deserialize_with = "deserialize_posts")]
    pub posts: BTreeMap<String, Vec<RawPost>>,
    /// Upload descriptors keyed by file id
    #[serde(default)]
    pub uploads: BTreeMap<String, Upload>,
}

impl ExportSnapshot {
    /// Creates an empty snapshot for the given team.
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            ..Self::default()
        }
    }

    /// Sets every channel's kind from the collection it is stored in.
    pub fn stamp_channel_kinds(&mut self) {
        let lists = [
            (&mut self.public_channels, ChannelKind::Public),
            (&mut self.private_channels, ChannelKind::Private),
            (&mut self.group_channels, ChannelKind::Group),
            (&mut self.direct_channels, ChannelKind::Direct),
        ];
        for (channels, kind) in lists {
            for channel in channels.iter_mut() {
                channel.kind = kind;
            }
        }
    }

    /// Total number of posts across all channels.
    pub fn post_count(&self) -> usize {
        self.posts.values().map(Vec::len).sum()
    }

    /// Total number of channels across the four collections.
    pub fn channel_count(&self) -> usize {
        self.public_channels.len()
            + self.private_channels.len()
            + self.group_channels.len()
            + self.direct_channels.len()
    }
}

fn deserialize_posts<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<RawPost>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Vec<Box<RawValue>>> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(channel, posts)| {
            let posts = posts
                .iter()
                .map(|post| RawPost::from_raw_json(post))
                .collect::<Result<Vec<_>, _>>()
                .map_err(D::Error::custom)?;
            Ok((channel, posts))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_kind_classification() {
        let cases = [
            ("message", "", PostKind::Plain),
            ("message", "file_share", PostKind::Plain),
            ("message", "thread_broadcast", PostKind::Plain),
            ("message", "file_comment", PostKind::FileComment),
            ("message", "bot_message", PostKind::Bot),
            ("message", "channel_join", PostKind::JoinLeave),
            ("message", "channel_leave", PostKind::JoinLeave),
            ("message", "me_message", PostKind::Me),
            ("message", "channel_topic", PostKind::TopicChange),
            ("message", "channel_purpose", PostKind::PurposeChange),
            ("message", "channel_name", PostKind::NameChange),
            ("message", "pinned_item", PostKind::Unsupported),
            ("event", "", PostKind::Unsupported),
        ];
        for (post_type, subtype, expected) in cases {
            let post = RawPost {
                post_type: post_type.to_string(),
                subtype: subtype.to_string(),
                ..RawPost::default()
            };
            assert_eq!(post.kind(), expected, "{post_type}/{subtype}");
        }
    }

    #[test]
    fn test_is_reply() {
        let root = RawPost::message("U1", "1.000100", "root").in_thread("1.000100");
        let reply = RawPost::message("U1", "2.000100", "reply").in_thread("1.000100");
        let plain = RawPost::message("U1", "3.000100", "plain");
        assert!(!root.is_reply());
        assert!(reply.is_reply());
        assert!(!plain.is_reply());
    }

    #[test]
    fn test_original_name_falls_back_to_id() {
        let dm = RawChannel::new("D123", "", ChannelKind::Direct);
        assert_eq!(dm.original_name(), "D123");
        let general = RawChannel::new("C1", "general", ChannelKind::Public);
        assert_eq!(general.original_name(), "general");
    }

    #[test]
    fn test_eq_ignoring_original() {
        let a = RawPost::message("U1", "1.0", "hi").with_original("{\"a\":1}");
        let b = RawPost::message("U1", "1.0", "hi").with_original("{\"a\":2}");
        let c = RawPost::message("U1", "1.0", "hello");
        assert!(a.eq_ignoring_original(&b));
        assert_ne!(a, b);
        assert!(!a.eq_ignoring_original(&c));
    }

    #[test]
    fn test_deserialize_user_and_channel() {
        let user: RawUser = serde_json::from_str(
            r#"{"id": "U1", "name": "alice", "profile": {"email": "a@x.io", "title": "CTO"}}"#,
        )
        .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.profile.title, "CTO");
        assert!(!user.is_bot);

        let channel: RawChannel = serde_json::from_str(
            r#"{"id": "C1", "name": "general", "members": ["U1"], "purpose": {"value": "chat"}}"#,
        )
        .unwrap();
        assert_eq!(channel.purpose.value, "chat");
        assert_eq!(channel.kind, ChannelKind::Public);
    }

    #[test]
    fn test_from_raw_json_keeps_verbatim_text() {
        let text = r#"{"type":"message","user":"U1","ts":"1.5","text":"hi","last_read":"9"}"#;
        let raw: Box<RawValue> = serde_json::from_str(text).unwrap();
        let post = RawPost::from_raw_json(&raw).unwrap();
        assert_eq!(post.original, text);
        assert_eq!(post.user, "U1");
        assert_eq!(post.kind(), PostKind::Plain);
    }

    #[test]
    fn test_channel_kind_serde() {
        assert_eq!(serde_json::to_string(&ChannelKind::Group).unwrap(), "\"G\"");
        let kind: ChannelKind = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(kind, ChannelKind::Direct);
        assert_eq!(ChannelKind::Private.to_string(), "private");
    }
}
