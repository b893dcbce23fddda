//! The intermediate model produced by a transform run.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::export::ChannelKind;

/// Props key holding Slack message attachments.
pub const PROP_ATTACHMENTS: &str = "attachments";

/// Props key holding the post's raw JSON.
pub const PROP_ORIGINAL: &str = "slackOriginal";

/// Props key holding the compressed raw JSON of a root post's replies.
pub const PROP_REPLIES_ARCHIVE: &str = "slackOriginalRepliesCompressedBase64";

/// A user ready for import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateUser {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    /// Never empty after sanitizing
    pub email: String,
    pub password: String,
    /// Names of the public and private channels the user belongs to
    pub memberships: Vec<String>,
}

/// A channel ready for import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateChannel {
    pub id: String,
    /// Key of the channel's posts in the export
    pub original_name: String,
    pub name: String,
    pub display_name: String,
    /// Member ids known to the user index
    pub members: Vec<String>,
    /// Usernames of the members, filled for direct and group channels
    pub members_usernames: Vec<String>,
    pub purpose: String,
    pub header: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
}

/// One user's reaction to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub user: String,
    pub create_at: i64,
    pub emoji_name: String,
}

fn serialize_props<S: Serializer>(
    props: &Map<String, Value>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if props.is_empty() {
        serializer.serialize_none()
    } else {
        props.serialize(serializer)
    }
}

fn deserialize_props<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A post ready for import, owning its direct replies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntermediatePost {
    /// Author username
    pub user: String,
    /// Channel name
    pub channel: String,
    pub message: String,
    /// Written as `null` when empty
    #[serde(
        default,
        serialize_with = "serialize_props",
        deserialize_with = "deserialize_props"
    )]
    pub props: Map<String, Value>,
    /// Milliseconds since the epoch, unique within the channel
    pub create_at: i64,
    /// Paths of copied attachment payloads, relative to the attachments dir
    pub attachments: Vec<String>,
    pub replies: Vec<IntermediatePost>,
    pub is_direct: bool,
    /// Usernames of the channel members, for direct and group posts
    pub channel_members: Vec<String>,
    pub reactions: Option<Vec<Reaction>>,
}

impl IntermediatePost {
    /// Number of posts in this thread, the root included.
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Self::thread_len).sum::<usize>()
    }
}

/// Everything a transform run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intermediate {
    pub public_channels: Vec<IntermediateChannel>,
    pub private_channels: Vec<IntermediateChannel>,
    pub group_channels: Vec<IntermediateChannel>,
    pub direct_channels: Vec<IntermediateChannel>,
    #[serde(rename = "users")]
    pub users_by_id: BTreeMap<String, IntermediateUser>,
    /// Root posts grouped per channel
    pub posts: Vec<IntermediatePost>,
}

impl Intermediate {
    /// Iterates over all channels of the four lists.
    pub fn channels(&self) -> impl Iterator<Item = &IntermediateChannel> {
        self.public_channels
            .iter()
            .chain(&self.private_channels)
            .chain(&self.group_channels)
            .chain(&self.direct_channels)
    }

    /// Total number of posts including replies.
    pub fn post_count(&self) -> usize {
        self.posts.iter().map(IntermediatePost::thread_len).sum()
    }

    /// Finds a user by username.
    pub fn user_by_username(&self, username: &str) -> Option<&IntermediateUser> {
        self.users_by_id.values().find(|u| u.username == username)
    }
}
