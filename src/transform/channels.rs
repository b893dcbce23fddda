//! Channel naming, reclassification and sanitizing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::Transformer;
use super::models::IntermediateChannel;
use crate::config::Limits;
use crate::export::{ChannelKind, ExportSnapshot, RawChannel};
use crate::report::{Reporter, Warning, WarningKind};

/// Prefix that makes one-character names long enough.
const SHORT_NAME_PREFIX: &str = "slack-channel-";

static CHANNEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("channel name pattern is valid"));

/// Returns `true` if `name` only holds ASCII letters, digits, `-` and `_`.
pub fn is_valid_channel_name(name: &str) -> bool {
    CHANNEL_NAME.is_match(name)
}

/// Keeps at most `max` characters of `s`.
pub fn truncate_runes(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn truncate_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c| c == '_' || c == '-')
}

fn prefix_short_name(name: &mut String) {
    if name.len() == 1 {
        name.insert_str(0, SHORT_NAME_PREFIX);
    }
}

impl IntermediateChannel {
    /// Brings names and texts within the platform limits.
    ///
    /// Direct channels are left untouched.
    pub fn sanitize(&mut self, limits: &Limits, reporter: &dyn Reporter) {
        if self.kind == ChannelKind::Direct {
            return;
        }

        self.name = trim_separators(&self.name).to_string();
        if self.name.len() > limits.channel_name_max_len {
            self.report_truncated("handle", reporter);
            truncate_bytes(&mut self.name, limits.channel_name_max_len);
        }
        prefix_short_name(&mut self.name);
        if !is_valid_channel_name(&self.name) {
            self.name = self.id.to_lowercase();
        }

        self.display_name = trim_separators(&self.display_name).to_string();
        if self.display_name.chars().count() > limits.display_name_max_runes {
            self.report_truncated("display name", reporter);
            self.display_name = truncate_runes(&self.display_name, limits.display_name_max_runes);
        }
        prefix_short_name(&mut self.display_name);

        if self.purpose.chars().count() > limits.purpose_max_runes {
            self.report_truncated("purpose", reporter);
            self.purpose = truncate_runes(&self.purpose, limits.purpose_max_runes);
        }

        if self.header.chars().count() > limits.header_max_runes {
            self.report_truncated("header", reporter);
            self.header = truncate_runes(&self.header, limits.header_max_runes);
        }
    }

    fn report_truncated(&self, field: &str, reporter: &dyn Reporter) {
        reporter.report(Warning::new(
            WarningKind::ChannelFieldTruncated,
            format!(
                "Channel {} {field} exceeds the maximum length. It will be truncated when imported.",
                self.display_name
            ),
        ));
    }
}

impl Transformer {
    /// Transforms the four channel lists.
    ///
    /// Each channel lands in the list of its final kind: demoted groups and,
    /// in internal-only mode, every direct and group channel end up private.
    pub fn transform_all_channels(&mut self, snapshot: &ExportSnapshot) {
        tracing::info!("Transforming channels");

        let sources = snapshot
            .public_channels
            .iter()
            .chain(&snapshot.private_channels)
            .chain(&snapshot.group_channels)
            .chain(&snapshot.direct_channels);

        for raw in sources {
            let Some(channel) = self.transform_channel(raw) else {
                continue;
            };
            let list = match channel.kind {
                ChannelKind::Public => &mut self.intermediate.public_channels,
                ChannelKind::Private => &mut self.intermediate.private_channels,
                ChannelKind::Group => &mut self.intermediate.group_channels,
                ChannelKind::Direct => &mut self.intermediate.direct_channels,
            };
            list.push(channel);
        }

        tracing::debug!(
            public = self.intermediate.public_channels.len(),
            private = self.intermediate.private_channels.len(),
            group = self.intermediate.group_channels.len(),
            direct = self.intermediate.direct_channels.len(),
            "Transformed channels"
        );
    }

    fn transform_channel(&self, raw: &RawChannel) -> Option<IntermediateChannel> {
        let users = &self.intermediate.users_by_id;
        let reporter = &*self.reporter;
        let limits = &self.config.limits;
        let internal_only = self.config.team_internal_only;

        let members: Vec<String> = raw
            .members
            .iter()
            .filter(|id| users.contains_key(id.as_str()))
            .cloned()
            .collect();

        let mut kind = raw.kind;
        if kind.is_direct_or_group() && members.len() <= 1 {
            reporter.report(Warning::new(
                WarningKind::SingleMemberChannel,
                format!(
                    "Bulk export for direct channels containing a single member is not supported. Not importing channel {}",
                    raw.original_name()
                ),
            ));
            return None;
        }

        let mut source_name = raw.name.as_str();
        if kind == ChannelKind::Group && members.len() > limits.group_max_members {
            source_name = raw.purpose.value.as_str();
            kind = ChannelKind::Private;
        }

        let mut name = trim_separators(source_name).to_string();
        if internal_only && kind.is_direct_or_group() {
            let mut usernames: Vec<&str> = members
                .iter()
                .filter_map(|id| users.get(id))
                .map(|user| user.username.as_str())
                .collect();
            usernames.sort_unstable();
            let tag = if kind == ChannelKind::Direct {
                "direct"
            } else {
                "group"
            };
            name = format!("{}-{tag}-{}", raw.id.to_lowercase(), usernames.join("-"));
        }
        prefix_short_name(&mut name);
        if !is_valid_channel_name(&name) {
            name = raw.id.to_lowercase();
        }

        if internal_only && kind.is_direct_or_group() {
            kind = ChannelKind::Private;
        }

        let mut channel = IntermediateChannel {
            id: raw.id.clone(),
            original_name: raw.original_name().to_string(),
            display_name: name.clone(),
            name,
            members,
            members_usernames: Vec::new(),
            purpose: raw.purpose.value.clone(),
            header: raw.topic.value.clone(),
            topic: String::new(),
            kind,
        };

        if kind.is_team_channel() {
            self.overrides.apply_channel(&mut channel, reporter);
        }
        channel.sanitize(limits, reporter);
        Some(channel)
    }

    /// Records every user's public and private channel names.
    pub fn populate_user_memberships(&mut self) {
        tracing::info!("Populating user memberships");

        let intermediate = &mut self.intermediate;
        for user in intermediate.users_by_id.values_mut() {
            user.memberships.clear();
        }

        let team_channels = intermediate
            .public_channels
            .iter()
            .chain(&intermediate.private_channels);
        for channel in team_channels {
            let mut seen = HashSet::new();
            for member in &channel.members {
                if !seen.insert(member) {
                    continue;
                }
                if let Some(user) = intermediate.users_by_id.get_mut(member) {
                    user.memberships.push(channel.name.clone());
                }
            }
        }
    }

    /// Resolves member usernames of group and direct channels.
    pub fn populate_channel_memberships(&mut self) {
        tracing::info!("Populating channel memberships");

        let intermediate = &mut self.intermediate;
        let users = &intermediate.users_by_id;
        let channels = intermediate
            .group_channels
            .iter_mut()
            .chain(intermediate.direct_channels.iter_mut());
        for channel in channels {
            channel.members_usernames = channel
                .members
                .iter()
                .filter_map(|id| users.get(id))
                .map(|user| user.username.clone())
                .collect();
        }
    }
}
