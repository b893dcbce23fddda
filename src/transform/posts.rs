//! Post classification, props and reactions.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::Transformer;
use super::emoji::convert_emoji_name;
use super::models::{IntermediatePost, PROP_ATTACHMENTS, PROP_ORIGINAL, Reaction};
use super::threads::ThreadBuilder;
use crate::export::{ExportSnapshot, PostKind, RawPost, RawReaction, Upload};
use crate::report::{Warning, WarningKind};
use crate::timestamp::{to_microseconds, to_milliseconds};

/// Length of the serialized props in characters.
pub(crate) fn props_rune_count(props: &Map<String, Value>) -> usize {
    if props.is_empty() {
        return 0;
    }
    // Maps with string keys always serialize; a failure counts as oversized.
    serde_json::to_string(props).map_or(usize::MAX, |json| json.chars().count())
}

/// What a post needs to know about its channel.
struct PostTarget {
    name: String,
    direct_members: Option<Vec<String>>,
}

impl Transformer {
    /// Converts every channel's posts into reply trees.
    pub fn transform_posts(&mut self, snapshot: &ExportSnapshot) {
        tracing::info!("Transforming posts");

        let targets: HashMap<String, PostTarget> = self
            .intermediate
            .channels()
            .map(|channel| {
                let direct_members = channel
                    .kind
                    .is_direct_or_group()
                    .then(|| channel.members_usernames.clone());
                let target = PostTarget {
                    name: channel.name.clone(),
                    direct_members,
                };
                (channel.original_name.clone(), target)
            })
            .collect();

        let reporter = self.reporter.clone();
        let mut result = Vec::new();
        for (original_name, posts) in &snapshot.posts {
            let Some(target) = targets.get(original_name) else {
                reporter.report(Warning::new(
                    WarningKind::UnknownChannel,
                    format!("Couldn't find channel {original_name} referenced by posts"),
                ));
                continue;
            };

            // Milliseconds can collide after rounding, microseconds are exact.
            let mut sorted: Vec<&RawPost> = posts.iter().collect();
            sorted.sort_by_key(|post| to_microseconds(&post.timestamp));

            let mut threads = ThreadBuilder::new(target.name.as_str(), &*reporter);
            if let Some(members) = &target.direct_members {
                threads = threads.with_direct_members(members.clone());
            }

            for post in sorted {
                if let Some(new_post) = self.transform_post(post, &target.name, &snapshot.uploads) {
                    threads.add(post, new_post);
                }
            }
            result.extend(threads.into_roots());
        }

        if self.config.add_original {
            result = self.compact_reply_originals(result);
        }

        tracing::debug!(roots = result.len(), "Transformed posts");
        self.intermediate.posts = result;
    }

    fn transform_post(
        &mut self,
        post: &RawPost,
        channel: &str,
        uploads: &BTreeMap<String, Upload>,
    ) -> Option<IntermediatePost> {
        let kind = post.kind();
        let (author_id, message) = match kind {
            PostKind::Unsupported => {
                self.reporter.report(Warning::new(
                    WarningKind::UnsupportedPost,
                    format!(
                        "Unable to import the message as its type is not supported. post_type={}, post_subtype={}",
                        post.post_type, post.subtype
                    ),
                ));
                return None;
            }
            PostKind::FileComment => {
                let Some(comment) = &post.comment else {
                    self.reporter.report(Warning::new(
                        WarningKind::MissingComment,
                        format!(
                            "Unable to import the message as it has no comments. ts={}",
                            post.timestamp
                        ),
                    ));
                    return None;
                };
                (comment.user.as_str(), comment.comment.as_str())
            }
            PostKind::Bot if !post.bot_id.is_empty() => (post.bot_id.as_str(), post.text.as_str()),
            _ => (post.user.as_str(), post.text.as_str()),
        };

        if author_id.is_empty() {
            self.reporter.report(Warning::new(
                WarningKind::MissingAuthor,
                format!(
                    "Unable to import the message as the user field is missing. ts={}",
                    post.timestamp
                ),
            ));
            return None;
        }

        let user = self.resolve_username(author_id);
        let create_at = to_milliseconds(&post.timestamp);
        let reactions = self.convert_reactions(post.reactions.as_deref(), create_at);
        let mut new_post = IntermediatePost {
            user,
            channel: channel.to_string(),
            message: message.to_string(),
            create_at,
            reactions,
            ..IntermediatePost::default()
        };

        let carries_files = matches!(kind, PostKind::Plain | PostKind::Bot);
        if carries_files {
            self.add_files_to_post(post, uploads, &mut new_post);
        }

        let props = self.props_for_post(post, carries_files && !post.attachments.is_empty());
        if props_rune_count(&props) <= self.config.limits.post_props_max_runes {
            new_post.props = props;
        } else if self.config.discard_invalid_props {
            self.reporter.report(Warning::new(
                WarningKind::PostDiscarded,
                format!(
                    "Unable to import the post as props exceed the maximum character count. Skipping as invalid props are discarded. ts={}",
                    post.timestamp
                ),
            ));
            return None;
        } else {
            self.reporter.report(Warning::new(
                WarningKind::PropsDropped,
                format!(
                    "Unable to add the props to post as they exceed the maximum character count. ts={}",
                    post.timestamp
                ),
            ));
        }

        Some(new_post)
    }

    fn props_for_post(&self, post: &RawPost, add_attachments: bool) -> Map<String, Value> {
        let mut props = Map::new();
        if add_attachments {
            props.insert(
                PROP_ATTACHMENTS.to_string(),
                Value::Array(post.attachments.clone()),
            );
        }
        if self.config.add_original {
            props.insert(PROP_ORIGINAL.to_string(), Value::String(post.original.clone()));
        }
        props
    }

    /// One reaction per reacting user, one millisecond after the post.
    fn convert_reactions(
        &mut self,
        reactions: Option<&[RawReaction]>,
        post_create_at: i64,
    ) -> Option<Vec<Reaction>> {
        let reactions = reactions?;
        let mut result = Vec::with_capacity(reactions.len());

        for reaction in reactions {
            if reaction.count != reaction.users.len() {
                self.reporter.report(Warning::new(
                    WarningKind::ReactionCountMismatch,
                    format!(
                        "Reaction count does not match the number of users. reaction={} count={} users={}",
                        reaction.name,
                        reaction.count,
                        reaction.users.len()
                    ),
                ));
            }

            let emoji_name = convert_emoji_name(&reaction.name, &*self.reporter);
            for user_id in &reaction.users {
                result.push(Reaction {
                    user: self.resolve_username(user_id),
                    create_at: post_create_at + 1,
                    emoji_name: emoji_name.clone(),
                });
            }
        }

        Some(result)
    }
}
