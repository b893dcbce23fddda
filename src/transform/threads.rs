//! Thread reconstruction for one channel.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use super::models::IntermediatePost;
use crate::export::RawPost;
use crate::report::{Reporter, Warning, WarningKind};

/// Builds the reply trees of one channel from its posts in timestamp order.
///
/// Roots live in an arena and are looked up by their Slack `ts`, so a reply
/// is attached with a single map lookup.
pub struct ThreadBuilder<'r> {
    reporter: &'r dyn Reporter,
    channel: String,
    channel_members: Option<Vec<String>>,
    timestamps: HashSet<i64>,
    roots: HashMap<String, usize>,
    arena: Vec<IntermediatePost>,
}

impl<'r> ThreadBuilder<'r> {
    /// Creates a builder for a team channel.
    pub fn new(channel: impl Into<String>, reporter: &'r dyn Reporter) -> Self {
        Self {
            reporter,
            channel: channel.into(),
            channel_members: None,
            timestamps: HashSet::new(),
            roots: HashMap::new(),
            arena: Vec::new(),
        }
    }

    /// Marks the channel as direct or group with the given member usernames.
    #[must_use]
    pub fn with_direct_members(mut self, members: Vec<String>) -> Self {
        self.channel_members = Some(members);
        self
    }

    /// Adds a post, bumping its `create_at` until it is unique in the channel.
    ///
    /// A reply whose root is unknown is reported and dropped.
    pub fn add(&mut self, original: &RawPost, mut post: IntermediatePost) {
        if let Some(members) = &self.channel_members {
            post.is_direct = true;
            post.channel_members.clone_from(members);
        }

        while self.timestamps.contains(&post.create_at) {
            post.create_at += 1;
        }
        self.timestamps.insert(post.create_at);

        if original.is_reply() {
            match self.roots.get(&original.thread_timestamp) {
                Some(&index) => self.arena[index].replies.push(post),
                None => self.reporter.report(Warning::new(
                    WarningKind::MissingThreadRoot,
                    format!(
                        "Couldn't find the root post of thread {} in channel {} for post {}",
                        original.thread_timestamp, self.channel, original.timestamp
                    ),
                )),
            }
            return;
        }

        match self.roots.entry(original.timestamp.clone()) {
            Entry::Occupied(slot) => {
                self.reporter.report(Warning::new(
                    WarningKind::ThreadRootOverwritten,
                    format!(
                        "Overwriting root post for thread {} in channel {}",
                        original.timestamp, self.channel
                    ),
                ));
                self.arena[*slot.get()] = post;
            }
            Entry::Vacant(slot) => {
                slot.insert(self.arena.len());
                self.arena.push(post);
            }
        }
    }

    /// Returns the root posts in the order they were first added.
    pub fn into_roots(self) -> Vec<IntermediatePost> {
        self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;

    fn post(create_at: i64, message: &str) -> IntermediatePost {
        IntermediatePost {
            user: "alice".into(),
            channel: "general".into(),
            message: message.into(),
            create_at,
            ..IntermediatePost::default()
        }
    }

    #[test]
    fn test_collisions_are_bumped() {
        let reporter = CollectingReporter::new();
        let mut threads = ThreadBuilder::new("general", &reporter);
        threads.add(&RawPost::message("U1", "1.0001", "a"), post(1000, "a"));
        threads.add(&RawPost::message("U1", "1.0002", "b"), post(1000, "b"));
        threads.add(&RawPost::message("U1", "1.0003", "c"), post(1000, "c"));

        let roots = threads.into_roots();
        let times: Vec<i64> = roots.iter().map(|p| p.create_at).collect();
        assert_eq!(times, vec![1000, 1001, 1002]);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_replies_attach_to_root() {
        let reporter = CollectingReporter::new();
        let mut threads = ThreadBuilder::new("general", &reporter);
        threads.add(
            &RawPost::message("U1", "1.000100", "root").in_thread("1.000100"),
            post(1000, "root"),
        );
        threads.add(
            &RawPost::message("U2", "1.000400", "reply").in_thread("1.000100"),
            post(1000, "reply"),
        );

        let roots = threads.into_roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].replies.len(), 1);
        assert_eq!(roots[0].replies[0].create_at, 1001);
    }

    #[test]
    fn test_missing_root_drops_reply_but_consumes_timestamp() {
        let reporter = CollectingReporter::new();
        let mut threads = ThreadBuilder::new("general", &reporter);
        threads.add(
            &RawPost::message("U2", "2.0", "orphan").in_thread("1.0"),
            post(2000, "orphan"),
        );
        threads.add(&RawPost::message("U1", "2.0001", "next"), post(2000, "next"));

        let roots = threads.into_roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].create_at, 2001);
        assert_eq!(reporter.count(WarningKind::MissingThreadRoot), 1);
    }

    #[test]
    fn test_duplicate_root_overwrites() {
        let reporter = CollectingReporter::new();
        let mut threads = ThreadBuilder::new("general", &reporter);
        threads.add(&RawPost::message("U1", "5.0", "first"), post(5000, "first"));
        threads.add(&RawPost::message("U1", "5.0", "second"), post(5000, "second"));

        let roots = threads.into_roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].message, "second");
        assert_eq!(reporter.count(WarningKind::ThreadRootOverwritten), 1);
    }

    #[test]
    fn test_direct_members_are_echoed() {
        let reporter = CollectingReporter::new();
        let mut threads = ThreadBuilder::new("dm", &reporter)
            .with_direct_members(vec!["alice".into(), "bob".into()]);
        threads.add(&RawPost::message("U1", "1.0", "hey"), post(1000, "hey"));

        let roots = threads.into_roots();
        assert!(roots[0].is_direct);
        assert_eq!(roots[0].channel_members, vec!["alice", "bob"]);
    }
}
