//! Merging several exports of the same workspace.
//!
//! A corporate export is not always available. Several workspace exports, each
//! taken from one member's point of view or over a different period, can be
//! combined instead: entities that appear in more than one export are unified
//! when they agree and rejected when they don't.
//!
//! # Example
//!
//! ```rust
//! use slackbridge::export::{ChannelKind, ExportSnapshot, RawChannel};
//! use slackbridge::merge::merge_exports;
//!
//! let mut first = ExportSnapshot::new("acme");
//! first.public_channels.push(
//!     RawChannel::new("C1", "general", ChannelKind::Public).with_members(["U1", "U2"]),
//! );
//!
//! let mut second = ExportSnapshot::new("acme");
//! second.public_channels.push(
//!     RawChannel::new("C1", "general", ChannelKind::Public).with_members(["U2", "U1"]),
//! );
//!
//! let merged = merge_exports(vec![first, second])?;
//! assert_eq!(merged.public_channels.len(), 1);
//! # Ok::<(), slackbridge::BridgeError>(())
//! ```

pub mod compare;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::error::{BridgeError, Result};
use crate::export::{ExportSnapshot, RawChannel, RawPost, RawUser, Upload};

use compare::{check_uploads_equivalent, members_equal, posts_equivalent};

/// Merges snapshots left to right into one.
///
/// A single snapshot is returned unchanged. All snapshots must share one team
/// name. The first conflict aborts the merge.
pub fn merge_exports(snapshots: Vec<ExportSnapshot>) -> Result<ExportSnapshot> {
    let mut snapshots = snapshots.into_iter();
    let Some(mut result) = snapshots.next() else {
        return Err(BridgeError::NoExports);
    };
    let rest: Vec<ExportSnapshot> = snapshots.collect();
    if rest.is_empty() {
        return Ok(result);
    }

    if let Some(other) = rest.iter().find(|s| s.team_name != result.team_name) {
        return Err(BridgeError::TeamMismatch {
            left: result.team_name.clone(),
            right: other.team_name.clone(),
        });
    }

    tracing::info!("Merging {} Slack exports", rest.len() + 1);
    for snapshot in rest {
        result = merge_pair(result, snapshot)?;
    }
    tracing::debug!(
        channels = result.channel_count(),
        users = result.users.len(),
        posts = result.post_count(),
        uploads = result.uploads.len(),
        "Merged exports"
    );
    Ok(result)
}

fn merge_pair(a: ExportSnapshot, b: ExportSnapshot) -> Result<ExportSnapshot> {
    Ok(ExportSnapshot {
        team_name: a.team_name,
        public_channels: merge_channels(a.public_channels, b.public_channels)?,
        private_channels: merge_channels(a.private_channels, b.private_channels)?,
        group_channels: merge_channels(a.group_channels, b.group_channels)?,
        direct_channels: merge_channels(a.direct_channels, b.direct_channels)?,
        users: merge_by_key(a.users, b.users, |u| u.id.clone(), merge_user)?,
        posts: merge_maps_with(a.posts, b.posts, |existing, incoming| {
            let current = std::mem::take(existing);
            *existing = merge_by_key(current, incoming, |p| p.timestamp.clone(), merge_post)?;
            Ok(())
        })?,
        uploads: merge_maps_with(a.uploads, b.uploads, merge_upload)?,
    })
}

/// Merges two lists by identity key.
///
/// Items keep the order in which their key was first seen. Whenever a key
/// repeats, including inside one list, `reconcile` folds the later item into
/// the one already kept.
pub fn merge_by_key<T, K, F, R>(a: Vec<T>, b: Vec<T>, key: F, mut reconcile: R) -> Result<Vec<T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
    R: FnMut(&mut T, T) -> Result<()>,
{
    let mut merged: Vec<T> = Vec::with_capacity(a.len() + b.len());
    let mut index: HashMap<K, usize> = HashMap::with_capacity(a.len() + b.len());

    for item in a.into_iter().chain(b) {
        match index.entry(key(&item)) {
            Entry::Occupied(slot) => reconcile(&mut merged[*slot.get()], item)?,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(item);
            }
        }
    }

    Ok(merged)
}

fn merge_maps_with<K, V, R>(
    mut a: BTreeMap<K, V>,
    b: BTreeMap<K, V>,
    mut reconcile: R,
) -> Result<BTreeMap<K, V>>
where
    K: Ord,
    R: FnMut(&mut V, V) -> Result<()>,
{
    for (key, value) in b {
        match a.get_mut(&key) {
            Some(existing) => reconcile(existing, value)?,
            None => {
                a.insert(key, value);
            }
        }
    }
    Ok(a)
}

fn merge_channels(a: Vec<RawChannel>, b: Vec<RawChannel>) -> Result<Vec<RawChannel>> {
    merge_by_key(a, b, |c| c.id.clone(), merge_channel)
}

/// Channels must agree on everything; members only as a set.
fn merge_channel(existing: &mut RawChannel, incoming: RawChannel) -> Result<()> {
    if existing.id != incoming.id {
        return Err(BridgeError::conflict("channel", "IDs", &existing.id, &incoming.id));
    }
    if existing.name != incoming.name {
        return Err(BridgeError::conflict("channel", "names", &existing.name, &incoming.name));
    }
    if existing.creator != incoming.creator {
        return Err(BridgeError::conflict(
            "channel",
            "creators",
            &existing.creator,
            &incoming.creator,
        ));
    }
    if !members_equal(&existing.members, &incoming.members) {
        return Err(BridgeError::conflict(
            "channel",
            "members",
            &existing.members,
            &incoming.members,
        ));
    }
    if existing.purpose != incoming.purpose {
        return Err(BridgeError::conflict(
            "channel",
            "purposes",
            &existing.purpose.value,
            &incoming.purpose.value,
        ));
    }
    if existing.topic != incoming.topic {
        return Err(BridgeError::conflict(
            "channel",
            "topics",
            &existing.topic.value,
            &incoming.topic.value,
        ));
    }
    if existing.kind != incoming.kind {
        return Err(BridgeError::conflict("channel", "types", existing.kind, incoming.kind));
    }
    Ok(())
}

/// Users may only differ by one side missing its email.
fn merge_user(existing: &mut RawUser, mut incoming: RawUser) -> Result<()> {
    if *existing == incoming {
        return Ok(());
    }

    let mut candidate = existing.clone();
    if candidate.profile.email.is_empty() {
        candidate.profile.email.clone_from(&incoming.profile.email);
    }
    if incoming.profile.email.is_empty() {
        incoming.profile.email.clone_from(&candidate.profile.email);
    }

    if candidate == incoming {
        *existing = candidate;
        Ok(())
    } else {
        Err(BridgeError::conflict(
            "user",
            "fields other than email",
            &*existing,
            &incoming,
        ))
    }
}

fn merge_post(existing: &mut RawPost, incoming: RawPost) -> Result<()> {
    if posts_equivalent(existing, &incoming)? {
        Ok(())
    } else {
        Err(BridgeError::conflict(
            "post",
            "contents",
            &existing.original,
            &incoming.original,
        ))
    }
}

/// The first descriptor stays canonical.
fn merge_upload(existing: &mut Upload, incoming: Upload) -> Result<()> {
    check_uploads_equivalent(existing, &incoming)
}
