//! Compacting the raw JSON of replies onto their root post.

use std::collections::BTreeMap;
use std::io::{self, Write};

use base64::Engine;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde_json::Value;

use super::Transformer;
use super::models::{IntermediatePost, PROP_ORIGINAL, PROP_REPLIES_ARCHIVE};
use super::posts::props_rune_count;
use crate::report::{Warning, WarningKind};

/// JSON-encodes `originals`, compresses it with zlib at the best level and
/// encodes the result as standard base64.
pub fn encode_reply_archive(originals: &BTreeMap<String, String>) -> io::Result<String> {
    let json = serde_json::to_vec(originals)?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
}

impl Transformer {
    /// Stores every root's reply originals in a compressed prop.
    ///
    /// Roots whose props would exceed the ceiling keep their props unchanged,
    /// or are dropped when invalid props are discarded.
    pub(crate) fn compact_reply_originals(
        &self,
        posts: Vec<IntermediatePost>,
    ) -> Vec<IntermediatePost> {
        let max_runes = self.config.limits.post_props_max_runes;
        let mut kept = Vec::with_capacity(posts.len());

        for mut post in posts {
            if post.replies.is_empty() {
                kept.push(post);
                continue;
            }

            let mut originals = BTreeMap::new();
            for reply in &post.replies {
                let key = reply.create_at.to_string();
                match reply.props.get(PROP_ORIGINAL) {
                    Some(Value::String(original)) => {
                        originals.insert(key, original.clone());
                    }
                    _ => self.reporter.report(Warning::new(
                        WarningKind::ReplyOriginalUnavailable,
                        format!(
                            "Unable to completely compile the reply originals since one reply has no raw JSON. reply.create_at={key}"
                        ),
                    )),
                }
            }

            let archive = match encode_reply_archive(&originals) {
                Ok(archive) => archive,
                Err(err) => {
                    self.reporter.report(Warning::new(
                        WarningKind::ReplyOriginalUnavailable,
                        format!("Unable to compress the reply originals: {err}"),
                    ));
                    kept.push(post);
                    continue;
                }
            };

            let mut props = post.props.clone();
            props.insert(PROP_REPLIES_ARCHIVE.to_string(), Value::String(archive));
            let runes = props_rune_count(&props);

            if runes <= max_runes {
                if runes > max_runes / 20 {
                    self.reporter.report(Warning::new(
                        WarningKind::LargeReplyArchive,
                        format!(
                            "Props exceed 5% of the maximum character count. Rune count={runes}, Maximum rune count={max_runes}"
                        ),
                    ));
                }
                post.props = props;
                kept.push(post);
            } else if self.config.discard_invalid_props {
                self.reporter.report(Warning::new(
                    WarningKind::PostDiscarded,
                    "Unable to import the post as props exceed the maximum character count. Skipping as invalid props are discarded.",
                ));
            } else {
                self.reporter.report(Warning::new(
                    WarningKind::PropsDropped,
                    "Unable to add the reply originals to the post as they exceed the maximum character count.",
                ));
                kept.push(post);
            }
        }

        kept
    }
}
