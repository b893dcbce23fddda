//! Equivalence checks used when two snapshots carry the same entity.

use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::export::{RawPost, Upload};

/// Extra-field ids whose payload may differ between two copies of one file.
///
/// `0x5455` is the extended timestamp field, which only records access and
/// modification times.
pub const IGNORABLE_EXTRA_FIELDS: &[u16] = &[0x5455];

/// Keys stripped from a post's JSON before comparing originals.
const VOLATILE_POST_KEYS: &[&str] = &["last_read", "subscribed"];

/// One record of an archive entry's extra-field blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraField<'a> {
    pub id: u16,
    pub data: &'a [u8],
}

/// Returns `true` when both member lists hold the same set of ids.
///
/// Order and duplicates are irrelevant.
pub fn members_equal(a: &[String], b: &[String]) -> bool {
    normalized_members(a) == normalized_members(b)
}

fn normalized_members(members: &[String]) -> Vec<&str> {
    let mut members: Vec<&str> = members.iter().map(String::as_str).collect();
    members.sort_unstable();
    members.dedup();
    members
}

/// Checks that two copies of a post describe the same message.
///
/// All parsed fields must be equal. The raw originals must then match once
/// `last_read`, `subscribed` and every `blocks[].block_id` are removed.
pub fn posts_equivalent(a: &RawPost, b: &RawPost) -> Result<bool> {
    if !a.eq_ignoring_original(b) {
        return Ok(false);
    }
    post_originals_equivalent(&a.original, &b.original)
}

/// Compares two raw post JSON documents, ignoring volatile keys.
///
/// Fails when either document is not valid JSON.
pub fn post_originals_equivalent(a: &str, b: &str) -> Result<bool> {
    if a == b {
        return Ok(true);
    }

    let mut a: Value = serde_json::from_str(a)?;
    let mut b: Value = serde_json::from_str(b)?;
    strip_volatile_keys(&mut a);
    strip_volatile_keys(&mut b);

    Ok(serde_json::to_string(&a)? == serde_json::to_string(&b)?)
}

fn strip_volatile_keys(post: &mut Value) {
    let Some(object) = post.as_object_mut() else {
        return;
    };
    for key in VOLATILE_POST_KEYS {
        object.remove(*key);
    }
    if let Some(Value::Array(blocks)) = object.get_mut("blocks") {
        for block in blocks {
            if let Some(block) = block.as_object_mut() {
                block.remove("block_id");
            }
        }
    }
}

/// Splits an extra-field blob into its `(id, len, payload)` records.
///
/// Ids and lengths are little-endian `u16`s.
pub fn parse_extra_fields<'a>(name: &str, mut extra: &'a [u8]) -> Result<Vec<ExtraField<'a>>> {
    let mut fields = Vec::new();
    while extra.len() >= 4 {
        let id = u16::from_le_bytes([extra[0], extra[1]]);
        let size = usize::from(u16::from_le_bytes([extra[2], extra[3]]));
        let remaining = extra.len() - 4;
        if size > remaining {
            return Err(BridgeError::malformed_extra(
                name,
                format!("extra field size {size} is larger than remaining data {remaining}"),
            ));
        }
        fields.push(ExtraField {
            id,
            data: &extra[4..4 + size],
        });
        extra = &extra[4 + size..];
    }
    if !extra.is_empty() {
        return Err(BridgeError::malformed_extra(
            name,
            format!("extra field data left over after parsing: {extra:?}"),
        ));
    }
    Ok(fields)
}

/// Returns `true` if every record is one of [`IGNORABLE_EXTRA_FIELDS`].
pub fn extra_can_be_ignored(fields: &[ExtraField<'_>]) -> bool {
    fields
        .iter()
        .all(|field| IGNORABLE_EXTRA_FIELDS.contains(&field.id))
}

/// Checks that two upload descriptors describe the same file.
///
/// Returns the conflict describing the first difference found.
pub fn check_uploads_equivalent(a: &Upload, b: &Upload) -> Result<()> {
    if a.non_utf8 != b.non_utf8 {
        return Err(BridgeError::conflict(
            "upload",
            "non-UTF-8 flags",
            a.non_utf8,
            b.non_utf8,
        ));
    }
    if a.name != b.name {
        return Err(BridgeError::conflict("upload", "names", &a.name, &b.name));
    }
    if a.crc32 == 0 || b.crc32 == 0 {
        return Err(BridgeError::conflict(
            "upload",
            "unknown CRC-32 checksums",
            a.crc32,
            b.crc32,
        ));
    }
    if a.crc32 != b.crc32 {
        return Err(BridgeError::conflict(
            "upload",
            "CRC-32 checksums",
            a.crc32,
            b.crc32,
        ));
    }
    if a.uncompressed_size != b.uncompressed_size {
        return Err(BridgeError::conflict(
            "upload",
            "uncompressed sizes",
            a.uncompressed_size,
            b.uncompressed_size,
        ));
    }
    if a.extra != b.extra {
        let a_fields = parse_extra_fields(&a.name, &a.extra)?;
        let b_fields = parse_extra_fields(&b.name, &b.extra)?;
        if !extra_can_be_ignored(&a_fields) || !extra_can_be_ignored(&b_fields) {
            return Err(BridgeError::conflict(
                "upload",
                "extra fields",
                &a.extra,
                &b.extra,
            ));
        }
    }
    if a.external_attrs != b.external_attrs {
        return Err(BridgeError::conflict(
            "upload",
            "external attributes",
            a.external_attrs,
            b.external_attrs,
        ));
    }
    Ok(())
}
