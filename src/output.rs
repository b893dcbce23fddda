//! JSON output of the intermediate model.
//!
//! The document is the intermediate model with the target team name added:
//!
//! ```json
//! {
//!   "team": "acme",
//!   "public_channels": [...],
//!   "private_channels": [...],
//!   "group_channels": [...],
//!   "direct_channels": [...],
//!   "users": {"U1": {...}},
//!   "posts": [...]
//! }
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::transform::Intermediate;

#[derive(Serialize)]
struct ImportDocument<'a> {
    team: &'a str,
    #[serde(flatten)]
    intermediate: &'a Intermediate,
}

/// Serializes the model as pretty-printed JSON.
pub fn to_json(intermediate: &Intermediate, team: &str) -> Result<String> {
    let document = ImportDocument { team, intermediate };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Writes the model as pretty-printed JSON to `path`.
pub fn write_json(intermediate: &Intermediate, team: &str, path: impl AsRef<Path>) -> Result<()> {
    let document = ImportDocument { team, intermediate };
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
