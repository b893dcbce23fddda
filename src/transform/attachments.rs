//! Copying attachment payloads next to the import file.
//!
//! Payloads come either from the export archive, through an [`UploadReader`],
//! or from Slack's servers, through a [`Downloader`]. Both are injected into
//! the [`Transformer`]; no network client is bundled.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use super::Transformer;
use super::models::IntermediatePost;
use crate::config::ATTACHMENTS_INTERNAL;
use crate::error::{BridgeError, Result};
use crate::export::{RawFile, RawPost, Upload};
use crate::report::{Warning, WarningKind};

/// Characters kept as-is in attachment file names besides ASCII alphanumerics.
const FILE_NAME_EXTRA_CHARS: &[char] = &['.', '-', '_'];

/// Letters that decompose poorly and get a conventional transliteration.
const SPECIAL_REPLACEMENTS: [(char, &str); 7] = [
    ('Å', "Aa"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('å', "aa"),
    ('ä', "ae"),
    ('ö', "oe"),
    ('ß', "ss"),
];

/// Source of payloads stored in the export archive.
pub trait UploadReader: Send + Sync {
    /// Opens the payload of an upload for reading.
    fn open(&self, upload: &Upload) -> io::Result<Box<dyn Read + '_>>;
}

/// Reads uploads from a directory the export archive was extracted into.
#[derive(Debug, Clone)]
pub struct DirUploadReader {
    root: PathBuf,
}

impl DirUploadReader {
    /// Creates a reader resolving upload names against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl UploadReader for DirUploadReader {
    fn open(&self, upload: &Upload) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.root.join(&upload.name))?;
        Ok(Box::new(file))
    }
}

/// Fetches payloads that are missing from the archive.
pub trait Downloader: Send + Sync {
    /// Downloads `url` into `dest`. `expected_size` is negative when unknown.
    fn download(&self, url: &str, expected_size: i64, dest: &Path) -> io::Result<()>;
}

/// Reduces a file name to ASCII letters, digits and `allowed` characters.
///
/// A few Nordic and German letters are transliterated, other accented letters
/// lose their accents, remaining non-ASCII characters are dropped and
/// anything else becomes `_`.
pub fn make_alpha_num(name: &str, allowed: &[char]) -> String {
    let mut replaced = String::with_capacity(name.len());
    for c in name.chars() {
        match SPECIAL_REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => replaced.push_str(to),
            None => replaced.push(c),
        }
    }

    replaced
        .nfkd()
        .filter_map(|c| {
            if allowed.contains(&c) || c.is_ascii_alphanumeric() {
                Some(c)
            } else if !c.is_ascii() {
                None
            } else {
                Some('_')
            }
        })
        .collect()
}

/// Path of a file's payload relative to the attachments directory.
pub fn normalized_file_path(file: &RawFile) -> String {
    let name = make_alpha_num(&file.name, FILE_NAME_EXTRA_CHARS);
    format!("{ATTACHMENTS_INTERNAL}/{}/{name}", file.id)
        .nfc()
        .collect()
}

/// Whether a file id can name exactly one directory under the attachments root.
pub fn is_single_segment(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Formats a byte count for log messages.
pub fn human_size(size: i64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if size < 0 {
        return "unknown".to_string();
    }
    if size < 1024 {
        return format!("{size} B");
    }

    let mut value = size as f64 / 1024.0;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} {}", UNITS[UNITS.len() - 1])
}

fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

impl Transformer {
    /// Copies the payloads of a post's files and records their paths.
    ///
    /// Files without a name cannot be accessed and are skipped. A failed copy
    /// is reported and the post keeps its other files.
    pub(crate) fn add_files_to_post(
        &self,
        post: &RawPost,
        uploads: &BTreeMap<String, Upload>,
        target: &mut IntermediatePost,
    ) {
        if self.config.skip_attachments {
            return;
        }

        let files: Vec<&RawFile> = match (&post.file, &post.files) {
            (Some(file), _) => vec![file],
            (None, Some(files)) => files.iter().collect(),
            (None, None) => return,
        };

        for file in files {
            if file.name.is_empty() {
                self.reporter.report(Warning::new(
                    WarningKind::InaccessibleFile,
                    format!(
                        "Not able to access the file {} as file access is denied so skipping",
                        file.id
                    ),
                ));
                continue;
            }

            match self.copy_file(file, uploads) {
                Ok(path) => target.attachments.push(path),
                Err(err) => self.reporter.report(Warning::new(
                    WarningKind::AttachmentFailed,
                    format!("Failed to add file to post: {err}"),
                )),
            }
        }
    }

    fn copy_file(&self, file: &RawFile, uploads: &BTreeMap<String, Upload>) -> Result<String> {
        if !is_single_segment(&file.id) {
            return Err(BridgeError::attachment(
                &file.id,
                None,
                "file id is not a single path segment",
            ));
        }
        let relative = normalized_file_path(file);
        let dest = self.config.attachments_dir.join(&relative);
        let fail = |message: String| BridgeError::attachment(&file.id, Some(dest.clone()), message);

        let upload = uploads.get(&file.id);
        if upload.is_some() || !self.config.allow_download {
            let upload = upload.ok_or_else(|| {
                BridgeError::attachment(&file.id, None, "file is missing from the export")
            })?;
            let reader = self.upload_reader.as_ref().ok_or_else(|| {
                BridgeError::attachment(&file.id, None, "no upload reader configured")
            })?;

            let mut source = reader
                .open(upload)
                .map_err(|e| fail(format!("failed to open {}: {e}", upload.name)))?;
            create_parent_dir(&dest).map_err(|e| fail(e.to_string()))?;
            let out = File::create(&dest).map_err(|e| fail(e.to_string()))?;
            let mut out = BufWriter::new(out);
            io::copy(&mut source, &mut out).map_err(|e| fail(e.to_string()))?;
            out.flush().map_err(|e| fail(e.to_string()))?;

            tracing::debug!(file_id = %file.id, dest = %relative, "Copied attachment");
        } else {
            let downloader = self.downloader.as_ref().ok_or_else(|| {
                BridgeError::attachment(&file.id, None, "no downloader configured")
            })?;

            create_parent_dir(&dest).map_err(|e| fail(e.to_string()))?;
            tracing::info!(
                "Downloading {:?} ({}) into {:?}",
                file.download_url,
                human_size(file.size),
                relative
            );
            downloader
                .download(&file.download_url, file.size, &dest)
                .map_err(|e| fail(format!("download failed: {e}")))?;
            tracing::debug!(file_id = %file.id, "Download successful");
        }

        Ok(relative)
    }
}
