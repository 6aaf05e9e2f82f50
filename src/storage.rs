//! Local filesystem storage for uploaded audio files.
//!
//! Files land in a single directory under `<millis>-<sanitizedStem><ext>`
//! and are exposed under a public URL prefix.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};

use crate::constants::{FALLBACK_FILE_STEM, MAX_NAME_ATTEMPTS};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix: String = url_prefix.into();
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// URL prefix without trailing slash, e.g. `/uploads/audio`
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Create the upload directory if absent; no error if it already exists
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Public URL of a stored file
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix, file_name)
    }

    /// Create a new, empty file for an upload and return its name with the open handle.
    ///
    /// The name is derived from `original_name` and `millis`. When the name is
    /// already taken the timestamp is advanced by one millisecond and the
    /// attempt repeated, so a concurrent upload never overwrites another one.
    pub async fn create_unique(
        &self,
        original_name: &str,
        millis: i64,
    ) -> io::Result<(String, File)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = stored_file_name(original_name, millis + attempt);
            let result = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_for(&file_name))
                .await;

            match result {
                Ok(file) => return Ok((file_name, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "No free file name for '{}' after {} attempts",
                original_name, MAX_NAME_ATTEMPTS
            ),
        ))
    }

    pub async fn remove(&self, file_name: &str) -> io::Result<()> {
        fs::remove_file(self.path_for(file_name)).await
    }
}

/// Strip every character outside `[A-Za-z0-9.\-_]`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// On-disk name for an upload: `<millis>-<sanitizedStem><ext>`.
///
/// Only the last path component of `original_name` is used. Stem and
/// extension are sanitized separately; an empty stem becomes `audio`.
pub fn stored_file_name(original_name: &str, millis: i64) -> String {
    let base = Path::new(original_name)
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new(""));

    let stem = base
        .file_stem()
        .map(|s| sanitize_name(&s.to_string_lossy()))
        .unwrap_or_default();
    // Never emit a stemless `<millis>-.ext`; every stored name keeps a stem
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM.to_string()
    } else {
        stem
    };

    let ext = base
        .extension()
        .map(|e| sanitize_name(&e.to_string_lossy()))
        .unwrap_or_default();

    if ext.is_empty() {
        format!("{}-{}", millis, stem)
    } else {
        format!("{}-{}.{}", millis, stem, ext)
    }
}
