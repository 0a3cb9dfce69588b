//! Local file adapter

use std::io::ErrorKind;
use std::path::PathBuf;

use url::Url;

use crate::location::Location;
use crate::source::{SourceAdapter, SourceDocument};
use crate::{Error, Result};

/// Adapter reading documents from a file tree.
///
/// The root location may be a `file:` URI, a UNC-style path or a plain
/// path; all of them reduce to a base directory (or a single file, when
/// the root itself names one).
pub struct FileAdapter {
    base: PathBuf,
}

impl FileAdapter {
    pub fn new(root: &Location) -> FileAdapter {
        FileAdapter {
            base: base_path(root),
        }
    }
}

fn base_path(root: &Location) -> PathBuf {
    let raw = root.raw();
    if raw.starts_with("file:") {
        if let Ok(url) = Url::parse(raw) {
            if let Ok(path) = url.to_file_path() {
                return path;
            }
        }
        // file: URIs with a remote host fall back to their path form.
        return PathBuf::from(raw.trim_start_matches("file:"));
    }
    PathBuf::from(raw)
}

impl SourceAdapter for FileAdapter {
    fn fetch(&self, reference: &str) -> Result<Option<SourceDocument>> {
        let path = if reference.is_empty() {
            self.base.clone()
        } else {
            self.base.join(reference)
        };

        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "read document");
                Ok(Some(SourceDocument { bytes, etag: None }))
            }
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(Error::Io { path, source: e }),
        }
    }
}
