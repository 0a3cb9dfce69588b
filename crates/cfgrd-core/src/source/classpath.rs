//! Classpath-style resource lookup
//!
//! A `classpath:` root does not name one directory; it names a relative
//! prefix searched across an ordered list of resource roots, first hit
//! winning. Roots come from [`SourceOptions::classpath_roots`] when set,
//! else from the `CFGRD_CLASSPATH` environment variable (platform
//! path-list syntax), else from the working directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::location::{strip_leading_separator, Location};
use crate::source::{SourceAdapter, SourceDocument, SourceOptions};
use crate::{Error, Result};

/// Environment variable listing extra resource roots.
pub const CLASSPATH_VAR: &str = "CFGRD_CLASSPATH";

pub struct ClasspathAdapter {
    prefix: String,
    roots: Vec<PathBuf>,
}

impl ClasspathAdapter {
    pub fn new(root: &Location, options: &SourceOptions) -> ClasspathAdapter {
        let raw = root.raw();
        let prefix = raw
            .strip_prefix("classpath:")
            .or_else(|| raw.strip_prefix("classpath"))
            .unwrap_or(raw);
        let prefix = strip_leading_separator(prefix).to_string();

        let roots = if options.classpath_roots.is_empty() {
            default_roots()
        } else {
            options.classpath_roots.clone()
        };

        ClasspathAdapter { prefix, roots }
    }

    fn relative(&self, reference: &str) -> PathBuf {
        let mut rel = PathBuf::from(&self.prefix);
        if !reference.is_empty() {
            rel.push(reference);
        }
        rel
    }
}

fn default_roots() -> Vec<PathBuf> {
    match std::env::var_os(CLASSPATH_VAR) {
        Some(joined) if !joined.is_empty() => std::env::split_paths(&joined).collect(),
        _ => vec![PathBuf::from(".")],
    }
}

impl SourceAdapter for ClasspathAdapter {
    fn fetch(&self, reference: &str) -> Result<Option<SourceDocument>> {
        let rel = self.relative(reference);

        for root in &self.roots {
            let candidate = root.join(&rel);
            match std::fs::read(&candidate) {
                Ok(bytes) => {
                    tracing::debug!(path = %candidate.display(), "resolved classpath resource");
                    return Ok(Some(SourceDocument { bytes, etag: None }));
                }
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::Io {
                        path: candidate,
                        source: e,
                    });
                }
            }
        }
        Ok(None)
    }
}
