//! Location strings and scheme classification
//!
//! A location names where configuration bytes live. Four families are
//! recognized by prefix:
//!
//! ```text
//! file:/opt/configs            local file tree (also UNC `//host/share` and "")
//! classpath:env/dev            lookup across the configured resource roots
//! http://host/configs          remote fetch over http/s
//! cfgrd://repo/path#a,b        repo-relative, resolved through the registry
//! ```
//!
//! Classification is deliberately forgiving: a string that matches no
//! family still parses, carrying no scheme, and is rejected only at the
//! point where a consumer actually needs one.

use url::Url;

use crate::{Error, Result};

/// Scheme family of a location string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Local file access: `file:` URIs, UNC-style double-separator paths,
    /// or the empty string.
    File,
    /// Resource lookup across the ordered resource roots.
    Classpath,
    /// Remote fetch over http or https.
    Http,
    /// Repo-relative `cfgrd://` location resolved through the definitions
    /// registry.
    Repo,
}

impl Scheme {
    /// The coarse source name this scheme maps to in a definitions
    /// document. Classpath lookups are served by the file family; repo
    /// locations have no source of their own.
    pub fn source_name(&self) -> Option<&'static str> {
        match self {
            Scheme::File | Scheme::Classpath => Some("file"),
            Scheme::Http => Some("http"),
            Scheme::Repo => None,
        }
    }
}

/// Parsed form of a location string.
///
/// For `cfgrd://` locations the repo name, relative path and named paths
/// are split out; for every other family the raw string is the payload
/// and the structured fields stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    raw: String,
    scheme: Option<Scheme>,
    repo_name: Option<String>,
    relative_path: String,
    named_paths: Vec<String>,
}

impl Location {
    /// Parse a location string into its descriptor.
    ///
    /// Only a structurally broken `cfgrd://` location fails here (no repo
    /// name to resolve against). Unclassifiable strings parse with
    /// `scheme() == None` and surface [`Error::UnresolvedScheme`] later,
    /// from [`Location::scheme_or_err`].
    pub fn parse(raw: &str) -> Result<Location> {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.starts_with("cfgrd://") {
            return Self::parse_repo_location(trimmed);
        }

        let scheme = if trimmed.is_empty()
            || lower.starts_with("//")
            || lower.starts_with("\\\\")
            || lower.starts_with("file:")
        {
            Some(Scheme::File)
        } else if lower.starts_with("classpath") {
            Some(Scheme::Classpath)
        } else if lower.starts_with("http") {
            Some(Scheme::Http)
        } else {
            tracing::warn!(
                location = trimmed,
                "unable to determine file, classpath or http/s config source from location"
            );
            None
        };

        Ok(Location {
            raw: trimmed.to_string(),
            scheme,
            repo_name: None,
            relative_path: String::new(),
            named_paths: Vec::new(),
        })
    }

    fn parse_repo_location(raw: &str) -> Result<Location> {
        let url = Url::parse(raw).map_err(|e| Error::MalformedLocation {
            location: raw.to_string(),
            message: e.to_string(),
        })?;

        let repo_name = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                return Err(Error::MalformedLocation {
                    location: raw.to_string(),
                    message: "missing repo name".to_string(),
                });
            }
        };

        let relative_path = strip_leading_separator(url.path()).to_string();

        let named_paths = url
            .fragment()
            .map(|f| {
                f.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Location {
            raw: raw.to_string(),
            scheme: Some(Scheme::Repo),
            repo_name: Some(repo_name),
            relative_path,
            named_paths,
        })
    }

    /// The location string as given (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Scheme family, if one could be determined.
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    /// Scheme family, or the resolution error consumers raise for
    /// unclassifiable locations.
    pub fn scheme_or_err(&self) -> Result<Scheme> {
        self.scheme.ok_or_else(|| Error::UnresolvedScheme {
            location: self.raw.clone(),
        })
    }

    /// Repo name of a `cfgrd://` location.
    pub fn repo_name(&self) -> Option<&str> {
        self.repo_name.as_deref()
    }

    /// Path component relative to the repo root, leading separator
    /// already stripped.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Named paths from the fragment, in the order they were written.
    pub fn named_paths(&self) -> &[String] {
        &self.named_paths
    }

    /// Require this location to be absolute.
    ///
    /// A location is absolute when it carries a scheme (any parseable URI)
    /// or a host (UNC-style paths). Everything else, bare relative paths
    /// in particular, is rejected with [`Error::NotAbsolute`].
    pub fn require_absolute(&self) -> Result<()> {
        let unc = self.raw.starts_with("//") || self.raw.starts_with("\\\\");
        if unc || Url::parse(&self.raw).is_ok() {
            return Ok(());
        }
        Err(Error::NotAbsolute {
            location: self.raw.clone(),
        })
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip a single leading path separator.
///
/// Idempotent: after one strip there is never a second separator to
/// remove, so stripping again is a no-op.
pub fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Whether the last segment of `path` names a file (carries an extension)
/// rather than a directory to be completed with a default file name.
pub fn has_file_extension(path: &str) -> bool {
    let last = path.rsplit(['/', '\\']).next().unwrap_or(path);
    std::path::Path::new(last).extension().is_some()
}
