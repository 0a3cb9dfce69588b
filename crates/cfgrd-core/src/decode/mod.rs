//! Document decoding into flat dotted-key property maps
//!
//! Three wire formats are supported. Java-style properties files are
//! already flat; JSON and YAML documents are flattened by joining nested
//! keys with `.` and indexing sequence elements from zero, so
//! `{"db": {"hosts": ["a", "b"]}}` becomes `db.hosts.0=a` and
//! `db.hosts.1=b`. The format is chosen from the file extension, with
//! properties as the default for anything unrecognized.

mod json;
mod properties;
mod yaml;

use crate::snapshot::FlatMap;
use crate::Result;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Properties,
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file name or path, by extension.
    pub fn from_path(path: &str) -> Format {
        let ext = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Properties,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Format::Properties => "properties",
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

/// Decode `bytes` in the given format into a flat property map.
///
/// `location` only labels errors. Properties decoding is line-oriented
/// and never fails; JSON and YAML report malformed documents and
/// non-mapping roots as [`crate::Error::Decode`].
pub fn decode(bytes: &[u8], format: Format, location: &str) -> Result<FlatMap> {
    let map = match format {
        Format::Properties => properties::decode(bytes),
        Format::Json => json::decode(bytes, location)?,
        Format::Yaml => yaml::decode(bytes, location)?,
    };
    tracing::trace!(
        location,
        format = format.label(),
        keys = map.len(),
        "decoded document"
    );
    Ok(map)
}
