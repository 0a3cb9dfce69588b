//! Error types for cfgrd-core

use std::path::PathBuf;

/// Result type for cfgrd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving locations, fetching documents,
/// or merging configuration layers.
///
/// Missing resources are deliberately not represented here: a fetch of a
/// nonexistent path yields an empty result, never an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Location string cannot be classified to a known scheme
    #[error("unable to determine a file, classpath or http config source from location '{location}'")]
    UnresolvedScheme { location: String },

    /// An absolute location was required but the string carries neither scheme nor host
    #[error("location '{location}' must be absolute")]
    NotAbsolute { location: String },

    /// A `cfgrd://` location that cannot be split into repo name and path
    #[error("malformed repo location '{location}': {message}")]
    MalformedLocation { location: String, message: String },

    /// Named repo missing from the definitions registry
    #[error("no repo named '{name}' found in the definitions registry")]
    UnknownRepo { name: String },

    /// Discovery produced no start location for this host or environment
    #[error("unable to resolve a start location from the hosts mapping at '{location}'")]
    NoStartLocation { location: String },

    /// Definitions document unreachable or malformed
    #[error("failed to load repo definitions from '{location}': {message}")]
    Definitions { location: String, message: String },

    /// HTTP transport failure: unreachable host, timeout, or unexpected status
    #[error("http fetch of '{url}' failed: {message}")]
    Http { url: String, message: String },

    /// Local file I/O failure other than not-found
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed content handed to a format decoder
    #[error("failed to decode {format} content from '{location}': {message}")]
    Decode {
        location: String,
        format: &'static str,
        message: String,
    },

    /// A typed getter found a value that does not parse as the requested type
    #[error("value '{value}' of key '{key}' does not parse as {target}")]
    ValueParse {
        key: String,
        target: &'static str,
        value: String,
    },
}
