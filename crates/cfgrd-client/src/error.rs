//! Error types for cfgrd-client

/// Result type for cfgrd-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a config client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `cfgrd://` location was used without a definitions document
    #[error("location '{location}' is repo-relative but no definitions location was configured")]
    MissingDefinitions { location: String },

    /// Repo mode was requested for a location that is not repo-relative
    #[error("repo mode requires a cfgrd:// location, got '{location}'")]
    NotRepoRelative { location: String },

    /// Server mode was requested for something other than an http/s endpoint
    #[error("server mode requires an http/s endpoint, got '{location}'")]
    ServerEndpoint { location: String },

    /// The refresh worker could not be started
    #[error("unable to start the refresh worker: {message}")]
    Refresh { message: String },

    /// Resolution, fetch, decode or merge error from cfgrd-core
    #[error(transparent)]
    Core(#[from] cfgrd_core::Error),
}
