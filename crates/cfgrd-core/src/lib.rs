//! Core resolution and merge layer for cfgrd
//!
//! This crate turns location strings into published property snapshots,
//! implementing:
//!
//! - **Location resolution**: scheme classification and `cfgrd://`
//!   repo-relative descriptors
//! - **Source registry**: named backing stores loaded from a YAML
//!   definitions document
//! - **Source adapters**: file, classpath, http and server variants
//!   behind one fetch contract
//! - **Merge engine**: ordered last-write-wins layering, `${key}`
//!   substitution with a cycle guard, `ENC()` decryption hook
//! - **Discovery**: host/environment/wildcard lookup for host-file
//!   bootstraps
//!
//! # Architecture
//!
//! ```text
//! location -> registry/source -> decode -> merge -> Snapshot
//!                   ^
//!     discovery ----+  (host-file bootstrap only)
//! ```
//!
//! The client crate layers identity, refresh scheduling and the typed
//! accessor surface on top.

pub mod decode;
pub mod definitions;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod location;
pub mod merge;
pub mod registry;
pub mod secure;
pub mod snapshot;
pub mod source;

pub use definitions::{AuthMethod, Credentials, RepoDefinition, SourceType};
pub use error::{Error, Result};
pub use identity::RuntimeIdentity;
pub use location::{Location, Scheme};
pub use registry::{ad_hoc_source, source_for, SourceRegistry};
pub use secure::Decrypt;
pub use snapshot::{FlatMap, Snapshot};
pub use source::{ConfigSource, Fetched, ServerSource, SourceAdapter, SourceOptions};
