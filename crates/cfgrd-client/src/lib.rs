//! Layered configuration client for cfgrd
//!
//! Builds on `cfgrd-core` to provide the consuming surface:
//!
//! - **Load modes**: absolute locations, `cfgrd://` repo URIs, hosts-file
//!   bootstrap and remote config servers
//! - **Typed reads**: `get`, `get_as::<T>`, `get_or` over an atomically
//!   swapped snapshot
//! - **Background refresh**: a cancellable periodic worker that re-runs
//!   the load plan and never takes a published snapshot away on failure
//!
//! # Example
//!
//! ```no_run
//! use cfgrd_client::{ClientSettings, ConfigClient};
//!
//! fn main() -> cfgrd_client::Result<()> {
//!     let client = ConfigClient::init(
//!         ClientSettings::absolute("classpath:env/dev")
//!             .with_environment("dev"),
//!     )?;
//!     let pool_size: u32 = client.get_or("db.pool.size", 8)?;
//!     let _ = pool_size;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
mod refresh;

pub use client::{ClientSettings, ConfigClient, LoadMode};
pub use error::{Error, Result};

// Core types a consumer needs alongside the client.
pub use cfgrd_core::{Decrypt, FlatMap, RuntimeIdentity, Snapshot};
