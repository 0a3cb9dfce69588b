//! Immutable snapshots of merged configuration
//!
//! A snapshot is the unit of publication: consumers read from one fully
//! merged, fully substituted view and are never exposed to a half-updated
//! state. Replacing a snapshot is the publisher's job; a snapshot itself
//! never changes after construction.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Flat dotted-key property map. Sorted keys keep iteration and diffing
/// deterministic.
pub type FlatMap = BTreeMap<String, String>;

/// One immutable view of the merged configuration.
#[derive(Debug, Clone)]
pub struct Snapshot {
    properties: FlatMap,
    loaded_at: DateTime<Utc>,
    etag: Option<String>,
}

impl Snapshot {
    /// Wrap a merged property map, stamping the load time.
    pub fn new(properties: FlatMap, etag: Option<String>) -> Snapshot {
        Snapshot {
            properties,
            loaded_at: Utc::now(),
            etag,
        }
    }

    /// An empty snapshot, used before the first successful load.
    pub fn empty() -> Snapshot {
        Snapshot::new(FlatMap::new(), None)
    }

    /// Raw string value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Value for `key` converted to `T`.
    ///
    /// Returns `Ok(None)` when the key is absent and
    /// [`Error::ValueParse`] when the value does not convert.
    pub fn get_as<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.properties.get(key) {
            None => Ok(None),
            Some(value) => value.parse::<T>().map(Some).map_err(|_| Error::ValueParse {
                key: key.to_string(),
                target: std::any::type_name::<T>(),
                value: value.clone(),
            }),
        }
    }

    /// Value for `key` converted to `T`, or `default` when absent.
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_as(key)?.unwrap_or(default))
    }

    /// All properties in the snapshot.
    pub fn properties(&self) -> &FlatMap {
        &self.properties
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// When this snapshot was assembled.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Entity tag of the backing document, when the source reported one.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}
