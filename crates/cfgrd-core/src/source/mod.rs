//! Config sources and their backing adapters
//!
//! A [`SourceAdapter`] moves bytes: given a file reference relative to a
//! repo root it returns the document plus cache metadata, with "not
//! there" reported as `None` rather than an error. A [`ConfigSource`]
//! sits above one adapter and one [`RepoDefinition`] and produces
//! decoded, layer-merged property maps. Adapter variants are selected by
//! the definition's source type; the server variant short-circuits the
//! layering because the remote endpoint merges on its side.

mod classpath;
mod file;
mod http;
mod server;

pub use classpath::ClasspathAdapter;
pub use file::FileAdapter;
pub use http::HttpAdapter;
pub use server::ServerSource;

use std::path::PathBuf;
use std::time::Duration;

use crate::decode::{self, Format};
use crate::definitions::{Credentials, RepoDefinition};
use crate::merge;
use crate::snapshot::FlatMap;
use crate::Result;

/// Tunables applied when adapters are constructed.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Resource roots searched by classpath adapters. Empty means the
    /// defaults: entries from `CFGRD_CLASSPATH` when the variable is
    /// set, otherwise the working directory.
    pub classpath_roots: Vec<PathBuf>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Credentials for fetches made before any definitions record
    /// exists: the definitions document itself, hosts mappings and
    /// ad-hoc roots. Records loaded from a document keep their own.
    pub credentials: Option<Credentials>,
    /// Certificate-validation relaxation for the same bootstrap fetches.
    pub trust_certs: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            classpath_roots: Vec::new(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            credentials: None,
            trust_certs: false,
        }
    }
}

/// Raw document returned by an adapter.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Vec<u8>,
    pub etag: Option<String>,
}

/// Byte-level access to one backing store.
pub trait SourceAdapter: Send + Sync {
    /// Fetch the document at `reference`, relative to the adapter's
    /// root. `Ok(None)` means the resource does not exist; errors are
    /// reserved for the store itself misbehaving.
    fn fetch(&self, reference: &str) -> Result<Option<SourceDocument>>;
}

/// Decoded result of one source fetch.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub properties: FlatMap,
    pub etag: Option<String>,
}

impl Fetched {
    pub fn empty() -> Fetched {
        Fetched::default()
    }
}

/// Property-level access bound to one repo definition.
pub trait ConfigSource: Send + Sync {
    fn definition(&self) -> &RepoDefinition;

    /// Fetch the layers selected by `path` and `named` and merge them.
    ///
    /// Named paths replace the plain path when present, each named path
    /// contributing one layer in caller order. Substitution is not
    /// applied here; it runs once, after the environment layer joins.
    fn fetch_merged(&self, path: &str, named: &[String]) -> Result<Fetched>;

    /// Fetch a single document without layering. Used for host-mapping
    /// and definitions documents, whose values must stay untouched.
    fn fetch_raw(&self, path: &str) -> Result<Fetched>;
}

/// [`ConfigSource`] over any document-per-path adapter (file, classpath
/// and plain http repos).
pub struct DocumentSource {
    definition: RepoDefinition,
    adapter: Box<dyn SourceAdapter>,
}

impl DocumentSource {
    pub fn new(definition: RepoDefinition, adapter: Box<dyn SourceAdapter>) -> DocumentSource {
        DocumentSource {
            definition,
            adapter,
        }
    }

    fn layer(&self, path: &str) -> Result<Fetched> {
        let reference = self.definition.file_reference(path);
        let label = if reference.is_empty() {
            self.definition.root().raw().to_string()
        } else {
            format!("{}/{reference}", self.definition.root().raw())
        };

        match self.adapter.fetch(&reference)? {
            None => {
                tracing::info!(location = label, "no document found, contributing nothing");
                Ok(Fetched::empty())
            }
            Some(doc) => {
                let format = if reference.is_empty() {
                    Format::from_path(self.definition.root().raw())
                } else {
                    Format::from_path(&reference)
                };
                let properties = decode::decode(&doc.bytes, format, &label)?;
                Ok(Fetched {
                    properties,
                    etag: doc.etag,
                })
            }
        }
    }
}

impl ConfigSource for DocumentSource {
    fn definition(&self) -> &RepoDefinition {
        &self.definition
    }

    fn fetch_merged(&self, path: &str, named: &[String]) -> Result<Fetched> {
        let mut layers = Vec::new();
        let mut etag = None;

        if named.is_empty() {
            let fetched = self.layer(path)?;
            etag = fetched.etag;
            layers.push(fetched.properties);
        } else {
            for name in named {
                let fetched = self.layer(name)?;
                if fetched.etag.is_some() {
                    etag = fetched.etag;
                }
                layers.push(fetched.properties);
            }
        }

        Ok(Fetched {
            properties: merge::merge_layers(layers),
            etag,
        })
    }

    fn fetch_raw(&self, path: &str) -> Result<Fetched> {
        self.layer(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::SourceType;
    use crate::location::Location;
    use std::collections::BTreeMap;

    struct MapAdapter(BTreeMap<String, Vec<u8>>);

    impl SourceAdapter for MapAdapter {
        fn fetch(&self, reference: &str) -> Result<Option<SourceDocument>> {
            Ok(self.0.get(reference).map(|bytes| SourceDocument {
                bytes: bytes.clone(),
                etag: None,
            }))
        }
    }

    fn source(documents: &[(&str, &[u8])]) -> DocumentSource {
        let root = Location::parse("classpath:env").unwrap();
        let definition = RepoDefinition::ad_hoc("default", root, SourceType::Classpath);
        let map = documents
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect();
        DocumentSource::new(definition, Box::new(MapAdapter(map)))
    }

    #[test]
    fn plain_path_fetches_one_completed_document() {
        let source = source(&[("dev/default.properties", b"app.name=dev")]);
        let fetched = source.fetch_merged("dev", &[]).unwrap();
        assert_eq!(
            fetched.properties.get("app.name").map(String::as_str),
            Some("dev")
        );
    }

    #[test]
    fn named_paths_replace_the_plain_path_and_merge_in_order() {
        let source = source(&[
            ("dev/default.properties", b"app.name=dev\nignored=should-not-load"),
            ("base/default.properties", b"app.name=base\ndb.host=localhost"),
            ("override/default.properties", b"app.name=override"),
        ]);

        let named = ["base".to_string(), "override".to_string()];
        let fetched = source.fetch_merged("dev", &named).unwrap();

        assert_eq!(
            fetched.properties.get("app.name").map(String::as_str),
            Some("override")
        );
        assert_eq!(
            fetched.properties.get("db.host").map(String::as_str),
            Some("localhost")
        );
        assert!(!fetched.properties.contains_key("ignored"));
    }

    #[test]
    fn missing_documents_contribute_empty_layers() {
        let source = source(&[("present/default.properties", b"k=v")]);
        let named = ["absent".to_string(), "present".to_string()];
        let fetched = source.fetch_merged("", &named).unwrap();
        assert_eq!(fetched.properties.len(), 1);

        let fetched = source.fetch_merged("also-absent", &[]).unwrap();
        assert!(fetched.properties.is_empty());
    }

    #[test]
    fn raw_fetch_skips_layering_and_substitution() {
        let source = source(&[("hosts.properties", b"app-01=classpath:env/dev\n*=${wild}")]);
        let fetched = source.fetch_raw("hosts.properties").unwrap();
        assert_eq!(
            fetched.properties.get("*").map(String::as_str),
            Some("${wild}")
        );
    }
}
