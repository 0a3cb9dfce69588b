//! Server-redirect source
//!
//! In server mode the remote endpoint runs the resolution itself: the
//! client sends the path plus `r` (repo name) and `p` (comma-joined
//! named paths) query parameters and receives one already-merged JSON
//! document back. No file-name completion happens on this side.

use crate::decode::{self, Format};
use crate::definitions::RepoDefinition;
use crate::location::strip_leading_separator;
use crate::source::{ConfigSource, Fetched, HttpAdapter, SourceOptions};
use crate::Result;

pub struct ServerSource {
    definition: RepoDefinition,
    adapter: HttpAdapter,
    repo: Option<String>,
}

impl ServerSource {
    pub fn new(
        definition: RepoDefinition,
        options: &SourceOptions,
        repo: Option<String>,
    ) -> Result<ServerSource> {
        let adapter = HttpAdapter::new(&definition, options)?;
        Ok(ServerSource {
            definition,
            adapter,
            repo,
        })
    }

    fn fetch_json(&self, path: &str, named: &[String]) -> Result<Fetched> {
        let mut url = self.adapter.reference_url(strip_leading_separator(path))?;

        if !named.is_empty() || self.repo.is_some() {
            let mut pairs = url.query_pairs_mut();
            if !named.is_empty() {
                pairs.append_pair("p", &named.join(","));
            }
            if let Some(repo) = &self.repo {
                pairs.append_pair("r", repo);
            }
        }

        match self.adapter.fetch_url(url.clone())? {
            None => Ok(Fetched::empty()),
            Some(doc) => {
                let properties = decode::decode(&doc.bytes, Format::Json, url.as_str())?;
                Ok(Fetched {
                    properties,
                    etag: doc.etag,
                })
            }
        }
    }
}

impl ConfigSource for ServerSource {
    fn definition(&self) -> &RepoDefinition {
        &self.definition
    }

    fn fetch_merged(&self, path: &str, named: &[String]) -> Result<Fetched> {
        self.fetch_json(path, named)
    }

    fn fetch_raw(&self, path: &str) -> Result<Fetched> {
        self.fetch_json(path, &[])
    }
}
