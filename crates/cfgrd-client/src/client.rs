//! Config client construction and read surface
//!
//! A [`ConfigClient`] is built from [`ClientSettings`], runs its first
//! resolution during [`ConfigClient::init`] and only exists once a
//! snapshot has been published. Readers take lock-free snapshot loads;
//! an optional background worker re-runs the same load plan on an
//! interval and swaps the snapshot on success.

use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use cfgrd_core::definitions::DEFAULT_REPO_NAME;
use cfgrd_core::{
    ad_hoc_source, discovery, merge, source_for, AuthMethod, ConfigSource, Credentials, Decrypt,
    FlatMap, Location, RepoDefinition, RuntimeIdentity, Scheme, ServerSource, Snapshot,
    SourceOptions, SourceRegistry, SourceType,
};

use crate::refresh::Refresher;
use crate::{Error, Result};

/// How the start location is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// The location is an absolute file/classpath/http URI, or a
    /// `cfgrd://` URI resolved through the definitions registry.
    Absolute,
    /// The location must be a `cfgrd://repo/path#named` URI.
    RepoUri,
    /// The location names a hosts mapping document; discovery picks the
    /// start location from it.
    HostFile,
    /// The location is the root URL of a remote config server which
    /// performs resolution itself.
    Server,
}

/// Everything a client needs to run its first resolution.
#[derive(Clone)]
pub struct ClientSettings {
    location: String,
    mode: LoadMode,
    definitions: Option<String>,
    repo: Option<String>,
    path: String,
    named: Vec<String>,
    file_name: Option<String>,
    host_name: Option<String>,
    environment: Option<String>,
    extras: Vec<(String, String)>,
    refresh_interval: Option<Duration>,
    decryptor: Option<Arc<dyn Decrypt>>,
    options: SourceOptions,
}

impl ClientSettings {
    pub fn new(location: impl Into<String>, mode: LoadMode) -> ClientSettings {
        ClientSettings {
            location: location.into(),
            mode,
            definitions: None,
            repo: None,
            path: String::new(),
            named: Vec::new(),
            file_name: None,
            host_name: None,
            environment: None,
            extras: Vec::new(),
            refresh_interval: None,
            decryptor: None,
            options: SourceOptions::default(),
        }
    }

    /// Settings for an absolute file/classpath/http or `cfgrd://`
    /// location.
    pub fn absolute(location: impl Into<String>) -> ClientSettings {
        ClientSettings::new(location, LoadMode::Absolute)
    }

    /// Settings for a `cfgrd://repo/path#named` location.
    pub fn repo_uri(location: impl Into<String>) -> ClientSettings {
        ClientSettings::new(location, LoadMode::RepoUri)
    }

    /// Settings bootstrapping from a hosts mapping document.
    pub fn host_file(location: impl Into<String>) -> ClientSettings {
        ClientSettings::new(location, LoadMode::HostFile)
    }

    /// Settings for a remote config server endpoint.
    pub fn server(endpoint: impl Into<String>) -> ClientSettings {
        ClientSettings::new(endpoint, LoadMode::Server)
    }

    /// Definitions document location, required whenever a `cfgrd://`
    /// location has to be resolved.
    pub fn with_definitions(mut self, location: impl Into<String>) -> Self {
        self.definitions = Some(location.into());
        self
    }

    /// Repo name sent to the server in server mode.
    pub fn with_repo(mut self, name: impl Into<String>) -> Self {
        self.repo = Some(name.into());
        self
    }

    /// Path under the root, for modes where the location does not carry
    /// one.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Named paths, used when the location's fragment does not carry
    /// any.
    pub fn with_named<I, S>(mut self, named: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named = named.into_iter().map(Into::into).collect();
        self
    }

    /// Change the config file name completed onto directory paths.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Basic-auth credentials for http locations used without a
    /// definitions record: ad-hoc roots, the definitions document and
    /// hosts mappings. Records loaded from a document keep their own.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.options.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
            method: AuthMethod::Basic,
        });
        self
    }

    /// Trust self-signed certificates when connecting over https.
    pub fn with_trust_certs(mut self, trust: bool) -> Self {
        self.options.trust_certs = trust;
        self
    }

    /// Override the detected host name before the first resolution.
    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    /// Override the detected environment label before the first
    /// resolution.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Publish an extra property alongside the environment layer.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.push((key.into(), value.into()));
        self
    }

    /// Start background refresh on this interval right after init.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Decryptor applied to `ENC()` values after merge.
    pub fn with_decryptor(mut self, decryptor: Arc<dyn Decrypt>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    /// Add a resource root searched by classpath locations.
    pub fn with_classpath_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.options.classpath_roots.push(root.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.options.read_timeout = timeout;
        self
    }

    fn identity(&self) -> RuntimeIdentity {
        let mut identity = RuntimeIdentity::detect();
        if let Some(host) = &self.host_name {
            identity = identity.with_host_name(host.clone());
        }
        if let Some(env) = &self.environment {
            identity = identity.with_environment(env.clone());
        }
        for (key, value) in &self.extras {
            identity = identity.with_extra(key.clone(), value.clone());
        }
        identity
    }
}

/// Resolved load plan: which source to ask, with which path and named
/// paths. Fixed at init; refresh ticks re-fetch through it without
/// re-running discovery or registry loading.
struct LoadPlan {
    source: Arc<dyn ConfigSource>,
    path: String,
    named: Vec<String>,
}

pub(crate) struct ClientInner {
    plan: LoadPlan,
    identity: RuntimeIdentity,
    decryptor: Option<Arc<dyn Decrypt>>,
    snapshot: ArcSwap<Snapshot>,
}

impl ClientInner {
    /// Re-run the load plan and swap in the new snapshot.
    pub(crate) fn reload(&self) -> Result<()> {
        let fetched = self.plan.source.fetch_merged(&self.plan.path, &self.plan.named)?;
        let merged = merge::merge(
            [fetched.properties, self.identity.as_layer()],
            self.decryptor.as_ref(),
        );
        let snapshot = Snapshot::new(merged, fetched.etag);
        tracing::info!(keys = snapshot.len(), "configs loaded");
        self.snapshot.store(Arc::new(snapshot));
        Ok(())
    }
}

/// Layered configuration client.
///
/// Obtained from [`ConfigClient::init`]; every reader sees one fully
/// merged, substituted snapshot at a time.
pub struct ConfigClient {
    inner: Arc<ClientInner>,
    refresher: Mutex<Option<Refresher>>,
}

impl ConfigClient {
    /// Build the client and run the first resolution.
    ///
    /// Every failure on this path surfaces: unresolved or relative
    /// locations, unknown repos, unreachable stores and malformed
    /// documents. Once `init` returns, a snapshot exists and later
    /// refresh failures can no longer take it away.
    pub fn init(settings: ClientSettings) -> Result<ConfigClient> {
        let identity = settings.identity();
        let location = Location::parse(&settings.location)?;

        let plan = match settings.mode {
            LoadMode::Absolute => {
                location.require_absolute()?;
                plan_for_location(&location, &settings)?
            }
            LoadMode::RepoUri => {
                if location.scheme() != Some(Scheme::Repo) {
                    return Err(Error::NotRepoRelative {
                        location: location.raw().to_string(),
                    });
                }
                plan_for_location(&location, &settings)?
            }
            LoadMode::HostFile => {
                location.require_absolute()?;
                let start = discover_start(&location, &settings, &identity)?;
                plan_for_location(&start, &settings)?
            }
            LoadMode::Server => {
                if location.scheme() != Some(Scheme::Http) {
                    return Err(Error::ServerEndpoint {
                        location: location.raw().to_string(),
                    });
                }
                let definition = ad_hoc_definition("server", &location, SourceType::Server, &settings);
                let source =
                    ServerSource::new(definition, &settings.options, settings.repo.clone())?;
                LoadPlan {
                    source: Arc::new(source),
                    path: settings.path.clone(),
                    named: settings.named.clone(),
                }
            }
        };

        let inner = Arc::new(ClientInner {
            plan,
            identity,
            decryptor: settings.decryptor.clone(),
            snapshot: ArcSwap::from_pointee(Snapshot::empty()),
        });
        inner.reload()?;

        let client = ConfigClient {
            inner,
            refresher: Mutex::new(None),
        };
        if let Some(interval) = settings.refresh_interval {
            client.start_refresh(interval)?;
        }
        Ok(client)
    }

    /// The currently published snapshot. Lock-free; the returned value
    /// stays valid even while newer snapshots are swapped in.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.load_full()
    }

    /// Raw string value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot().get(key).map(str::to_string)
    }

    /// Value for `key` converted to `T`; `Ok(None)` when absent.
    pub fn get_as<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.snapshot().get_as(key)?)
    }

    /// Value for `key` converted to `T`, or `default` when absent.
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.snapshot().get_or(key, default)?)
    }

    /// A copy of all published properties.
    pub fn properties(&self) -> FlatMap {
        self.snapshot().properties().clone()
    }

    /// Re-run the load plan synchronously, surfacing any failure. The
    /// published snapshot is only replaced on success.
    pub fn reload(&self) -> Result<()> {
        self.inner.reload()
    }

    /// Start (or restart with a new interval) the background refresh.
    ///
    /// The previous worker, if any, is stopped before the new one starts
    /// ticking; at most one runs per client.
    pub fn start_refresh(&self, interval: Duration) -> Result<()> {
        let mut guard = self
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
        *guard = Some(Refresher::start(Arc::downgrade(&self.inner), interval)?);
        Ok(())
    }

    /// Stop the background refresh. Idempotent; a no-op when none is
    /// running. Does not interrupt an in-flight fetch.
    pub fn stop_refresh(&self) {
        let mut guard = self
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}

impl Drop for ConfigClient {
    fn drop(&mut self) {
        self.stop_refresh();
    }
}

fn effective_named(location: &Location, settings: &ClientSettings) -> Vec<String> {
    if !location.named_paths().is_empty() {
        location.named_paths().to_vec()
    } else {
        settings.named.clone()
    }
}

fn ad_hoc_definition(
    name: &str,
    location: &Location,
    source_type: SourceType,
    settings: &ClientSettings,
) -> RepoDefinition {
    let mut definition = RepoDefinition::ad_hoc(name, location.clone(), source_type)
        .with_trust_certs(settings.options.trust_certs);
    if let Some(file_name) = &settings.file_name {
        definition = definition.with_file_name(file_name.clone());
    }
    if let Some(credentials) = &settings.options.credentials {
        definition =
            definition.with_basic_auth(credentials.username.clone(), credentials.password.clone());
    }
    definition
}

fn plan_for_location(location: &Location, settings: &ClientSettings) -> Result<LoadPlan> {
    match location.scheme_or_err()? {
        Scheme::Repo => {
            let definitions = settings.definitions.as_deref().ok_or_else(|| {
                Error::MissingDefinitions {
                    location: location.raw().to_string(),
                }
            })?;
            let definitions = Location::parse(definitions)?;
            let registry = SourceRegistry::load_from(&definitions, &settings.options)?;
            // The "default" name also reaches a sole unnamed-default entry.
            let source = match location.repo_name() {
                Some(name) if name != DEFAULT_REPO_NAME => registry.require(name)?,
                _ => registry.find_default().ok_or(cfgrd_core::Error::UnknownRepo {
                    name: DEFAULT_REPO_NAME.to_string(),
                })?,
            };
            Ok(LoadPlan {
                source,
                path: location.relative_path().to_string(),
                named: effective_named(location, settings),
            })
        }
        scheme => {
            let source_type = match scheme {
                Scheme::File => SourceType::File,
                Scheme::Classpath => SourceType::Classpath,
                _ => SourceType::Http,
            };
            let definition = ad_hoc_definition(DEFAULT_REPO_NAME, location, source_type, settings);
            Ok(LoadPlan {
                source: source_for(definition, &settings.options)?,
                path: settings.path.clone(),
                named: effective_named(location, settings),
            })
        }
    }
}

fn discover_start(
    hosts: &Location,
    settings: &ClientSettings,
    identity: &RuntimeIdentity,
) -> Result<Location> {
    let source = ad_hoc_source(hosts, &settings.options)?;
    let mapping = source.fetch_raw("")?.properties;
    match discovery::lookup(&mapping, identity)? {
        Some(start) => {
            tracing::info!(
                hosts = hosts.raw(),
                start = start.raw(),
                "discovered start location"
            );
            Ok(start)
        }
        None => Err(Error::Core(cfgrd_core::Error::NoStartLocation {
            location: hosts.raw().to_string(),
        })),
    }
}
