//! Runtime identity: host name, environment label and extra properties
//!
//! Discovery keys host-to-location mappings by host name and environment
//! label, and every merged snapshot carries the process environment as
//! its final layer. Both concerns read from here so that overrides set at
//! construction time win over whatever the process environment reports.

use std::collections::BTreeMap;

use crate::snapshot::FlatMap;

/// Property key under which the detected host name is published.
pub const HOST_NAME: &str = "hostname";
/// Property key under which the environment label is published.
pub const ENV_NAME: &str = "env";

/// Identity of the running process, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct RuntimeIdentity {
    host_name: Option<String>,
    environment: Option<String>,
    extras: BTreeMap<String, String>,
}

impl RuntimeIdentity {
    /// Detect identity from the process environment.
    ///
    /// The host name comes from `HOSTNAME`, falling back to
    /// `COMPUTERNAME`; the environment label from `env`, falling back to
    /// `ENV`. Anything absent stays unset and can be supplied through the
    /// `with_*` builders.
    pub fn detect() -> RuntimeIdentity {
        let host_name = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
            .filter(|v| !v.trim().is_empty());
        let environment = std::env::var("env")
            .or_else(|_| std::env::var("ENV"))
            .ok()
            .filter(|v| !v.trim().is_empty());

        tracing::debug!(
            host = host_name.as_deref().unwrap_or("<unset>"),
            env = environment.as_deref().unwrap_or("<unset>"),
            "detected runtime identity"
        );

        RuntimeIdentity {
            host_name,
            environment,
            extras: BTreeMap::new(),
        }
    }

    /// Override the detected host name.
    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = Some(host_name.into());
        self
    }

    /// Override the detected environment label.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Add an extra property to publish alongside the environment layer.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Materialize the environment layer merged last into every snapshot:
    /// the full process environment, then the extras, then the identity
    /// keys themselves, later entries winning.
    pub fn as_layer(&self) -> FlatMap {
        let mut layer: FlatMap = std::env::vars().collect();
        for (key, value) in &self.extras {
            layer.insert(key.clone(), value.clone());
        }
        if let Some(host) = &self.host_name {
            layer.insert(HOST_NAME.to_string(), host.clone());
        }
        if let Some(env) = &self.environment {
            layer.insert(ENV_NAME.to_string(), env.clone());
        }
        layer
    }
}
