//! Host-based discovery of the start location
//!
//! A hosts mapping document is a flat map from host name, environment
//! label or the wildcard `"*"` to a location string. Lookup is a
//! three-step fallback; no match is a legitimate answer here and only
//! becomes an error when the caller has no other way to determine a
//! start location.

use crate::identity::RuntimeIdentity;
use crate::location::Location;
use crate::snapshot::FlatMap;
use crate::Result;

/// Wildcard key matching any host.
pub const WILDCARD: &str = "*";

/// Resolve the start location for `identity` from a hosts mapping.
///
/// Tries the exact host name, then the environment label, then the
/// wildcard entry. The matched value is parsed as a location; `Ok(None)`
/// means no key matched.
pub fn lookup(mapping: &FlatMap, identity: &RuntimeIdentity) -> Result<Option<Location>> {
    // Blank values are treated as missing entries.
    let entry = |key: &str| {
        mapping
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    };

    let mut matched = identity
        .host_name()
        .and_then(|host| entry(host).map(|v| (host, v)))
        .or_else(|| identity.environment().and_then(|env| entry(env).map(|v| (env, v))));

    if matched.is_none() {
        tracing::warn!(
            host = identity.host_name().unwrap_or("<unset>"),
            env = identity.environment().unwrap_or("<unset>"),
            "no hosts entry for host or env, falling back to the wildcard entry"
        );
        matched = entry(WILDCARD).map(|v| (WILDCARD, v));
    }

    let Some((key, value)) = matched else {
        tracing::warn!("unable to resolve a config location from the hosts lookup");
        return Ok(None);
    };

    tracing::debug!(key, location = value, "hosts entry matched");
    Location::parse(value).map(Some)
}
