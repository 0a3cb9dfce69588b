//! Ordered layer merge and placeholder substitution
//!
//! Layers merge last-write-wins, then `${key}` placeholders are resolved
//! against the merged map until the values stop changing. Unresolvable
//! placeholders stay literal, and a pass ceiling bounds reference cycles.
//! Substitution is therefore total: it cannot fail, only leave tokens
//! in place.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use crate::secure::{self, Decrypt};
use crate::snapshot::FlatMap;

/// Ceiling on substitution passes. A chain of references resolves one
/// link per pass, so any acyclic chain shorter than this settles; a
/// cycle hits the ceiling and keeps its tokens literal.
pub const MAX_SUBSTITUTION_PASSES: usize = 10;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid placeholder regex"));

/// Merge `layers` in order, later layers overwriting earlier ones.
pub fn merge_layers<I>(layers: I) -> FlatMap
where
    I: IntoIterator<Item = FlatMap>,
{
    let mut accumulator = FlatMap::new();
    for layer in layers {
        accumulator.extend(layer);
    }
    accumulator
}

/// Resolve `${key}` placeholders against the map itself.
///
/// Each pass rewrites every value against the previous pass's state, so
/// the outcome does not depend on key iteration order. Passes repeat
/// until a fixpoint or [`MAX_SUBSTITUTION_PASSES`], whichever comes
/// first; tokens for absent keys are left verbatim.
pub fn substitute(properties: FlatMap) -> FlatMap {
    let mut current = properties;
    for pass in 0..MAX_SUBSTITUTION_PASSES {
        let mut next = FlatMap::new();
        let mut changed = false;

        for (key, value) in &current {
            let rewritten = PLACEHOLDER.replace_all(value, |caps: &regex::Captures<'_>| {
                match current.get(&caps[1]) {
                    Some(target) => target.clone(),
                    None => caps[0].to_string(),
                }
            });
            if rewritten != *value {
                changed = true;
            }
            next.insert(key.clone(), rewritten.into_owned());
        }

        if !changed {
            return next;
        }
        current = next;

        if pass + 1 == MAX_SUBSTITUTION_PASSES {
            tracing::warn!(
                passes = MAX_SUBSTITUTION_PASSES,
                "substitution did not settle, leaving remaining placeholders literal"
            );
        }
    }
    current
}

/// Full merge pipeline: ordered overwrite, placeholder substitution,
/// then decryption of `ENC()` values when a decryptor is configured.
pub fn merge<I>(layers: I, decryptor: Option<&Arc<dyn Decrypt>>) -> FlatMap
where
    I: IntoIterator<Item = FlatMap>,
{
    let mut merged = substitute(merge_layers(layers));
    if let Some(decryptor) = decryptor {
        secure::decrypt_values(&mut merged, decryptor);
    }
    if merged.is_empty() {
        tracing::warn!("merge produced an empty property map");
    }
    merged
}
