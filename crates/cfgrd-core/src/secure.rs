//! Secure value handling
//!
//! Values of the form `ENC(<ciphertext>)` mark encrypted content. The
//! decryption algorithm itself lives outside this crate; callers plug
//! one in through [`Decrypt`]. Without a decryptor, or when decryption
//! declines, the wrapped value passes through verbatim so downstream
//! consumers can still see that it was meant to be secret.

use std::sync::Arc;

use crate::snapshot::FlatMap;

/// External decryption capability for `ENC()` values.
///
/// Implementations receive the ciphertext with the `ENC()` wrapper
/// already removed and return `None` when they cannot (or choose not
/// to) decrypt it.
pub trait Decrypt: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Option<String>;
}

impl<F> Decrypt for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn decrypt(&self, ciphertext: &str) -> Option<String> {
        self(ciphertext)
    }
}

/// Ciphertext inside an `ENC()` wrapper, when the whole value is one.
pub fn enclosed_ciphertext(value: &str) -> Option<&str> {
    value.strip_prefix("ENC(").and_then(|rest| rest.strip_suffix(')'))
}

/// Decrypt every `ENC()` value in place.
///
/// Runs after merge and substitution so references to encrypted values
/// have already been copied. Values the decryptor declines stay wrapped.
pub fn decrypt_values(properties: &mut FlatMap, decryptor: &Arc<dyn Decrypt>) {
    for (key, value) in properties.iter_mut() {
        let Some(ciphertext) = enclosed_ciphertext(value) else {
            continue;
        };
        match decryptor.decrypt(ciphertext) {
            Some(plaintext) => *value = plaintext,
            None => tracing::warn!(key, "decryption declined, leaving value wrapped"),
        }
    }
}
