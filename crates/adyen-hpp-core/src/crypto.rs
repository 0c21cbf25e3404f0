//! Cryptographic primitives for HPP signatures.
//!
//! Adyen signs with HMAC-SHA256 keyed by the raw bytes of a hex secret
//! and transports the digest base64-encoded.

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over `message` and return it base64-encoded.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded by
/// the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_base64(key: &[u8], message: &str) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104.
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());

    BASE64_ENGINE.encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison.
///
/// Returns `true` only when both strings are byte-for-byte identical.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
