//! Paystack webhook signature verification.
//!
//! Paystack signs each delivery with HMAC-SHA512 over the raw request body,
//! keyed by the account's secret key, and sends the hex digest in the
//! `x-paystack-signature` header.
//!
//! Verification MUST run against the exact raw bytes received. Re-serialized
//! JSON is not guaranteed byte-identical to the original payload (key order,
//! whitespace), so verifying a re-stringified body intermittently rejects
//! valid events.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Verifier for Paystack webhook signatures.
#[derive(Clone)]
pub struct PaystackWebhookVerifier {
    /// The account secret key that signs webhook deliveries.
    secret: SecretString,
}

impl PaystackWebhookVerifier {
    /// Creates a new verifier with the given secret key.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies that `signature_header` is the hex HMAC-SHA512 of `raw_body`.
    ///
    /// Fail-closed: returns `false` (never panics or errors) on a missing
    /// secret, a missing or malformed header, or a length mismatch. The
    /// digest comparison is constant-time.
    pub fn verify(&self, raw_body: &[u8], signature_header: &str) -> bool {
        let secret = self.secret.expose_secret();
        if secret.is_empty() || signature_header.is_empty() {
            return false;
        }

        let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(raw_body);
        let expected = hex::encode(mac.finalize().into_bytes());

        constant_time_compare(expected.as_bytes(), signature_header.as_bytes())
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex HMAC-SHA512 digest the gateway would send for a body.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
