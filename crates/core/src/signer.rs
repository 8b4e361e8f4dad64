//! Record signing.
//!
//! The legacy scheme is a plain content hash, not a cryptographic signature:
//! no key material, no verification path, trivially reproducible by anyone
//! holding the content and the secret. It is kept behind the [`Signer`]
//! trait so a real scheme (asymmetric signature plus certificate) can be
//! substituted without touching the record state machine.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Produces the signature hash stamped onto a clinical record.
pub trait Signer: Send + Sync {
    fn seal(&self, content: &str, secret: &str, signed_at: DateTime<Utc>) -> String;
}

/// Hex-encoded SHA-256 over content, confirmation secret and the signing
/// timestamp in milliseconds. Because the timestamp participates, re-signing
/// the same content yields a different hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Signer;

impl Signer for Sha256Signer {
    fn seal(&self, content: &str, secret: &str, signed_at: DateTime<Utc>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update(secret.as_bytes());
        hasher.update(signed_at.timestamp_millis().to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}
