//! Request signing for the external catalog API.
//!
//! The catalog authenticates requests with a per-call nonce, the caller's
//! public key, and an MD5 digest over `nonce + private key + public key`.

use md5::{Digest, Md5};

/// Ephemeral parameters attached to one signed catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    pub nonce: String,
    pub public_key: String,
    pub hash: String,
}

impl SignedParams {
    /// Build signed parameters for a single request.
    pub fn new(nonce: impl Into<String>, private_key: &str, public_key: &str) -> Self {
        let nonce = nonce.into();
        let hash = request_hash(&nonce, private_key, public_key);
        Self {
            nonce,
            public_key: public_key.to_string(),
            hash,
        }
    }
}

/// Lowercase hex MD5 over the concatenation of nonce, private key, public key.
pub fn request_hash(nonce: &str, private_key: &str, public_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(nonce.as_bytes());
    hasher.update(private_key.as_bytes());
    hasher.update(public_key.as_bytes());
    hex::encode(hasher.finalize())
}
