//! LINE webhook signature verification.
//!
//! LINE signs every webhook delivery with
//! `base64(HMAC-SHA256(channel_secret, raw_body))` in the
//! `X-Line-Signature` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Errors verifying a webhook signature.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Line-Signature header")]
    Missing,

    #[error("signature is not valid base64")]
    Malformed,

    #[error("signature does not match request body")]
    Mismatch,

    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),
}

/// Verify a base64 signature against the raw request body.
///
/// Comparison is constant-time (via the hmac crate's `verify_slice`).
pub fn verify_signature(
    channel_secret: &[u8],
    body: &[u8],
    signature_b64: &str,
) -> Result<(), SignatureError> {
    let expected = STANDARD
        .decode(signature_b64.trim())
        .map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(channel_secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(body);

    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the signature LINE would send for `body`.
pub fn compute_signature(channel_secret: &[u8], body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(channel_secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
