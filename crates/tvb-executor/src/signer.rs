//! Bitget REST request signing.
//!
//! Prehash = `timestamp_ms + UPPER(method) + request_path + body`, no
//! separators. Signature = HMAC-SHA256(api_secret, prehash), Base64 encoded
//! for Bitget (hex is supported for venues that want it).
//!
//! The body string that is signed must be the exact byte sequence put on
//! the wire. `sign_order` serializes once and carries that string forward in
//! `SignedRequest`; nothing downstream re-serializes it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use tvb_core::NormalizedOrder;
use zeroize::Zeroizing;

use crate::error::{ExecutorError, ExecutorResult};

type HmacSha256 = Hmac<Sha256>;

/// Output encoding of the HMAC digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureEncoding {
    #[default]
    Base64,
    Hex,
}

impl SignatureEncoding {
    fn encode(&self, digest: &[u8]) -> String {
        match self {
            Self::Base64 => BASE64.encode(digest),
            Self::Hex => hex::encode(digest),
        }
    }
}

/// Compute the request signature.
///
/// Deterministic: identical inputs always produce the identical signature.
pub fn sign(
    method: &str,
    path: &str,
    timestamp_ms: &str,
    body: &str,
    secret: &[u8],
    encoding: SignatureEncoding,
) -> ExecutorResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| ExecutorError::Signing(format!("invalid HMAC key: {e}")))?;
    mac.update(timestamp_ms.as_bytes());
    mac.update(method.to_ascii_uppercase().as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());
    Ok(encoding.encode(&mac.finalize().into_bytes()))
}

/// A request whose signature covers exactly these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRequest {
    pub method: String,
    pub path: String,
    pub timestamp_ms: String,
    /// Serialized order, byte-identical to what was signed.
    pub body: String,
    pub signature: String,
}

/// Holds the API secret and signs outbound requests.
pub struct RequestSigner {
    secret: Zeroizing<String>,
    encoding: SignatureEncoding,
}

impl RequestSigner {
    pub fn new(secret: Zeroizing<String>, encoding: SignatureEncoding) -> Self {
        Self { secret, encoding }
    }

    /// Sign an arbitrary request.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        timestamp_ms: i64,
        body: String,
    ) -> ExecutorResult<SignedRequest> {
        let timestamp_ms = timestamp_ms.to_string();
        let signature = sign(
            method,
            path,
            &timestamp_ms,
            &body,
            self.secret.as_bytes(),
            self.encoding,
        )?;

        Ok(SignedRequest {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            timestamp_ms,
            body,
            signature,
        })
    }

    /// Serialize an order once and sign the resulting bytes.
    pub fn sign_order(
        &self,
        path: &str,
        order: &NormalizedOrder,
        timestamp_ms: i64,
    ) -> ExecutorResult<SignedRequest> {
        let body = order.to_body()?;
        self.sign_request("POST", path, timestamp_ms, body)
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .field("encoding", &self.encoding)
            .finish()
    }
}
