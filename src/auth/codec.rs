//! Token encoding
//!
//! [`UnsignedCodec`] produces JWT-shaped tokens whose third segment is an
//! unkeyed SHA-256 digest. Anyone can mint a token it accepts, so it is only
//! suitable for local and demo use. [`crate::auth::JwtCodec`] implements the
//! same trait with a real HMAC signature.

use crate::auth::models::TokenPayload;
use crate::error::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

const UNSIGNED_HEADER: &[u8] = br#"{"alg":"none","typ":"JWT"}"#;

/// Encodes payloads into opaque strings and reads them back.
///
/// `decode` and `verify` never fail loudly: any string that is not a token
/// this codec produced yields `None`.
pub trait TokenCodec: Send + Sync {
    /// Serialize a payload. Deterministic for a given payload.
    fn encode(&self, payload: &TokenPayload) -> Result<String>;

    /// Parse a token, or `None` if it is malformed or tampered with
    fn decode(&self, token: &str) -> Option<TokenPayload>;

    /// Decode and reject tokens expired at `now`
    fn verify(&self, token: &str, now: i64) -> Option<TokenPayload> {
        self.decode(token)
            .filter(|payload| !payload.is_expired_at(now))
    }
}

/// Development codec: `base64url(header).base64url(payload).base64url(sha256)`
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsignedCodec;

impl UnsignedCodec {
    pub fn new() -> Self {
        Self
    }

    fn digest(signing_input: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(signing_input.as_bytes()))
    }
}

impl TokenCodec for UnsignedCodec {
    fn encode(&self, payload: &TokenPayload) -> Result<String> {
        let header = URL_SAFE_NO_PAD.encode(UNSIGNED_HEADER);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);
        let signing_input = format!("{}.{}", header, body);
        let digest = Self::digest(&signing_input);
        Ok(format!("{}.{}", signing_input, digest))
    }

    fn decode(&self, token: &str) -> Option<TokenPayload> {
        let mut segments = token.split('.');
        let (header, body, digest) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(h), Some(b), Some(d), None) => (h, b, d),
            _ => return None,
        };

        if URL_SAFE_NO_PAD.decode(header).ok()? != UNSIGNED_HEADER {
            return None;
        }

        let signing_input = format!("{}.{}", header, body);
        if Self::digest(&signing_input) != digest {
            return None;
        }

        let bytes = URL_SAFE_NO_PAD.decode(body).ok()?;
        serde_json::from_slice::<TokenPayload>(&bytes)
            .ok()
            .filter(TokenPayload::is_well_formed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use chrono::Duration;

    fn payload() -> TokenPayload {
        TokenPayload::issue("w-1", Role::Worker, 1_000, Duration::seconds(900)).unwrap()
    }

    #[test]
    fn test_encode_and_decode() {
        let codec = UnsignedCodec::new();
        let token = codec.encode(&payload()).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.decode(&token), Some(payload()));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = UnsignedCodec::new();
        assert_eq!(
            codec.encode(&payload()).unwrap(),
            codec.encode(&payload()).unwrap()
        );
    }

    #[test]
    fn test_malformed_tokens_decode_to_none() {
        let codec = UnsignedCodec::new();
        let token = codec.encode(&payload()).unwrap();

        for bad in [
            "",
            ".",
            "..",
            "...",
            "not-a-token",
            "invalid.token.here",
            &token[..token.len() / 2],
            &token[..token.len() - 1],
        ] {
            assert_eq!(codec.decode(bad), None, "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = UnsignedCodec::new();
        let token = codec.encode(&payload()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut forged = payload();
        forged.role = Role::Admin;
        let forged_body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged_body, parts[2]);

        assert_eq!(codec.decode(&tampered), None);
    }

    #[test]
    fn test_rejects_payload_breaking_lifetime_invariant() {
        let codec = UnsignedCodec::new();
        let mut backwards = payload();
        backwards.expires_at = backwards.issued_at;
        let token = codec.encode(&backwards).unwrap();
        assert_eq!(codec.decode(&token), None);
    }

    #[test]
    fn test_verify_uses_given_instant() {
        let codec = UnsignedCodec::new();
        let p = payload();
        let token = codec.encode(&p).unwrap();

        assert!(codec.verify(&token, p.expires_at - 1).is_some());
        assert!(codec.verify(&token, p.expires_at).is_none());
        assert!(codec.verify(&token, p.expires_at + 1).is_none());
    }
}
