//! HS256-signed JWT codec

use crate::auth::codec::TokenCodec;
use crate::auth::models::TokenPayload;
use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Signs tokens with a shared secret.
///
/// Expiry is not checked here; [`TokenCodec::verify`] compares against the
/// injected clock instead of the library's own notion of now.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("JWT secret must not be empty".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, payload: &TokenPayload) -> Result<String> {
        encode(&Header::default(), payload, &self.encoding)
            .map_err(|e| Error::Other(format!("Failed to create token: {}", e)))
    }

    fn decode(&self, token: &str) -> Option<TokenPayload> {
        match decode::<TokenPayload>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims).filter(TokenPayload::is_well_formed),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                None
            }
        }
    }
}
