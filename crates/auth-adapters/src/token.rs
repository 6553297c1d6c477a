//! Stateless session assertions.
//!
//! A token is an HS256 JWT carrying `{sub, id, exp}` signed with the
//! process-wide secret. The codec holds no per-token state: concurrent
//! validations are independent, side-effect-free, and share no lock.

use chrono::{Duration, Utc};
use domains::{DomainError, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated administrative identity attached to a request after
/// successful authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub admin_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    id: Uuid,
    exp: i64,
}

/// Issues and validates self-contained signed assertions of identity.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Zero leeway: a token is valid strictly until its embedded expiry.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Encodes the principal's claims with an absolute expiry `ttl` from now.
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: principal.username.clone(),
            id: principal.admin_id,
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| DomainError::internal(format!("token issuance failed: {err}")))
    }

    /// Decodes and verifies a token.
    ///
    /// Integrity failure, malformed structure, and expiry all collapse into
    /// the same uniform unauthorized outcome; which check failed is never
    /// echoed back to the caller.
    pub fn validate(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| DomainError::unauthorized("could not validate credentials"))?;
        Ok(Principal {
            username: data.claims.sub,
            admin_id: data.claims.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SecretString::from("test-secret-key".to_string()))
    }

    fn principal() -> Principal {
        Principal {
            username: "admin".to_string(),
            admin_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn issued_token_validates_before_expiry() {
        let codec = codec();
        let principal = principal();
        let token = codec.issue(&principal, Duration::minutes(30)).unwrap();
        assert_eq!(codec.validate(&token).unwrap(), principal);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let token = codec.issue(&principal(), Duration::seconds(-30)).unwrap();
        assert!(codec.validate(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec();
        let token = codec.issue(&principal(), Duration::minutes(30)).unwrap();

        // flip one character at every position; no mutation may validate
        let bytes = token.as_bytes();
        for i in 0..bytes.len() {
            let mut mutated = bytes.to_vec();
            mutated[i] = if mutated[i] == b'A' { b'B' } else { b'A' };
            if mutated == bytes {
                continue;
            }
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(codec.validate(&mutated).is_err(), "mutation at {i} validated");
        }
    }

    #[test]
    fn garbage_tokens_are_rejected_without_panicking() {
        let codec = codec();
        for junk in ["", "a.b.c", "Bearer xyz", "....", "not a jwt at all"] {
            assert!(codec.validate(junk).is_err());
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = codec().issue(&principal(), Duration::minutes(30)).unwrap();
        let other = TokenCodec::new(&SecretString::from("another-secret".to_string()));
        assert!(other.validate(&token).is_err());
    }
}
