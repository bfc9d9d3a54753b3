//! Token issuance and verification
//!
//! Tokens are compact JWS strings signed with HMAC-SHA256 over a pre-shared
//! symmetric secret. Expiry is checked here rather than by the JWT library so
//! that an expired-but-authentic token is reported as
//! [`TokenError::ExpiredToken`] and anything else as
//! [`TokenError::InvalidToken`].

use chrono::{DateTime, TimeDelta};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{error::TokenError, payload::Payload};

/// Required length in bytes of the symmetric secret
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// Issues and verifies authenticated tokens
pub trait TokenMaker: Send + Sync {
    /// Issue a token for `subject` that expires `ttl` from now
    fn create_token(&self, subject: &str, ttl: TimeDelta) -> Result<(String, Payload), TokenError>;

    /// Authenticate `token` and return its payload if it has not expired
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

/// Registered claims carried on the wire
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: Uuid,
    sub: String,
    iat: i64,
    exp: i64,
}

impl From<&Payload> for Claims {
    fn from(payload: &Payload) -> Self {
        Self {
            jti: payload.id,
            sub: payload.subject.clone(),
            iat: payload.issued_at.timestamp(),
            exp: payload.expires_at.timestamp(),
        }
    }
}

impl TryFrom<Claims> for Payload {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Payload {
            id: claims.jti,
            subject: claims.sub,
            issued_at: DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::InvalidToken)?,
            expires_at: DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidToken)?,
        })
    }
}

/// HS256 token maker
#[derive(Clone)]
pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtMaker {
    /// Initialize a new maker, failing fast on a secret of the wrong length
    pub fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        if symmetric_key.len() != SYMMETRIC_KEY_LEN {
            return Err(TokenError::InvalidKeySize {
                expected: SYMMETRIC_KEY_LEN,
                actual: symmetric_key.len(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(symmetric_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(symmetric_key.as_bytes()),
            validation,
        })
    }
}

impl TokenMaker for JwtMaker {
    fn create_token(&self, subject: &str, ttl: TimeDelta) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(subject, ttl)?;

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Claims::from(&payload),
            &self.encoding_key,
        )
        .map_err(TokenError::Encoding)?;

        Ok((token, payload))
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                TokenError::InvalidToken
            })?;

        let payload = Payload::try_from(token_data.claims)?;
        payload.validate()?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

    fn maker() -> JwtMaker {
        JwtMaker::new(KEY).unwrap()
    }

    #[test]
    fn rejects_short_and_long_keys() {
        for key in ["", "too-short", "abcdefghijklmnopqrstuvwxyz0123456789"] {
            assert!(matches!(
                JwtMaker::new(key),
                Err(TokenError::InvalidKeySize { expected: 32, .. })
            ));
        }
    }

    #[test]
    fn created_token_verifies_to_same_payload() {
        let maker = maker();

        let (token, payload) = maker.create_token("u1", TimeDelta::minutes(1)).unwrap();
        let verified = maker.verify_token(&token).unwrap();

        assert_eq!(verified, payload);
        assert_eq!(verified.subject, "u1");
    }

    #[test]
    fn token_expires_after_ttl() {
        let maker = maker();

        let (token, _) = maker.create_token("u1", TimeDelta::seconds(1)).unwrap();
        assert_eq!(maker.verify_token(&token).unwrap().subject, "u1");

        thread::sleep(Duration::from_secs(2));
        assert!(matches!(
            maker.verify_token(&token),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn negative_ttl_is_already_expired() {
        let maker = maker();

        let (token, _) = maker.create_token("u1", TimeDelta::minutes(-1)).unwrap();

        assert!(matches!(
            maker.verify_token(&token),
            Err(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn flipped_byte_is_invalid() {
        let maker = maker();
        let (token, _) = maker.create_token("u1", TimeDelta::minutes(1)).unwrap();

        let claims_start = token.find('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let target = claims_start + 4;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            maker.verify_token(&tampered),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_expired_token_is_invalid_not_expired() {
        let maker = maker();
        let (token, _) = maker.create_token("u1", TimeDelta::minutes(-1)).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(matches!(
            maker.verify_token(&tampered),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn token_from_other_key_is_invalid() {
        let other = JwtMaker::new("0123456789abcdefghijklmnopqrstuv").unwrap();
        let (token, _) = other.create_token("u1", TimeDelta::minutes(1)).unwrap();

        assert!(matches!(
            maker().verify_token(&token),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn malformed_token_is_invalid() {
        let maker = maker();

        for token in ["", "not-a-token", "a.b.c", "...."] {
            assert!(matches!(
                maker.verify_token(token),
                Err(TokenError::InvalidToken)
            ));
        }
    }
}
