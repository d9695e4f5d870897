use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::services::ServiceError;

/// Stateless bearer-token issuer and verifier (HS256).
///
/// The payload carries only the account identifier plus issuance/expiry
/// times; role and approval state are deliberately absent so every request
/// re-resolves the live account record. There is no revocation list: expiry
/// and secret rotation are the only ways a token dies.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: account id.
    pub sub: Uuid,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            lifetime_minutes: config.token_lifetime_minutes,
        }
    }

    /// Mint a token for an account, expiring after the configured lifetime.
    pub fn issue(&self, account_id: Uuid) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.lifetime_minutes)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("failed to encode token: {}", e)))
    }

    /// Validate a raw token string (already stripped of the `Bearer ` prefix).
    ///
    /// Expiry is checked without leeway; an expired token fails with a kind
    /// distinct from every other signature/structure problem.
    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(ServiceError::TokenExpired),
                _ => Err(ServiceError::InvalidToken),
            },
        }
    }
}
