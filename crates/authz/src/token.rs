use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string
    pub sub: String,
    /// Username at issuance
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 tokens with a process-wide key.
///
/// Validity is signature plus expiry only: there is no audience, issuer or
/// revocation check.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock in `validate_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Signs a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at + Duration::seconds(TOKEN_TTL_SECS);
        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Sign)?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Verifies the signature, then rejects the token once `now >= exp`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}
