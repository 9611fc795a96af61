//! HS256 bearer-token issuance and verification.
//!
//! The signer owns key material derived from the process-wide secret; the
//! same secret must be used for issuance and verification for the life of
//! the deployment. Rotating it invalidates all outstanding tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::AuthError;

/// Fixed validity window for issued tokens.
pub const TOKEN_VALIDITY_HOURS: i64 = 24;

/// Claim set carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator email the token was issued to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, not fuzzy.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a token for `email`, valid for [`TOKEN_VALIDITY_HOURS`] from now.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::Internal(format!("failed to sign token: {err}")))
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Pure function of (token, secret, current time); no I/O, no shared
    /// mutable state.
    ///
    /// # Errors
    /// Returns `InvalidToken` for a bad signature, malformed input, or an
    /// elapsed expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("token rejected: {err}");
                AuthError::InvalidToken
            })
    }
}
