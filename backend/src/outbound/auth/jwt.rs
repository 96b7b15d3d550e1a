//! HS256 JSON Web Token verifier.
//!
//! Tokens are issued by an external identity provider sharing the secret.
//! The claim set is `{ userId, role, exp }`; the subject is trusted as-is
//! once the signature and expiry verify.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenVerificationError, TokenVerifier};
use crate::domain::{Actor, Role, UserId};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub role: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    fn into_actor(self) -> Result<Actor, TokenVerificationError> {
        let id = UserId::new(&self.user_id)
            .map_err(|err| TokenVerificationError::claims(format!("userId: {err}")))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|err| TokenVerificationError::claims(format!("role: {err}")))?;
        Ok(Actor::new(id, role))
    }
}

/// Verifies HS256 tokens against a shared secret.
#[derive(Clone)]
pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_nbf = false;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<Actor, TokenVerificationError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenVerificationError::expired(),
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                    TokenVerificationError::claims(err.to_string())
                }
                _ => TokenVerificationError::invalid(err.to_string()),
            }
        })?;
        data.claims.into_actor()
    }
}
