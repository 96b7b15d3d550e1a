//! Port for resolving a bearer token into an [`Actor`].

use crate::domain::Actor;

use super::define_port_error;

define_port_error! {
    /// Reasons a bearer token is rejected.
    pub enum TokenVerificationError {
        /// The token is not well formed or its signature does not verify.
        Invalid { message: String } => "invalid token: {message}",
        /// The token is past its expiry.
        Expired => "token has expired",
        /// The token verified but its claims do not describe a user.
        Claims { message: String } => "invalid token claims: {message}",
    }
}

/// Verifies bearer tokens issued by the external identity provider.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Actor, TokenVerificationError>;
}
