//! Bearer-token verification adapters.

mod jwt;

pub use jwt::{JwtTokenVerifier, TokenClaims};
