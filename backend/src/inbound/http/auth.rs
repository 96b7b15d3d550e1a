//! Bearer-token identity extraction.
//!
//! Every protected handler takes an [`Authenticated`] argument. The
//! extractor reads `Authorization: Bearer <token>`, verifies it with the
//! [`TokenVerifier`](crate::domain::ports::TokenVerifier) in [`HttpState`],
//! and yields the calling [`Actor`]. Failures become `401 unauthorized`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenVerificationError;
use crate::domain::{Actor, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Actor);

impl Authenticated {
    pub fn actor(&self) -> Actor {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("access denied: no token provided"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid authorization header"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))
}

fn map_verification_error(err: TokenVerificationError) -> Error {
    debug!(error = %err, "bearer token rejected");
    match err {
        TokenVerificationError::Expired => Error::unauthorized("token has expired"),
        TokenVerificationError::Invalid { .. } | TokenVerificationError::Claims { .. } => {
            Error::unauthorized("invalid token")
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req)?;
    state
        .tokens
        .verify(token)
        .map(Authenticated)
        .map_err(map_verification_error)
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(actix_web::Error::from))
    }
}
