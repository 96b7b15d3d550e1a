//! Test helpers for inbound HTTP components.
//!
//! [`TestApp`] wires the real domain services over an [`InMemoryStore`] and
//! an HS256 verifier, so handler tests exercise the full request path.

use std::sync::Arc;

use actix_web::web;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use crate::domain::service_test_support::fixture_clock;
use crate::domain::{
    AttendanceService, ClassRosterService, Role, User, UserDirectoryService, UserId,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::auth::{JwtTokenVerifier, TokenClaims};
use crate::outbound::memory::InMemoryStore;

const TEST_SECRET: &[u8] = b"rollcall-handler-tests";

/// Services over a shared in-memory store.
pub struct TestApp {
    store: Arc<InMemoryStore>,
    state: web::Data<HttpState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Arc::new(InMemoryStore::with_users(users));
        let clock = fixture_clock();
        let roster = Arc::new(ClassRosterService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let attendance = Arc::new(AttendanceService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            clock,
        ));
        let state = HttpState::new(HttpStatePorts {
            classes: roster.clone(),
            classes_query: roster,
            attendance: attendance.clone(),
            attendance_query: attendance,
            users: Arc::new(UserDirectoryService::new(store.clone())),
            tokens: Arc::new(JwtTokenVerifier::new(TEST_SECRET)),
        });
        Self {
            store,
            state: web::Data::new(state),
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

/// `Authorization` header value carrying a fresh token for `id`.
pub fn bearer(id: UserId, role: Role) -> String {
    let claims = TokenClaims {
        user_id: id.to_string(),
        role: role.as_str().to_owned(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("encode test token");
    format!("Bearer {token}")
}

/// `Authorization` header value for a provisioned user.
pub fn bearer_for(user: &User) -> String {
    bearer(user.id(), user.role())
}
