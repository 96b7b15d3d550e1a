//! Builders wiring repositories into the HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use rollcall::domain::ports::{AttendanceRepository, ClassRepository, TokenVerifier, UserRepository};
use rollcall::domain::{AttendanceService, ClassRosterService, UserDirectoryService};
use rollcall::inbound::http::state::{HttpState, HttpStatePorts};
use rollcall::outbound::auth::JwtTokenVerifier;
use rollcall::outbound::memory::InMemoryStore;
use rollcall::outbound::persistence::{
    DieselAttendanceRepository, DieselClassRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Assemble the domain services over one set of repositories.
fn build_ports<U, C, A>(
    users: Arc<U>,
    classes: Arc<C>,
    attendance: Arc<A>,
    tokens: Arc<dyn TokenVerifier>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    C: ClassRepository + 'static,
    A: AttendanceRepository + 'static,
{
    let roster = Arc::new(ClassRosterService::new(
        classes.clone(),
        users.clone(),
        clock.clone(),
    ));
    let ledger = Arc::new(AttendanceService::new(
        attendance,
        classes,
        users.clone(),
        clock,
    ));
    HttpStatePorts {
        classes: roster.clone(),
        classes_query: roster,
        attendance: ledger.clone(),
        attendance_query: ledger,
        users: Arc::new(UserDirectoryService::new(users)),
        tokens,
    }
}

/// Build HTTP state from the server configuration.
///
/// A configured pool selects the Diesel adapters; otherwise a fresh
/// in-memory store seeded with the configured users backs every port.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let tokens: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(&config.token_secret));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let ports = match &config.db_pool {
        Some(pool) => {
            info!(backend = "postgres", "repositories configured");
            build_ports(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselClassRepository::new(pool.clone())),
                Arc::new(DieselAttendanceRepository::new(pool.clone())),
                tokens,
                clock,
            )
        }
        None => {
            info!(
                backend = "memory",
                users = config.seed_users.len(),
                "repositories configured"
            );
            let store = Arc::new(InMemoryStore::with_users(config.seed_users.clone()));
            build_ports(store.clone(), store.clone(), store, tokens, clock)
        }
    };

    web::Data::new(HttpState::new(ports))
}
