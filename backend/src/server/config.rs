//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use rollcall::domain::User;
use rollcall::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Vec<u8>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) seed_users: Vec<User>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_secret: Vec<u8>) -> Self {
        Self {
            bind_addr,
            token_secret,
            db_pool: None,
            seed_users: Vec::new(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, every repository port is served by the Diesel adapters
    /// and seed users are ignored.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Users preloaded into the in-memory store.
    #[must_use]
    pub fn with_seed_users(mut self, users: Vec<User>) -> Self {
        self.seed_users = users;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware. Without it the server registers a
    /// default instance.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: PrometheusMetrics) -> Self {
        self.prometheus = Some(prometheus);
        self
    }
}
