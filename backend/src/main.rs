//! Rollcall server entry point: loads settings, selects the storage backend,
//! and serves the REST API with health probes and OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rollcall::inbound::http::health::HealthState;
use rollcall::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use rollcall::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_args(std::env::args_os()).map_err(io::Error::other)?;
    let config = build_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %settings.bind_addr().map_err(io::Error::other)?, "rollcall listening");
    server.await
}

async fn build_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let token_secret = settings.token_secret().map_err(io::Error::other)?;
    let config = ServerConfig::new(bind_addr, token_secret);

    let config = match settings.database_url.as_deref() {
        Some(database_url) => {
            if settings.run_migrations {
                run_migrations(database_url)
                    .await
                    .map_err(io::Error::other)?;
            }
            if settings.users_file.is_some() {
                warn!("users_file is ignored when a database is configured");
            }
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
            )
            .await
            .map_err(io::Error::other)?;
            config.with_db_pool(pool)
        }
        None => {
            warn!("no database configured; state is kept in memory and lost on restart");
            config.with_seed_users(settings.seed_users().map_err(io::Error::other)?)
        }
    };

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::default_metrics()?);

    Ok(config)
}
