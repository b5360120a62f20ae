//! Backend entry-point: loads settings, migrates the schema and serves the REST API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use sresta_backend::inbound::http::health::HealthState;
use sresta_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use sresta_backend::outbound::security::{BuildMode, load_token_secret};
use ortho_config::OrthoConfig;
use sresta_backend::settings::AppSettings;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| startup_error("failed to load configuration", err))?;
    let database_url = settings
        .database_url()
        .ok_or_else(|| startup_error("missing configuration", "SRESTA_DATABASE_URL is not set"))?
        .to_owned();

    run_pending_migrations(&database_url)
        .await
        .map_err(|err| startup_error("database migration failed", err))?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(|err| startup_error("database pool unavailable", err))?;

    let token_secret = load_token_secret(
        settings.token_secret_file(),
        BuildMode::from_debug_assertions(),
        settings.allow_ephemeral_secret,
    )
    .map_err(|err| startup_error("token secret unavailable", err))?;

    let bind_addr = settings.bind_addr();
    let config = ServerConfig::new(bind_addr, pool, token_secret).with_settings(&settings);
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
