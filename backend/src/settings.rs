//! Application configuration loaded via OrthoConfig.
//!
//! Every field can be set with a `SRESTA_`-prefixed environment variable
//! (`SRESTA_DATABASE_URL`, `SRESTA_BIND_ADDR`, ...), a config file or a CLI
//! flag. Accessors apply the defaults.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::path::PathBuf;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TOKEN_TTL_HOURS: u32 = 24;
const DEFAULT_LOCATION_STALE_AFTER_MINUTES: u32 = 10;

/// Startup configuration for the storefront backend.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SRESTA")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Admin dashboard username. Admin login always fails when unset.
    pub admin_username: Option<String>,
    /// Admin dashboard password.
    pub admin_password: Option<String>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Accept a random per-process token secret in release builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Lifetime of issued tokens.
    pub token_ttl_hours: Option<u32>,
    /// Age after which a partner location is no longer shown.
    pub location_stale_after_minutes: Option<u32>,
}

impl AppSettings {
    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn token_secret_file(&self) -> Option<&Path> {
        self.token_secret_file.as_deref()
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::hours(i64::from(
            self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
        ))
    }

    pub fn location_stale_after(&self) -> Duration {
        Duration::minutes(i64::from(
            self.location_stale_after_minutes
                .unwrap_or(DEFAULT_LOCATION_STALE_AFTER_MINUTES),
        ))
    }
}
