//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::Duration;
use sresta_backend::outbound::persistence::DbPool;
use sresta_backend::outbound::security::TokenSecret;
use sresta_backend::settings::AppSettings;

/// Configured admin login, if any.
#[derive(Clone, Default)]
pub(crate) struct AdminAccount {
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) token_secret: TokenSecret,
    pub(crate) token_ttl: Duration,
    pub(crate) location_stale_after: Duration,
    pub(crate) admin: AdminAccount,
}

impl ServerConfig {
    /// Construct a configuration with default token and tracking windows.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, token_secret: TokenSecret) -> Self {
        let defaults = AppSettings::default();
        Self {
            bind_addr,
            db_pool,
            token_secret,
            token_ttl: defaults.token_ttl(),
            location_stale_after: defaults.location_stale_after(),
            admin: AdminAccount::default(),
        }
    }

    /// Apply the tunables from loaded [`AppSettings`].
    #[must_use]
    pub fn with_settings(mut self, settings: &AppSettings) -> Self {
        self.token_ttl = settings.token_ttl();
        self.location_stale_after = settings.location_stale_after();
        self.admin = AdminAccount {
            username: settings.admin_username.clone(),
            password: settings.admin_password.clone(),
        };
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by server bootstrap tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
