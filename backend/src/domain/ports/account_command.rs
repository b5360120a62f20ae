//! Driving ports for shopper accounts, admin login and the admin user list.
//!
//! Inbound adapters call these ports without knowing the backing store, so
//! handler tests can substitute mocks instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{
    AdminCredentials, Error, LoginCredentials, Password, PersonName, Phone, SavedAddress, User,
    UserId,
};

use super::IssuedToken;

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: PersonName,
    pub phone: Phone,
    pub password: Password,
}

/// Successful shopper login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: IssuedToken,
    pub user: User,
}

/// Shopper account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. A taken phone number is a `conflict`.
    async fn register(&self, request: RegisterRequest) -> Result<User, Error>;

    /// Check credentials and issue a user token.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, Error>;

    /// Saved addresses of a user.
    async fn list_addresses(&self, user_id: UserId) -> Result<Vec<SavedAddress>, Error>;

    /// Append an address and return the full list.
    async fn add_address(
        &self,
        user_id: UserId,
        address: SavedAddress,
    ) -> Result<Vec<SavedAddress>, Error>;
}

/// Admin view of registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}

/// Operator login checked against configured credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminLogin: Send + Sync {
    async fn login(&self, credentials: AdminCredentials) -> Result<IssuedToken, Error>;
}
