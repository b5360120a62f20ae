//! Port abstraction for shopper persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, Phone, SavedAddress, User, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } => "user repository conflict: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new shopper. A taken phone number yields `Conflict`.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by phone for login.
    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// All users, oldest first.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Append an address and return the updated list, or `None` for an
    /// unknown user.
    async fn append_address(
        &self,
        id: UserId,
        address: &SavedAddress,
    ) -> Result<Option<Vec<SavedAddress>>, UserPersistenceError>;
}
