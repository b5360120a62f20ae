//! Shopper account and admin login services.
//!
//! These services implement the account driving ports on top of the user
//! repository, the password hasher and the token codec.

use std::sync::Arc;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AdminLogin, IssuedToken, LoginResponse, PasswordHashError, PasswordHasher,
    RegisterRequest, TokenCodec, TokenError, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    AdminCredentials, Error, LoginCredentials, NewUser, Principal, SavedAddress, User, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid phone number or password";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Conflict { .. } => {
            Error::conflict("An account with this phone number already exists")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Invalid { .. } => Error::unauthorized("Invalid or expired token"),
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
    }
}

/// Account service implementing [`AccountCommand`] and [`UsersQuery`].
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
}

impl<U> AccountService<U> {
    /// Create a new service over the user repository.
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenCodec>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    async fn existing_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<User, Error> {
        let password_hash = self.hasher.hash(&request.password).map_err(map_hash_error)?;
        let user = self
            .users
            .create(&NewUser {
                name: request.name,
                phone: request.phone,
                password_hash,
            })
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, Error> {
        let Some(record) = self
            .users
            .find_credentials_by_phone(credentials.phone())
            .await
            .map_err(map_repository_error)?
        else {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &record.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(Principal::User(record.user.id()))
            .map_err(map_token_error)?;
        Ok(LoginResponse {
            token,
            user: record.user,
        })
    }

    async fn list_addresses(&self, user_id: UserId) -> Result<Vec<SavedAddress>, Error> {
        let user = self.existing_user(user_id).await?;
        Ok(user.addresses().to_vec())
    }

    async fn add_address(
        &self,
        user_id: UserId,
        address: SavedAddress,
    ) -> Result<Vec<SavedAddress>, Error> {
        self.users
            .append_address(user_id, &address)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl<U> UsersQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list_all().await.map_err(map_repository_error)
    }
}

/// Admin login backed by configured credentials.
///
/// When either value is unset every login attempt fails.
#[derive(Clone)]
pub struct AdminLoginService {
    username: Option<String>,
    password: Option<Zeroizing<String>>,
    tokens: Arc<dyn TokenCodec>,
}

impl AdminLoginService {
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            username,
            password: password.map(Zeroizing::new),
            tokens,
        }
    }
}

#[async_trait]
impl AdminLogin for AdminLoginService {
    async fn login(&self, credentials: AdminCredentials) -> Result<IssuedToken, Error> {
        let (Some(username), Some(password)) = (self.username.as_deref(), self.password.as_deref())
        else {
            warn!("admin login attempted but no admin credentials are configured");
            return Err(Error::invalid_request("Invalid admin credentials"));
        };
        let matches = credentials.username().as_bytes().ct_eq(username.as_bytes())
            & credentials
                .password()
                .expose()
                .as_bytes()
                .ct_eq(password.as_bytes());
        if !bool::from(matches) {
            return Err(Error::invalid_request("Invalid admin credentials"));
        }
        self.tokens
            .issue(Principal::Admin)
            .map_err(map_token_error)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
