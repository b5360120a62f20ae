//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Saved addresses live in a JSONB array on the user row. Appending one locks
//! the row for the read-modify-write so concurrent appends are not lost.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    NewUser, PasswordHash, PersonName, Phone, SavedAddress, User, UserCredentials, UserDraft,
    UserId, UserValidationError,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_unique_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_unique_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
        |_| UserPersistenceError::conflict("phone number already registered"),
    )
}

fn decode_addresses(value: serde_json::Value) -> Result<Vec<SavedAddress>, UserPersistenceError> {
    serde_json::from_value(value)
        .map_err(|err| UserPersistenceError::query(format!("decode addresses: {err}")))
}

/// Convert a row into a domain user, returning the stored hash alongside.
fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserPersistenceError> {
    let UserRow {
        id,
        name,
        phone,
        password_hash,
        is_admin,
        addresses,
        created_at,
    } = row;
    let invalid = |err: UserValidationError| UserPersistenceError::query(err.to_string());

    let user = User::new(UserDraft {
        id: UserId::new(id),
        name: PersonName::new(name).map_err(invalid)?,
        phone: Phone::new(phone).map_err(invalid)?,
        is_admin,
        addresses: decode_addresses(addresses)?,
        created_at,
    });
    Ok(UserCredentials {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_credentials(row).map(|credentials| credentials.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            name: user.name.as_ref(),
            phone: user.phone.as_ref(),
            password_hash: user.password_hash.as_str(),
        };

        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::phone.eq(phone.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_credentials).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn append_address(
        &self,
        id: UserId,
        address: &SavedAddress,
    ) -> Result<Option<Vec<SavedAddress>>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let address = address.clone();

        let stored: Option<serde_json::Value> = conn
            .transaction(|conn| {
                async move {
                    let current: Option<serde_json::Value> = users::table
                        .filter(users::id.eq(id.get()))
                        .select(users::addresses)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(current) = current else {
                        return Ok(None);
                    };

                    let mut addresses = match current {
                        serde_json::Value::Array(items) => items,
                        _ => Vec::new(),
                    };
                    addresses.push(serde_json::json!({
                        "label": address.label(),
                        "value": address.value(),
                    }));
                    let updated = serde_json::Value::Array(addresses);

                    diesel::update(users::table.filter(users::id.eq(id.get())))
                        .set(users::addresses.eq(&updated))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(updated))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        stored.map(decode_addresses).transpose()
    }
}
