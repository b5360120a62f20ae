//! PostgreSQL-backed `PartnerRepository` implementation.
//!
//! The last reported location is three nullable columns on the partner row;
//! all three are written together or not at all.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PartnerRepository, PartnerRepositoryError};
use crate::domain::{
    DeliveryPartner, GeoPoint, NewPartner, PartnerCredentials, PartnerId, PartnerLocation,
    PasswordHash, PersonName, Phone,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_unique_diesel_error};
use super::models::{NewPartnerRow, PartnerLocationUpdate, PartnerRow};
use super::pool::{DbPool, PoolError};
use super::schema::delivery_partners;

/// Diesel-backed implementation of the partner repository port.
#[derive(Clone)]
pub struct DieselPartnerRepository {
    pool: DbPool,
}

impl DieselPartnerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PartnerRepositoryError {
    map_basic_pool_error(error, PartnerRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PartnerRepositoryError {
    map_unique_diesel_error(
        error,
        PartnerRepositoryError::query,
        PartnerRepositoryError::connection,
        |_| PartnerRepositoryError::conflict("phone number already registered"),
    )
}

fn row_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<Option<PartnerLocation>, PartnerRepositoryError> {
    match (latitude, longitude, updated_at) {
        (Some(latitude), Some(longitude), Some(updated_at)) => {
            let point = GeoPoint::new(latitude, longitude)
                .map_err(|err| PartnerRepositoryError::query(err.to_string()))?;
            Ok(Some(PartnerLocation { point, updated_at }))
        }
        _ => Ok(None),
    }
}

fn row_to_credentials(row: PartnerRow) -> Result<PartnerCredentials, PartnerRepositoryError> {
    let PartnerRow {
        id,
        name,
        phone,
        password_hash,
        is_available,
        latitude,
        longitude,
        location_updated_at,
    } = row;

    let partner = DeliveryPartner {
        id: PartnerId::new(id),
        name: PersonName::new(name).map_err(|err| PartnerRepositoryError::query(err.to_string()))?,
        phone: Phone::new(phone).map_err(|err| PartnerRepositoryError::query(err.to_string()))?,
        is_available,
        current_location: row_location(latitude, longitude, location_updated_at)?,
    };
    Ok(PartnerCredentials {
        partner,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn row_to_partner(row: PartnerRow) -> Result<DeliveryPartner, PartnerRepositoryError> {
    row_to_credentials(row).map(|credentials| credentials.partner)
}

#[async_trait]
impl PartnerRepository for DieselPartnerRepository {
    async fn create(&self, partner: &NewPartner) -> Result<DeliveryPartner, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPartnerRow {
            name: partner.name.as_ref(),
            phone: partner.phone.as_ref(),
            password_hash: partner.password_hash.as_str(),
        };

        let inserted = diesel::insert_into(delivery_partners::table)
            .values(&row)
            .returning(PartnerRow::as_returning())
            .get_result::<PartnerRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_partner(inserted)
    }

    async fn list_all(&self) -> Result<Vec<DeliveryPartner>, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PartnerRow> = delivery_partners::table
            .order(delivery_partners::id.asc())
            .select(PartnerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_partner).collect()
    }

    async fn find_by_id(
        &self,
        id: PartnerId,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = delivery_partners::table
            .find(id.get())
            .select(PartnerRow::as_select())
            .first::<PartnerRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_partner).transpose()
    }

    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<PartnerCredentials>, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = delivery_partners::table
            .filter(delivery_partners::phone.eq(phone.as_ref()))
            .select(PartnerRow::as_select())
            .first::<PartnerRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_credentials).transpose()
    }

    async fn set_availability(
        &self,
        id: PartnerId,
        is_available: bool,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(delivery_partners::table.find(id.get()))
            .set(delivery_partners::is_available.eq(is_available))
            .returning(PartnerRow::as_returning())
            .get_result::<PartnerRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_partner).transpose()
    }

    async fn update_location(
        &self,
        id: PartnerId,
        location: &PartnerLocation,
    ) -> Result<bool, PartnerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = PartnerLocationUpdate {
            latitude: Some(location.point.latitude()),
            longitude: Some(location.point.longitude()),
            location_updated_at: Some(location.updated_at),
        };

        let updated = diesel::update(delivery_partners::table.find(id.get()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn row(latitude: Option<f64>, longitude: Option<f64>, reported: bool) -> PartnerRow {
        PartnerRow {
            id: 3,
            name: "Ravi Kumar".to_owned(),
            phone: "9123456780".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            is_available: true,
            latitude,
            longitude,
            location_updated_at: reported
                .then(|| Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().expect("timestamp")),
        }
    }

    #[rstest]
    fn complete_location_columns_become_a_location() {
        let partner = row_to_partner(row(Some(17.41), Some(78.44), true)).expect("valid row");
        let location = partner.current_location.expect("location");

        assert_eq!(location.point.latitude(), 17.41);
        assert_eq!(location.point.longitude(), 78.44);
    }

    #[rstest]
    #[case(row(None, None, false))]
    #[case(row(Some(17.41), None, true))]
    fn partial_location_columns_mean_no_location(#[case] row: PartnerRow) {
        let partner = row_to_partner(row).expect("valid row");
        assert!(partner.current_location.is_none());
    }

    #[rstest]
    fn out_of_range_coordinates_are_query_errors() {
        let error = row_to_partner(row(Some(123.0), Some(78.44), true)).expect_err("corrupt");
        assert!(matches!(error, PartnerRepositoryError::Query { .. }));
    }

    #[rstest]
    fn credentials_carry_the_stored_hash() {
        let credentials = row_to_credentials(row(None, None, false)).expect("valid row");
        assert_eq!(credentials.password_hash.as_str(), "$argon2id$stub");
        assert_eq!(credentials.partner.phone.as_ref(), "9123456780");
    }
}
