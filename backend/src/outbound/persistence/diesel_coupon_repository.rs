//! PostgreSQL-backed `CouponRepository` implementation.
//!
//! Codes are stored upper-cased; the unique index on `code` turns a duplicate
//! insert into a conflict.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CouponRepository, CouponRepositoryError};
use crate::domain::{Coupon, CouponCode, CouponDraft, CouponId, DiscountType};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_unique_diesel_error};
use super::models::{CouponRow, NewCouponRow};
use super::pool::{DbPool, PoolError};
use super::schema::coupons;

/// Diesel-backed implementation of the coupon repository port.
#[derive(Clone)]
pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CouponRepositoryError {
    map_basic_pool_error(error, CouponRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CouponRepositoryError {
    map_unique_diesel_error(
        error,
        CouponRepositoryError::query,
        CouponRepositoryError::connection,
        |_| CouponRepositoryError::conflict("coupon code already exists"),
    )
}

fn row_to_coupon(row: CouponRow) -> Result<Coupon, CouponRepositoryError> {
    let code = CouponCode::new(&row.code)
        .map_err(|err| CouponRepositoryError::query(format!("stored code {}: {err}", row.code)))?;
    let discount_type = DiscountType::parse(&row.discount_type).ok_or_else(|| {
        CouponRepositoryError::query(format!("unknown discount type {}", row.discount_type))
    })?;

    Ok(Coupon {
        id: CouponId::new(row.id),
        code,
        discount_type,
        discount_value: row.discount_value,
        expiry_date: row.expiry_date,
        min_purchase_amount: row.min_purchase_amount,
        applicable_category: row.applicable_category,
        poster_url: row.poster_url,
        description: row.description,
    })
}

#[async_trait]
impl CouponRepository for DieselCouponRepository {
    async fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = coupons::table
            .filter(coupons::code.eq(code.as_ref()))
            .select(CouponRow::as_select())
            .first::<CouponRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_coupon).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CouponRow> = coupons::table
            .order((coupons::expiry_date.asc(), coupons::id.asc()))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_coupon).collect()
    }

    async fn list_active(&self, today: NaiveDate) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CouponRow> = coupons::table
            .filter(coupons::expiry_date.ge(today))
            .order((coupons::expiry_date.asc(), coupons::id.asc()))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_coupon).collect()
    }

    async fn create(&self, coupon: &CouponDraft) -> Result<Coupon, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCouponRow {
            code: coupon.code.as_ref(),
            discount_type: coupon.discount_type.as_str(),
            discount_value: coupon.discount_value,
            expiry_date: coupon.expiry_date,
            min_purchase_amount: coupon.min_purchase_amount,
            applicable_category: coupon.applicable_category.as_deref(),
            poster_url: coupon.poster_url.as_deref(),
            description: coupon.description.as_deref(),
        };

        let inserted = diesel::insert_into(coupons::table)
            .values(&row)
            .returning(CouponRow::as_returning())
            .get_result::<CouponRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_coupon(inserted)
    }

    async fn delete_by_code(&self, code: &CouponCode) -> Result<bool, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(coupons::table.filter(coupons::code.eq(code.as_ref())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
