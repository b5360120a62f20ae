//! Port abstraction for coupon storage.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Coupon, CouponCode, CouponDraft};

use super::define_port_error;

define_port_error! {
    /// Errors raised by coupon repository adapters.
    pub enum CouponRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "coupon repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "coupon repository query failed: {message}",
        /// The coupon code is already taken.
        Conflict { message: String } => "coupon repository conflict: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Look a coupon up by its normalised code.
    async fn find_by_code(&self, code: &CouponCode)
    -> Result<Option<Coupon>, CouponRepositoryError>;

    /// Every coupon, soonest expiry first.
    async fn list_all(&self) -> Result<Vec<Coupon>, CouponRepositoryError>;

    /// Coupons whose expiry date is on or after `today`.
    async fn list_active(&self, today: NaiveDate) -> Result<Vec<Coupon>, CouponRepositoryError>;

    /// Insert a coupon. A duplicate code yields `Conflict`.
    async fn create(&self, coupon: &CouponDraft) -> Result<Coupon, CouponRepositoryError>;

    /// Remove a coupon. Returns whether a row was removed.
    async fn delete_by_code(&self, code: &CouponCode) -> Result<bool, CouponRepositoryError>;
}
