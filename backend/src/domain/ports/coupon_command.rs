//! Driving ports for applying and managing coupons.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{AppliedCoupon, Coupon, CouponCode, CouponDraft, Error, ProductId};

/// Cart line sent when trying a coupon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCartItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: u32,
}

/// Shopper-facing coupon use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponQuery: Send + Sync {
    /// Coupons that have not expired yet.
    async fn list_public(&self) -> Result<Vec<Coupon>, Error>;

    /// Validate `code` against a cart. Rejections are `invalid_request`
    /// errors carrying the rejection reason in `details.reason`.
    async fn apply(&self, code: String, items: Vec<CouponCartItem>)
    -> Result<AppliedCoupon, Error>;
}

/// Admin coupon management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponCommand: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Coupon>, Error>;

    /// Create a coupon. A duplicate code is a `conflict`.
    async fn create(&self, coupon: CouponDraft) -> Result<Coupon, Error>;

    async fn delete(&self, code: CouponCode) -> Result<(), Error>;
}
