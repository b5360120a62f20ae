//! Coupon domain service.
//!
//! Dates are taken from the store's local clock so a coupon expiring "on the
//! 31st" stays valid until local midnight.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::catalog_service::map_catalog_error;
use crate::domain::ports::{
    CatalogRepository, CouponCartItem, CouponCommand, CouponQuery, CouponRepository,
    CouponRepositoryError,
};
use crate::domain::{
    AppliedCoupon, Coupon, CouponCartLine, CouponCode, CouponDraft, CouponRejection, Error,
    ProductId, validate_coupon,
};

pub(crate) fn map_coupon_error(error: CouponRepositoryError) -> Error {
    match error {
        CouponRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("coupon repository unavailable: {message}"))
        }
        CouponRepositoryError::Query { message } => {
            Error::internal(format!("coupon repository error: {message}"))
        }
        CouponRepositoryError::Conflict { .. } => {
            Error::conflict("A coupon with this code already exists")
        }
    }
}

/// Convert a rejection into the error shoppers see.
pub(crate) fn rejection_error(rejection: &CouponRejection) -> Error {
    let reason = match rejection {
        CouponRejection::NotFound => "not_found",
        CouponRejection::Expired { .. } => "expired",
        CouponRejection::MinPurchaseNotMet { .. } => "min_purchase_not_met",
        CouponRejection::CategoryMismatch { .. } => "category_mismatch",
        CouponRejection::CartOutOfRange => "invalid_cart",
    };
    Error::invalid_request(rejection.to_string()).with_details(json!({ "reason": reason }))
}

/// Look up and validate a coupon for already-categorised cart lines.
pub(crate) async fn apply_coupon<C>(
    coupons: &C,
    raw_code: &str,
    lines: &[CouponCartLine],
    clock: &dyn Clock,
) -> Result<AppliedCoupon, Error>
where
    C: CouponRepository + ?Sized,
{
    let Ok(code) = CouponCode::new(raw_code) else {
        return Err(rejection_error(&CouponRejection::NotFound));
    };
    let coupon = coupons
        .find_by_code(&code)
        .await
        .map_err(map_coupon_error)?
        .ok_or_else(|| rejection_error(&CouponRejection::NotFound))?;
    validate_coupon(&coupon, lines, clock.local().date_naive()).map_err(|r| rejection_error(&r))
}

/// Coupon service implementing [`CouponQuery`] and [`CouponCommand`].
#[derive(Clone)]
pub struct CouponService<C, P> {
    coupons: Arc<C>,
    catalog: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<C, P> CouponService<C, P> {
    pub fn new(coupons: Arc<C>, catalog: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            coupons,
            catalog,
            clock,
        }
    }
}

#[async_trait]
impl<C, P> CouponQuery for CouponService<C, P>
where
    C: CouponRepository,
    P: CatalogRepository,
{
    async fn list_public(&self) -> Result<Vec<Coupon>, Error> {
        self.coupons
            .list_active(self.clock.local().date_naive())
            .await
            .map_err(map_coupon_error)
    }

    async fn apply(
        &self,
        code: String,
        items: Vec<CouponCartItem>,
    ) -> Result<AppliedCoupon, Error> {
        let mut ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        ids.sort_unstable_by_key(|id| id.get());
        ids.dedup();
        let categories: HashMap<ProductId, String> = self
            .catalog
            .find_products(&ids)
            .await
            .map_err(map_catalog_error)?
            .into_iter()
            .map(|product| (product.id, product.category))
            .collect();

        let lines: Vec<CouponCartLine> = items
            .into_iter()
            .map(|item| CouponCartLine {
                price: item.price,
                quantity: item.quantity,
                category: categories.get(&item.product_id).cloned(),
            })
            .collect();

        apply_coupon(self.coupons.as_ref(), &code, &lines, self.clock.as_ref()).await
    }
}

#[async_trait]
impl<C, P> CouponCommand for CouponService<C, P>
where
    C: CouponRepository,
    P: CatalogRepository,
{
    async fn list_all(&self) -> Result<Vec<Coupon>, Error> {
        self.coupons.list_all().await.map_err(map_coupon_error)
    }

    async fn create(&self, coupon: CouponDraft) -> Result<Coupon, Error> {
        let created = self.coupons.create(&coupon).await.map_err(map_coupon_error)?;
        info!(code = %created.code, "created coupon");
        Ok(created)
    }

    async fn delete(&self, code: CouponCode) -> Result<(), Error> {
        if self
            .coupons
            .delete_by_code(&code)
            .await
            .map_err(map_coupon_error)?
        {
            info!(code = %code, "deleted coupon");
            Ok(())
        } else {
            Err(Error::not_found(format!("coupon {code} not found")))
        }
    }
}
