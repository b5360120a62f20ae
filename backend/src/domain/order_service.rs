//! Checkout and order lifecycle services.
//!
//! [`OrderService`] prices carts against the live catalog, stores orders with
//! their item snapshot, and drives the delivery state machine for shoppers,
//! admins and partners.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::catalog_service::map_catalog_error;
use crate::domain::coupon_service::apply_coupon;
use crate::domain::delivery_service::map_partner_error;
use crate::domain::ports::{
    CatalogRepository, CheckoutRequest, CouponRepository, OrderCommand, OrderDispatch,
    OrderQuery, OrderRepository, OrderRepositoryError, PartnerOrders, PartnerRepository,
    PartnerScope, PlacedOrder, StatusUpdate,
};
use crate::domain::{
    AppliedCoupon, CartError, Error, LocationView, NewOrder, Order, OrderId, OrderTransition,
    OrderTransitionError, PartnerId, PriceBreakdown, PricingError, PricingInput, ProductId,
    ResolvedLine, UserId, price_order, resolve_cart,
};

const HISTORY_CHANGED: &str =
    "Your order history changed during checkout; review the total and try again";

fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
    }
}

fn map_cart_error(error: CartError) -> Error {
    Error::invalid_request(error.to_string())
}

fn map_pricing_error(error: PricingError) -> Error {
    Error::invalid_request(error.to_string())
}

fn map_transition_error(error: OrderTransitionError) -> Error {
    match error {
        OrderTransitionError::NotAssignedPartner => Error::forbidden(error.to_string()),
        other => Error::invalid_request(other.to_string()),
    }
}

fn order_not_found(id: OrderId) -> Error {
    Error::not_found(format!("order {id} not found"))
}

/// Cart priced for checkout.
struct PricedCheckout {
    lines: Vec<ResolvedLine>,
    breakdown: PriceBreakdown,
    coupon: Option<AppliedCoupon>,
    /// Order count the first-order discount was decided on.
    previous_orders: i64,
}

/// Order service implementing the checkout and lifecycle driving ports.
#[derive(Clone)]
pub struct OrderService<O, C, K, P> {
    orders: Arc<O>,
    catalog: Arc<C>,
    coupons: Arc<K>,
    partners: Arc<P>,
    clock: Arc<dyn Clock>,
    location_stale_after: Duration,
}

/// Repositories backing an [`OrderService`].
pub struct OrderServiceDeps<O, C, K, P> {
    pub orders: Arc<O>,
    pub catalog: Arc<C>,
    pub coupons: Arc<K>,
    pub partners: Arc<P>,
}

impl<O, C, K, P> OrderService<O, C, K, P> {
    pub fn new(
        deps: OrderServiceDeps<O, C, K, P>,
        clock: Arc<dyn Clock>,
        location_stale_after: Duration,
    ) -> Self {
        let OrderServiceDeps {
            orders,
            catalog,
            coupons,
            partners,
        } = deps;
        Self {
            orders,
            catalog,
            coupons,
            partners,
            clock,
            location_stale_after,
        }
    }
}

impl<O, C, K, P> OrderService<O, C, K, P>
where
    O: OrderRepository,
    C: CatalogRepository,
    K: CouponRepository,
    P: PartnerRepository,
{
    async fn price_checkout(&self, request: &CheckoutRequest) -> Result<PricedCheckout, Error> {
        let mut ids: Vec<ProductId> = request.lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable_by_key(|id| id.get());
        ids.dedup();
        let products = self
            .catalog
            .find_products(&ids)
            .await
            .map_err(map_catalog_error)?;
        let lines = resolve_cart(&request.lines, &products).map_err(map_cart_error)?;

        let previous_orders = self
            .orders
            .count_for_user(request.user_id)
            .await
            .map_err(map_order_error)?;

        let coupon = match request
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let coupon_lines: Vec<_> = lines.iter().map(ResolvedLine::coupon_line).collect();
                Some(
                    apply_coupon(self.coupons.as_ref(), code, &coupon_lines, self.clock.as_ref())
                        .await?,
                )
            }
            None => None,
        };

        let priced: Vec<_> = lines.iter().map(ResolvedLine::priced).collect();
        let breakdown = price_order(PricingInput {
            lines: &priced,
            shipping_address: request.shipping_address.as_ref().map(|a| a.value()),
            is_first_order: previous_orders == 0,
            coupon_discount: coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount),
        })
        .map_err(map_pricing_error)?;

        Ok(PricedCheckout {
            lines,
            breakdown,
            coupon,
            previous_orders,
        })
    }

    async fn load(&self, id: OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(id))
    }

    async fn load_owned(&self, user_id: UserId, id: OrderId) -> Result<Order, Error> {
        let order = self.load(id).await?;
        if order.user_id == user_id {
            Ok(order)
        } else {
            Err(order_not_found(id))
        }
    }

    async fn apply(
        &self,
        order: &Order,
        transition: OrderTransition,
        acting_partner: Option<PartnerId>,
    ) -> Result<Order, Error> {
        let next = order
            .check_transition(transition, acting_partner)
            .map_err(map_transition_error)?;
        let partner = match (transition, acting_partner) {
            (OrderTransition::Assign(partner_id), _) => PartnerScope::Assign(partner_id),
            (_, Some(partner_id)) => PartnerScope::HeldBy(partner_id),
            (_, None) => PartnerScope::Unchanged,
        };
        let updated = self
            .orders
            .transition(StatusUpdate {
                order_id: order.id,
                expected: transition.allowed_from(),
                next,
                partner,
            })
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "order {} changed while updating; reload and try again",
                    order.id
                ))
            })?;
        info!(order_id = %order.id, from = %order.status, to = %next, "order status changed");
        Ok(updated)
    }

    async fn tracking(&self, order: &Order) -> Result<LocationView, Error> {
        let partner_id = match order.partner_id {
            Some(partner_id) if order.is_trackable() => partner_id,
            _ => {
                return Err(Error::invalid_request(format!(
                    "order {} is not out with a delivery partner",
                    order.id
                )));
            }
        };
        let partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .map_err(map_partner_error)?;
        let location = partner.and_then(|p| p.current_location);
        Ok(LocationView::at(
            location.as_ref(),
            self.clock.utc(),
            self.location_stale_after,
        ))
    }
}

#[async_trait]
impl<O, C, K, P> OrderCommand for OrderService<O, C, K, P>
where
    O: OrderRepository,
    C: CatalogRepository,
    K: CouponRepository,
    P: PartnerRepository,
{
    async fn quote(&self, request: CheckoutRequest) -> Result<PriceBreakdown, Error> {
        Ok(self.price_checkout(&request).await?.breakdown)
    }

    async fn place(&self, request: CheckoutRequest) -> Result<PlacedOrder, Error> {
        let PricedCheckout {
            lines,
            breakdown,
            coupon,
            previous_orders,
        } = self.price_checkout(&request).await?;

        if let Some(client_total) = request.client_total {
            if client_total != breakdown.final_total {
                warn!(
                    user_id = %request.user_id,
                    %client_total,
                    server_total = %breakdown.final_total,
                    "client total differs from server pricing"
                );
            }
        }

        let user_id = request.user_id;
        let order = self
            .orders
            .insert(
                &NewOrder {
                    user_id,
                    items: lines.into_iter().map(|line| line.item).collect(),
                    total_amount: breakdown.final_total,
                    shipping_address: request.shipping_address,
                    delivery_type: request.delivery_type,
                    coupon_code: coupon.map(|applied| applied.coupon.code),
                },
                previous_orders,
            )
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| {
                warn!(%user_id, "order history changed while checking out");
                Error::conflict(HISTORY_CHANGED)
            })?;
        info!(order_id = %order.id, user_id = %order.user_id, total = %order.total_amount, "placed order");
        Ok(PlacedOrder { order, breakdown })
    }

    async fn confirm_receipt(&self, user_id: UserId, order_id: OrderId) -> Result<Order, Error> {
        let order = self.load_owned(user_id, order_id).await?;
        self.apply(&order, OrderTransition::ConfirmReceipt, None).await
    }
}

#[async_trait]
impl<O, C, K, P> OrderQuery for OrderService<O, C, K, P>
where
    O: OrderRepository,
    C: CatalogRepository,
    K: CouponRepository,
    P: PartnerRepository,
{
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(map_order_error)
    }

    async fn list_all(&self) -> Result<Vec<Order>, Error> {
        self.orders.list_all().await.map_err(map_order_error)
    }

    async fn tracking_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<LocationView, Error> {
        let order = self.load_owned(user_id, order_id).await?;
        self.tracking(&order).await
    }

    async fn tracking_for_admin(&self, order_id: OrderId) -> Result<LocationView, Error> {
        let order = self.load(order_id).await?;
        self.tracking(&order).await
    }
}

#[async_trait]
impl<O, C, K, P> OrderDispatch for OrderService<O, C, K, P>
where
    O: OrderRepository,
    C: CatalogRepository,
    K: CouponRepository,
    P: PartnerRepository,
{
    async fn assign(&self, order_id: OrderId, partner_id: PartnerId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        let partner = self
            .partners
            .find_by_id(partner_id)
            .await
            .map_err(map_partner_error)?
            .ok_or_else(|| {
                Error::invalid_request(format!("delivery partner {partner_id} does not exist"))
            })?;
        if !partner.is_available {
            return Err(Error::invalid_request(format!(
                "delivery partner {partner_id} is not available"
            )));
        }
        self.apply(&order, OrderTransition::Assign(partner_id), None)
            .await
    }

    async fn cancel(&self, order_id: OrderId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        self.apply(&order, OrderTransition::Cancel, None).await
    }

    async fn complete(&self, order_id: OrderId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        self.apply(&order, OrderTransition::Complete, None).await
    }
}

#[async_trait]
impl<O, C, K, P> PartnerOrders for OrderService<O, C, K, P>
where
    O: OrderRepository,
    C: CatalogRepository,
    K: CouponRepository,
    P: PartnerRepository,
{
    async fn list_assigned(&self, partner_id: PartnerId) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_partner(partner_id)
            .await
            .map_err(map_order_error)
    }

    async fn accept(&self, partner_id: PartnerId, order_id: OrderId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        self.apply(&order, OrderTransition::Accept, Some(partner_id))
            .await
    }

    async fn deliver(&self, partner_id: PartnerId, order_id: OrderId) -> Result<Order, Error> {
        let order = self.load(order_id).await?;
        self.apply(&order, OrderTransition::Deliver, Some(partner_id))
            .await
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
