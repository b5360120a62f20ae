//! Driving ports for checkout, order history and the delivery lifecycle.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    CartLine, DeliveryType, Error, LocationView, Order, OrderId, PartnerId, PriceBreakdown,
    SavedAddress, UserId,
};

/// Checkout submitted by a shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub shipping_address: Option<SavedAddress>,
    pub coupon_code: Option<String>,
    pub delivery_type: DeliveryType,
    /// Total the client displayed; logged when it disagrees, never trusted.
    pub client_total: Option<Decimal>,
}

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub breakdown: PriceBreakdown,
}

/// Shopper checkout use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Price a cart without placing it.
    async fn quote(&self, request: CheckoutRequest) -> Result<PriceBreakdown, Error>;

    /// Price and store an order with status `Processing`.
    async fn place(&self, request: CheckoutRequest) -> Result<PlacedOrder, Error>;

    /// Shopper confirms an automated delivery arrived.
    async fn confirm_receipt(&self, user_id: UserId, order_id: OrderId) -> Result<Order, Error>;
}

/// Order reads for shoppers and admins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// A shopper's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, Error>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, Error>;

    /// Partner location for a shopper's own order.
    async fn tracking_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<LocationView, Error>;

    /// Partner location for any order.
    async fn tracking_for_admin(&self, order_id: OrderId) -> Result<LocationView, Error>;
}

/// Admin lifecycle actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderDispatch: Send + Sync {
    /// Hand an order to an available partner.
    async fn assign(&self, order_id: OrderId, partner_id: PartnerId) -> Result<Order, Error>;

    async fn cancel(&self, order_id: OrderId) -> Result<Order, Error>;

    async fn complete(&self, order_id: OrderId) -> Result<Order, Error>;
}

/// Partner-side lifecycle actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartnerOrders: Send + Sync {
    /// Orders assigned to the partner, newest first.
    async fn list_assigned(&self, partner_id: PartnerId) -> Result<Vec<Order>, Error>;

    async fn accept(&self, partner_id: PartnerId, order_id: OrderId) -> Result<Order, Error>;

    async fn deliver(&self, partner_id: PartnerId, order_id: OrderId) -> Result<Order, Error>;
}
