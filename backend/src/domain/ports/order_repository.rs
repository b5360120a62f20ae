//! Port abstraction for order storage.
//!
//! Orders are never deleted. Status changes go through
//! [`OrderRepository::transition`], a single conditional update.

use async_trait::async_trait;

use crate::domain::{NewOrder, Order, OrderId, OrderStatus, PartnerId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "order repository query failed: {message}",
    }
}

/// How a status change treats the order's delivery partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerScope {
    /// Leave the partner column alone.
    Unchanged,
    /// Record this partner as the assignee.
    Assign(PartnerId),
    /// Apply only while this partner is still the assignee.
    HeldBy(PartnerId),
}

/// Conditional status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub order_id: OrderId,
    /// The update only applies while the order is in one of these.
    pub expected: &'static [OrderStatus],
    pub next: OrderStatus,
    pub partner: PartnerScope,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order with status `Processing`.
    ///
    /// The insert only happens while the user still has exactly
    /// `prior_orders` orders; otherwise nothing is written and `None` is
    /// returned. Concurrent checkouts for one user are serialised.
    async fn insert(
        &self,
        order: &NewOrder,
        prior_orders: i64,
    ) -> Result<Option<Order>, OrderRepositoryError>;

    /// Number of orders the user has placed, of any status.
    async fn count_for_user(&self, user_id: UserId) -> Result<i64, OrderRepositoryError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Orders currently assigned to a partner, newest first.
    async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<Order>, OrderRepositoryError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Apply a status change if the order is still in an expected status.
    ///
    /// Returns the updated order, or `None` when the guard did not match.
    async fn transition(&self, update: StatusUpdate)
    -> Result<Option<Order>, OrderRepositoryError>;
}
