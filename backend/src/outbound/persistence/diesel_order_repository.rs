//! PostgreSQL-backed `OrderRepository` implementation.
//!
//! Item snapshots and the shipping address are JSONB written once at insert.
//! Inserts lock the shopper's row and recount their orders first, so the
//! first-order discount is granted at most once. Status changes are a single `UPDATE ... WHERE status IN (...) RETURNING`,
//! so two racing transitions cannot both apply.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{OrderRepository, OrderRepositoryError, PartnerScope, StatusUpdate};
use crate::domain::{
    CouponCode, DeliveryType, NewOrder, Order, OrderId, OrderItem, OrderStatus, PartnerId,
    SavedAddress, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{orders, users};

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn corrupt(field: &str, detail: impl std::fmt::Display) -> OrderRepositoryError {
    OrderRepositoryError::query(format!("stored {field} is invalid: {detail}"))
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let OrderRow {
        id,
        user_id,
        items,
        total_amount,
        shipping_address,
        status,
        delivery_type,
        partner_id,
        coupon_code,
        created_at,
    } = row;

    let items: Vec<OrderItem> =
        serde_json::from_value(items).map_err(|err| corrupt("items", err))?;
    let shipping_address: Option<SavedAddress> = shipping_address
        .map(serde_json::from_value)
        .transpose()
        .map_err(|err| corrupt("shipping_address", err))?;
    let status = OrderStatus::parse(&status).ok_or_else(|| corrupt("status", &status))?;
    let delivery_type = DeliveryType::parse(&delivery_type)
        .ok_or_else(|| corrupt("delivery_type", &delivery_type))?;
    let coupon_code = coupon_code
        .map(CouponCode::new)
        .transpose()
        .map_err(|err| corrupt("coupon_code", err))?;

    Ok(Order {
        id: OrderId::new(id),
        user_id: UserId::new(user_id),
        items,
        total_amount,
        shipping_address,
        status,
        delivery_type,
        partner_id: partner_id.map(PartnerId::new),
        coupon_code,
        created_at,
    })
}

fn rows_to_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, OrderRepositoryError> {
    rows.into_iter().map(row_to_order).collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert(
        &self,
        order: &NewOrder,
        prior_orders: i64,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let items = serde_json::to_value(&order.items)
            .map_err(|err| OrderRepositoryError::query(format!("serialise items: {err}")))?;
        let shipping_address = order
            .shipping_address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| OrderRepositoryError::query(format!("serialise address: {err}")))?;
        let row = NewOrderRow {
            user_id: order.user_id.get(),
            items: &items,
            total_amount: order.total_amount,
            shipping_address: shipping_address.as_ref(),
            status: OrderStatus::Processing.as_str(),
            delivery_type: order.delivery_type.as_str(),
            coupon_code: order.coupon_code.as_ref().map(|code| code.as_ref()),
        };

        let user_id = order.user_id.get();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: Option<OrderRow> = conn
            .transaction(|conn| {
                async move {
                    let owner: Option<i64> = users::table
                        .filter(users::id.eq(user_id))
                        .select(users::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if owner.is_none() {
                        return Ok(None);
                    }

                    let placed: i64 = orders::table
                        .filter(orders::user_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if placed != prior_orders {
                        return Ok(None);
                    }

                    diesel::insert_into(orders::table)
                        .values(&row)
                        .returning(OrderRow::as_returning())
                        .get_result::<OrderRow>(conn)
                        .await
                        .map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        inserted.map(row_to_order).transpose()
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<i64, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        orders::table
            .filter(orders::user_id.eq(user_id.get()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id.get()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_orders(rows)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = orders::table
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_orders(rows)
    }

    async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::partner_id.eq(partner_id.get()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_orders(rows)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = orders::table
            .find(id.get())
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_order).transpose()
    }

    async fn transition(
        &self,
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let expected: Vec<&'static str> = update
            .expected
            .iter()
            .map(|status| status.as_str())
            .collect();
        let guarded = orders::table
            .filter(orders::id.eq(update.order_id.get()))
            .filter(orders::status.eq_any(expected));
        let next = update.next.as_str();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderRow> = match update.partner {
            PartnerScope::Assign(partner_id) => {
                diesel::update(guarded)
                    .set((
                        orders::status.eq(next),
                        orders::partner_id.eq(Some(partner_id.get())),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result::<OrderRow>(&mut conn)
                    .await
            }
            PartnerScope::HeldBy(partner_id) => {
                diesel::update(guarded.filter(orders::partner_id.eq(partner_id.get())))
                    .set(orders::status.eq(next))
                    .returning(OrderRow::as_returning())
                    .get_result::<OrderRow>(&mut conn)
                    .await
            }
            PartnerScope::Unchanged => {
                diesel::update(guarded)
                    .set(orders::status.eq(next))
                    .returning(OrderRow::as_returning())
                    .get_result::<OrderRow>(&mut conn)
                    .await
            }
        }
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_order).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(status: &str, items: serde_json::Value) -> OrderRow {
        OrderRow {
            id: 21,
            user_id: 4,
            items,
            total_amount: dec!(1180.00),
            shipping_address: Some(json!({"label": "Home", "value": "Banjara Hills, Hyderabad"})),
            status: status.to_owned(),
            delivery_type: "partner".to_owned(),
            partner_id: Some(3),
            coupon_code: Some("SAVE10".to_owned()),
            created_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().expect("timestamp"),
        }
    }

    fn toor_dal() -> serde_json::Value {
        json!([{
            "productId": 1,
            "name": "Toor Dal",
            "variantLabel": "500g",
            "price": 300.0,
            "quantity": 4
        }])
    }

    #[rstest]
    fn rows_convert_with_snapshots() {
        let order = row_to_order(row("Out for Delivery", toor_dal())).expect("valid row");

        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].variant_label, "500g");
        assert_eq!(order.items[0].price, dec!(300));
        assert_eq!(order.partner_id, Some(PartnerId::new(3)));
        assert_eq!(
            order.shipping_address.as_ref().map(SavedAddress::label),
            Some("Home")
        );
    }

    #[rstest]
    #[case(row("Shipped", toor_dal()))]
    #[case(row("Processing", json!({"productId": 1})))]
    fn corrupt_rows_are_query_errors(#[case] row: OrderRow) {
        let error = row_to_order(row).expect_err("corrupt");
        assert!(matches!(error, OrderRepositoryError::Query { .. }));
    }
}
