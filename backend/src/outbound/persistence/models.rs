//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain types happens in
//! the repository modules, where validation failures become query errors.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{coupons, delivery_partners, orders, product_variants, products, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub addresses: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
}

/// Insert and update shape for products.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductFields<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub label: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_variants)]
pub(crate) struct NewVariantRow<'a> {
    pub product_id: i64,
    pub label: &'a str,
    pub price: Decimal,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = product_variants)]
pub(crate) struct VariantUpdate<'a> {
    pub label: &'a str,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: i64,
    pub code: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub expiry_date: NaiveDate,
    pub min_purchase_amount: Decimal,
    pub applicable_category: Option<String>,
    pub poster_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupons)]
pub(crate) struct NewCouponRow<'a> {
    pub code: &'a str,
    pub discount_type: &'a str,
    pub discount_value: Decimal,
    pub expiry_date: NaiveDate,
    pub min_purchase_amount: Decimal,
    pub applicable_category: Option<&'a str>,
    pub poster_url: Option<&'a str>,
    pub description: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Delivery partners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = delivery_partners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PartnerRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub is_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = delivery_partners)]
pub(crate) struct NewPartnerRow<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = delivery_partners)]
pub(crate) struct PartnerLocationUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub items: serde_json::Value,
    pub total_amount: Decimal,
    pub shipping_address: Option<serde_json::Value>,
    pub status: String,
    pub delivery_type: String,
    pub partner_id: Option<i64>,
    pub coupon_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub user_id: i64,
    pub items: &'a serde_json::Value,
    pub total_amount: Decimal,
    pub shipping_address: Option<&'a serde_json::Value>,
    pub status: &'a str,
    pub delivery_type: &'a str,
    pub coupon_code: Option<&'a str>,
}
