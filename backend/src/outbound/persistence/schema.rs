//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate this file with
//! `diesel print-schema` or update it by hand.

diesel::table! {
    /// Shopper accounts. `addresses` is a JSON array of `{label, value}`.
    users (id) {
        id -> Int8,
        name -> Varchar,
        phone -> Varchar,
        password_hash -> Text,
        is_admin -> Bool,
        addresses -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Int8,
        name -> Text,
        description -> Text,
        category -> Text,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Price tiers; rows cascade-delete with their product.
    product_variants (id) {
        id -> Int8,
        product_id -> Int8,
        label -> Text,
        price -> Numeric,
    }
}

diesel::table! {
    coupons (id) {
        id -> Int8,
        code -> Varchar,
        discount_type -> Varchar,
        discount_value -> Numeric,
        expiry_date -> Date,
        min_purchase_amount -> Numeric,
        applicable_category -> Nullable<Text>,
        poster_url -> Nullable<Text>,
        description -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    delivery_partners (id) {
        id -> Int8,
        name -> Varchar,
        phone -> Varchar,
        password_hash -> Text,
        is_available -> Bool,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        location_updated_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Placed orders. `items` and `shipping_address` are written once.
    orders (id) {
        id -> Int8,
        user_id -> Int8,
        items -> Jsonb,
        total_amount -> Numeric,
        shipping_address -> Nullable<Jsonb>,
        status -> Varchar,
        delivery_type -> Varchar,
        partner_id -> Nullable<Int8>,
        coupon_code -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(product_variants -> products (product_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(orders -> delivery_partners (partner_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    products,
    product_variants,
    coupons,
    delivery_partners,
    orders,
);
