//! Coupon handlers: public listing, cart application and admin management.
//!
//! ```text
//! GET /api/coupons/public
//! POST /api/coupons/apply {"code":"save10","cartItems":[{"productId":1,"price":500,"quantity":2}]}
//! POST /api/admin/coupons {"code":"SAVE10","discountType":"percentage","discountValue":10,...}
//! DELETE /api/admin/coupons/{code}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CouponCartItem;
use crate::domain::{
    AppliedCoupon, Coupon, CouponCode, CouponDraft, DiscountType, MAX_LINE_QUANTITY, MONEY_MAX,
    ProductId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminSession;
use crate::inbound::http::schemas::{Acknowledgement, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, required, required_text};

const CODE: FieldName = FieldName::new("code");
const CART_ITEMS: FieldName = FieldName::new("cartItems");
const PRODUCT_ID: FieldName = FieldName::new("productId");
const PRICE: FieldName = FieldName::new("price");
const QUANTITY: FieldName = FieldName::new("quantity");
const DISCOUNT_TYPE: FieldName = FieldName::new("discountType");
const DISCOUNT_VALUE: FieldName = FieldName::new("discountValue");
const EXPIRY_DATE: FieldName = FieldName::new("expiryDate");

/// Cart line as the storefront sends it to coupon and checkout endpoints.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemBody {
    #[serde(alias = "product_id", alias = "id")]
    pub product_id: Option<i64>,
    #[serde(alias = "variant_id")]
    pub variant_id: Option<i64>,
    #[serde(alias = "variant_label", alias = "variant")]
    pub variant_label: Option<String>,
    /// Client-side price. Checkout ignores it and reprices from the catalog.
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

/// Body for `POST /api/coupons/apply`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponBody {
    pub code: Option<String>,
    #[serde(alias = "cart_items", alias = "items")]
    pub cart_items: Option<Vec<CartItemBody>>,
}

/// Body for `POST /api/admin/coupons`. Snake-case keys are accepted too.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponBody {
    pub code: Option<String>,
    #[serde(alias = "discount_type")]
    pub discount_type: Option<String>,
    #[serde(alias = "discount_value")]
    #[schema(value_type = Option<f64>)]
    pub discount_value: Option<Decimal>,
    #[serde(alias = "expiry_date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(alias = "min_purchase_amount")]
    #[schema(value_type = Option<f64>)]
    pub min_purchase_amount: Option<Decimal>,
    #[serde(alias = "applicable_category")]
    pub applicable_category: Option<String>,
    #[serde(alias = "poster_url")]
    pub poster_url: Option<String>,
    pub description: Option<String>,
}

fn cart_price(value: Option<Decimal>) -> ApiResult<Decimal> {
    let price = required(value, PRICE)?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(invalid_field_error(PRICE, "price must not be negative"));
    }
    if price > MONEY_MAX {
        return Err(invalid_field_error(
            PRICE,
            format!("price must be at most {MONEY_MAX}"),
        ));
    }
    Ok(price)
}

fn cart_quantity(value: Option<u32>) -> ApiResult<u32> {
    let quantity = required(value, QUANTITY)?;
    if quantity > MAX_LINE_QUANTITY {
        return Err(invalid_field_error(
            QUANTITY,
            format!("quantity must be at most {MAX_LINE_QUANTITY}"),
        ));
    }
    Ok(quantity)
}

fn coupon_items(items: Vec<CartItemBody>) -> ApiResult<Vec<CouponCartItem>> {
    items
        .into_iter()
        .map(|item| {
            Ok(CouponCartItem {
                product_id: ProductId::new(required(item.product_id, PRODUCT_ID)?),
                price: cart_price(item.price)?,
                quantity: cart_quantity(item.quantity)?,
            })
        })
        .collect()
}

fn coupon_draft(body: CouponBody) -> ApiResult<CouponDraft> {
    let code = required_text(body.code, CODE)?;
    let code = CouponCode::new(code).map_err(|err| invalid_field_error(CODE, err))?;
    let discount_type = required_text(body.discount_type, DISCOUNT_TYPE)?;
    let discount_type = DiscountType::parse(discount_type.trim().to_ascii_lowercase().as_str())
        .ok_or_else(|| {
            invalid_field_error(DISCOUNT_TYPE, "discount type must be percentage or fixed")
        })?;
    let draft = CouponDraft {
        code,
        discount_type,
        discount_value: required(body.discount_value, DISCOUNT_VALUE)?,
        expiry_date: required(body.expiry_date, EXPIRY_DATE)?,
        min_purchase_amount: body.min_purchase_amount.unwrap_or_default(),
        applicable_category: body.applicable_category,
        poster_url: body.poster_url,
        description: body.description,
    };
    draft
        .validated()
        .map_err(|err| invalid_field_error(DISCOUNT_VALUE, err))
}

/// Coupons that have not expired yet.
#[utoipa::path(
    get,
    path = "/api/coupons/public",
    responses((status = 200, description = "Unexpired coupons", body = [Coupon])),
    tags = ["coupons"],
    operation_id = "listPublicCoupons",
    security([])
)]
#[get("/coupons/public")]
pub async fn list_public_coupons(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Coupon>>> {
    Ok(web::Json(state.coupons.list_public().await?))
}

/// Check a coupon against a cart and return the discount it grants.
#[utoipa::path(
    post,
    path = "/api/coupons/apply",
    request_body = ApplyCouponBody,
    responses(
        (status = 200, description = "Coupon accepted", body = AppliedCoupon),
        (status = 400, description = "Unknown, expired or ineligible coupon", body = ErrorSchema)
    ),
    tags = ["coupons"],
    operation_id = "applyCoupon",
    security([])
)]
#[post("/coupons/apply")]
pub async fn apply_coupon(
    state: web::Data<HttpState>,
    payload: web::Json<ApplyCouponBody>,
) -> ApiResult<web::Json<AppliedCoupon>> {
    let body = payload.into_inner();
    let code = required_text(body.code, CODE)?;
    let items = coupon_items(required(body.cart_items, CART_ITEMS)?)?;
    let applied = state.coupons.apply(code, items).await?;
    Ok(web::Json(applied))
}

/// Every coupon, expired ones included.
#[utoipa::path(
    get,
    path = "/api/admin/coupons",
    responses(
        (status = 200, description = "All coupons", body = [Coupon]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListCoupons"
)]
#[get("/admin/coupons")]
pub async fn admin_list_coupons(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<Vec<Coupon>>> {
    Ok(web::Json(state.coupon_admin.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = CouponBody,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, description = "Invalid or duplicate coupon", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createCoupon"
)]
#[post("/admin/coupons")]
pub async fn create_coupon(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<CouponBody>,
) -> ApiResult<HttpResponse> {
    let draft = coupon_draft(payload.into_inner())?;
    let coupon = state.coupon_admin.create(draft).await?;
    Ok(HttpResponse::Created().json(coupon))
}

#[utoipa::path(
    delete,
    path = "/api/admin/coupons/{code}",
    params(("code" = String, Path, description = "Coupon code, any case")),
    responses(
        (status = 200, description = "Coupon deleted", body = Acknowledgement),
        (status = 404, description = "No such coupon", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteCoupon"
)]
#[delete("/admin/coupons/{code}")]
pub async fn delete_coupon(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Acknowledgement>> {
    let code = CouponCode::new(path.into_inner()).map_err(|err| invalid_field_error(CODE, err))?;
    state.coupon_admin.delete(code).await?;
    Ok(web::Json(Acknowledgement::new("Coupon deleted")))
}
