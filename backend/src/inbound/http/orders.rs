//! Order handlers for shoppers and the admin dashboard.
//!
//! ```text
//! POST /api/orders/quote {"cartItems":[{"productId":1,"variantId":4,"quantity":2}],"shippingAddress":{...}}
//! POST /api/orders {... same body ..., "couponCode":"SAVE10","totalAmount":342}
//! PUT /api/admin/orders/{id}/assign {"partnerId":3}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CheckoutRequest;
use crate::domain::{
    CartLine, DeliveryType, LocationView, Order, OrderId, PartnerId, PriceBreakdown, ProductId,
    SavedAddress, UserId, VariantId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::{AddressBody, saved_address};
use crate::inbound::http::auth::{AdminSession, UserSession};
use crate::inbound::http::coupons::CartItemBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, required,
};

const CART_ITEMS: FieldName = FieldName::new("cartItems");
const PRODUCT_ID: FieldName = FieldName::new("productId");
const VARIANT_LABEL: FieldName = FieldName::new("variantLabel");
const QUANTITY: FieldName = FieldName::new("quantity");
const SHIPPING_ADDRESS: FieldName = FieldName::new("shippingAddress");
const PARTNER_ID: FieldName = FieldName::new("partnerId");

/// Shipping address as a saved `{label, value}` pair or as free text.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ShippingAddressBody {
    Saved(AddressBody),
    Text(String),
}

/// Body for `POST /api/orders` and `POST /api/orders/quote`.
///
/// `userId` is accepted for compatibility and ignored; the token decides.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(alias = "cart_items", alias = "items")]
    pub cart_items: Option<Vec<CartItemBody>>,
    #[serde(alias = "shipping_address")]
    pub shipping_address: Option<ShippingAddressBody>,
    #[serde(alias = "coupon_code")]
    pub coupon_code: Option<String>,
    #[serde(alias = "delivery_type")]
    pub delivery_type: Option<DeliveryType>,
    /// Total the client displayed. Logged when it differs from the server total.
    #[serde(alias = "total_amount")]
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Decimal>,
    #[serde(alias = "user_id")]
    pub user_id: Option<i64>,
}

/// Body for `PUT /api/admin/orders/{id}/assign`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    #[serde(alias = "partner_id")]
    pub partner_id: Option<i64>,
}

/// Response for `POST /api/orders`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderBody {
    pub order_id: OrderId,
    pub order: Order,
    pub breakdown: PriceBreakdown,
}

fn cart_line(item: CartItemBody) -> ApiResult<CartLine> {
    let product_id = ProductId::new(required(item.product_id, PRODUCT_ID)?);
    let variant_id = item.variant_id.map(VariantId::new);
    let variant_label = match (item.variant_label, variant_id) {
        (Some(label), _) => label,
        (None, Some(_)) => String::new(),
        (None, None) => return Err(missing_field_error(VARIANT_LABEL)),
    };
    Ok(CartLine {
        product_id,
        variant_id,
        variant_label,
        quantity: required(item.quantity, QUANTITY)?,
    })
}

fn shipping_address(body: ShippingAddressBody) -> ApiResult<SavedAddress> {
    match body {
        ShippingAddressBody::Saved(address) => saved_address(address),
        ShippingAddressBody::Text(text) => SavedAddress::new("Delivery", text)
            .map_err(|err| invalid_field_error(SHIPPING_ADDRESS, err)),
    }
}

fn checkout_request(user_id: UserId, body: CheckoutBody) -> ApiResult<CheckoutRequest> {
    let lines = required(body.cart_items, CART_ITEMS)?
        .into_iter()
        .map(cart_line)
        .collect::<ApiResult<Vec<_>>>()?;
    let shipping_address = body.shipping_address.map(shipping_address).transpose()?;
    let coupon_code = body
        .coupon_code
        .map(|code| code.trim().to_owned())
        .filter(|code| !code.is_empty());
    Ok(CheckoutRequest {
        user_id,
        lines,
        shipping_address,
        coupon_code,
        delivery_type: body.delivery_type.unwrap_or_default(),
        client_total: body.total_amount,
    })
}

/// Price a cart without placing it.
#[utoipa::path(
    post,
    path = "/api/orders/quote",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "Price breakdown", body = PriceBreakdown),
        (status = 400, description = "Invalid cart or coupon", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "quoteOrder"
)]
#[post("/orders/quote")]
pub async fn quote_order(
    state: web::Data<HttpState>,
    session: UserSession,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<web::Json<PriceBreakdown>> {
    let request = checkout_request(session.0, payload.into_inner())?;
    Ok(web::Json(state.orders.quote(request).await?))
}

/// Place an order priced on the server.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutBody,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrderBody),
        (status = 400, description = "Invalid cart or coupon", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: UserSession,
    payload: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let request = checkout_request(session.0, payload.into_inner())?;
    let placed = state.orders.place(request).await?;
    Ok(HttpResponse::Created().json(PlacedOrderBody {
        order_id: placed.order.id,
        order: placed.order,
        breakdown: placed.breakdown,
    }))
}

/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order history", body = [Order]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: UserSession,
) -> ApiResult<web::Json<Vec<Order>>> {
    Ok(web::Json(state.order_query.list_for_user(session.0).await?))
}

/// Confirm receipt of an automated delivery.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/confirm",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order completed", body = Order),
        (status = 400, description = "Order cannot be confirmed", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "confirmOrder"
)]
#[put("/orders/{id}/confirm")]
pub async fn confirm_order(
    state: web::Data<HttpState>,
    session: UserSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Order>> {
    let order = state
        .orders
        .confirm_receipt(session.0, OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

/// Partner location for one of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/tracking",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Location view", body = LocationView),
        (status = 400, description = "Order is not trackable", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "trackOrder"
)]
#[get("/orders/{id}/tracking")]
pub async fn track_order(
    state: web::Data<HttpState>,
    session: UserSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<LocationView>> {
    let view = state
        .order_query
        .tracking_for_user(session.0, OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(view))
}

/// Every order, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    responses(
        (status = 200, description = "All orders", body = [Order]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListOrders"
)]
#[get("/admin/orders")]
pub async fn admin_list_orders(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<Vec<Order>>> {
    Ok(web::Json(state.order_query.list_all().await?))
}

/// Hand an order to an available delivery partner.
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/assign",
    params(("id" = i64, Path, description = "Order id")),
    request_body = AssignBody,
    responses(
        (status = 200, description = "Order assigned", body = Order),
        (status = 400, description = "Partner unavailable or order not assignable", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "assignOrder"
)]
#[put("/admin/orders/{id}/assign")]
pub async fn assign_order(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
    payload: web::Json<AssignBody>,
) -> ApiResult<web::Json<Order>> {
    let partner_id = PartnerId::new(required(payload.into_inner().partner_id, PARTNER_ID)?);
    let order = state
        .dispatch
        .assign(OrderId::new(path.into_inner()), partner_id)
        .await?;
    Ok(web::Json(order))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/cancel",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, description = "Order already closed", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "cancelOrder"
)]
#[put("/admin/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Order>> {
    let order = state.dispatch.cancel(OrderId::new(path.into_inner())).await?;
    Ok(web::Json(order))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/complete",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order completed", body = Order),
        (status = 400, description = "Order not delivered yet", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "completeOrder"
)]
#[put("/admin/orders/{id}/complete")]
pub async fn complete_order(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Order>> {
    let order = state
        .dispatch
        .complete(OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}/tracking",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Location view", body = LocationView),
        (status = 400, description = "Order is not trackable", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminTrackOrder"
)]
#[get("/admin/orders/{id}/tracking")]
pub async fn admin_track_order(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<LocationView>> {
    let view = state
        .order_query
        .tracking_for_admin(OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(view))
}
