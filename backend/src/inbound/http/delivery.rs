//! Delivery partner portal and admin partner management.
//!
//! ```text
//! POST /api/delivery/login {"phone":"9000000001","password":"secret"}
//! PUT /api/delivery/location {"latitude":17.385,"longitude":78.4867}
//! PUT /api/delivery/orders/{id}/accept
//! PUT /api/admin/partners/{id}/availability {"isAvailable":false}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RegisterPartnerRequest;
use crate::domain::{
    DeliveryPartner, GeoPoint, GeoPointValidationError, Order, OrderId, PartnerId, PartnerLocation,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::{
    PhoneLoginBody, RegisterBody, account_fields, login_credentials,
};
use crate::inbound::http::auth::{AdminSession, PartnerSession};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, required};

const LATITUDE: FieldName = FieldName::new("latitude");
const LONGITUDE: FieldName = FieldName::new("longitude");
const IS_AVAILABLE: FieldName = FieldName::new("isAvailable");

/// Body for `PUT /api/delivery/location`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody {
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(alias = "lng")]
    pub longitude: Option<f64>,
}

/// Body for `PUT /api/admin/partners/{id}/availability`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBody {
    #[serde(alias = "is_available")]
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLogin {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub partner: DeliveryPartner,
}

fn geo_point(body: LocationBody) -> ApiResult<GeoPoint> {
    let latitude = required(body.latitude, LATITUDE)?;
    let longitude = required(body.longitude, LONGITUDE)?;
    GeoPoint::new(latitude, longitude).map_err(|err| match err {
        GeoPointValidationError::Latitude(_) => invalid_field_error(LATITUDE, err),
        GeoPointValidationError::Longitude(_) => invalid_field_error(LONGITUDE, err),
    })
}

/// Exchange partner credentials for a partner token.
#[utoipa::path(
    post,
    path = "/api/delivery/login",
    request_body = PhoneLoginBody,
    responses(
        (status = 200, description = "Login success", body = PartnerLogin),
        (status = 400, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["delivery"],
    operation_id = "partnerLogin",
    security([])
)]
#[post("/delivery/login")]
pub async fn partner_login(
    state: web::Data<HttpState>,
    payload: web::Json<PhoneLoginBody>,
) -> ApiResult<web::Json<PartnerLogin>> {
    let credentials = login_credentials(payload.into_inner())?;
    let response = state.partners.login(credentials).await?;
    Ok(web::Json(PartnerLogin {
        token: response.token.token,
        expires_at: response.token.expires_at,
        partner: response.partner,
    }))
}

/// Record the calling partner's current position.
#[utoipa::path(
    put,
    path = "/api/delivery/location",
    request_body = LocationBody,
    responses(
        (status = 200, description = "Stored location", body = PartnerLocation),
        (status = 400, description = "Coordinates out of range", body = ErrorSchema),
        (status = 401, description = "Missing or invalid partner token", body = ErrorSchema)
    ),
    tags = ["delivery"],
    operation_id = "reportLocation"
)]
#[put("/delivery/location")]
pub async fn report_location(
    state: web::Data<HttpState>,
    session: PartnerSession,
    payload: web::Json<LocationBody>,
) -> ApiResult<web::Json<PartnerLocation>> {
    let point = geo_point(payload.into_inner())?;
    let location = state.partners.report_location(session.0, point).await?;
    Ok(web::Json(location))
}

/// Orders assigned to the calling partner.
#[utoipa::path(
    get,
    path = "/api/delivery/orders",
    responses(
        (status = 200, description = "Assigned orders", body = [Order]),
        (status = 401, description = "Missing or invalid partner token", body = ErrorSchema)
    ),
    tags = ["delivery"],
    operation_id = "listAssignedOrders"
)]
#[get("/delivery/orders")]
pub async fn list_assigned_orders(
    state: web::Data<HttpState>,
    session: PartnerSession,
) -> ApiResult<web::Json<Vec<Order>>> {
    Ok(web::Json(state.partner_orders.list_assigned(session.0).await?))
}

/// Pick up an assigned order.
#[utoipa::path(
    put,
    path = "/api/delivery/orders/{id}/accept",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order out for delivery", body = Order),
        (status = 400, description = "Order is not awaiting pickup", body = ErrorSchema),
        (status = 403, description = "Order assigned to another partner", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["delivery"],
    operation_id = "acceptOrder"
)]
#[put("/delivery/orders/{id}/accept")]
pub async fn accept_order(
    state: web::Data<HttpState>,
    session: PartnerSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Order>> {
    let order = state
        .partner_orders
        .accept(session.0, OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

/// Mark an order handed over to the shopper.
#[utoipa::path(
    put,
    path = "/api/delivery/orders/{id}/deliver",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order delivered", body = Order),
        (status = 400, description = "Order is not out for delivery", body = ErrorSchema),
        (status = 403, description = "Order assigned to another partner", body = ErrorSchema),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["delivery"],
    operation_id = "deliverOrder"
)]
#[put("/delivery/orders/{id}/deliver")]
pub async fn deliver_order(
    state: web::Data<HttpState>,
    session: PartnerSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Order>> {
    let order = state
        .partner_orders
        .deliver(session.0, OrderId::new(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

#[utoipa::path(
    get,
    path = "/api/admin/partners",
    responses(
        (status = 200, description = "Delivery partners", body = [DeliveryPartner]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listPartners"
)]
#[get("/admin/partners")]
pub async fn list_partners(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<Vec<DeliveryPartner>>> {
    Ok(web::Json(state.partner_admin.list().await?))
}

/// Create a delivery partner account.
#[utoipa::path(
    post,
    path = "/api/admin/partners",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Partner created", body = DeliveryPartner),
        (status = 400, description = "Missing fields or phone already registered", body = ErrorSchema),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createPartner"
)]
#[post("/admin/partners")]
pub async fn create_partner(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let RegisterBody {
        name,
        phone,
        password,
    } = payload.into_inner();
    let (name, phone, password) = account_fields(name, phone, password)?;
    let partner = state
        .partner_admin
        .create(RegisterPartnerRequest {
            name,
            phone,
            password,
        })
        .await?;
    Ok(HttpResponse::Created().json(partner))
}

/// Toggle whether a partner can receive new assignments.
#[utoipa::path(
    put,
    path = "/api/admin/partners/{id}/availability",
    params(("id" = i64, Path, description = "Partner id")),
    request_body = AvailabilityBody,
    responses(
        (status = 200, description = "Updated partner", body = DeliveryPartner),
        (status = 404, description = "No such partner", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setPartnerAvailability"
)]
#[put("/admin/partners/{id}/availability")]
pub async fn set_partner_availability(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
    payload: web::Json<AvailabilityBody>,
) -> ApiResult<web::Json<DeliveryPartner>> {
    let is_available = required(payload.into_inner().is_available, IS_AVAILABLE)?;
    let partner = state
        .partner_admin
        .set_availability(PartnerId::new(path.into_inner()), is_available)
        .await?;
    Ok(web::Json(partner))
}
