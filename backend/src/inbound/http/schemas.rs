//! OpenAPI schema definitions for the error payload and shared responses.
//!
//! The domain error serialises through a private DTO, so its schema is
//! registered here with utoipa's external schema support. Storefront entities
//! derive `ToSchema` directly.

use serde::Serialize;
use utoipa::ToSchema;

/// `{"msg": "..."}` body returned by deletes and other bodiless writes.
#[derive(Debug, Serialize, ToSchema)]
pub struct Acknowledgement {
    #[schema(example = "Product deleted")]
    pub msg: String,
}

impl Acknowledgement {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate phone number or coupon code. Sent with status 400.
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Clients display `msg` verbatim.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "phone is required")]
    msg: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field": "phone", "code": "missing_field"}`.
    details: Option<serde_json::Value>,
}
