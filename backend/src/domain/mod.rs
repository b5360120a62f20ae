//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed storefront entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Types validate on construction; invariants and serialisation contracts
//! are documented on each type.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - User, Product, Coupon, Order, DeliveryPartner: storefront aggregates.
//! - price_order: checkout pricing over catalog prices.
//! - *Service: implementations of the driving ports in [`ports`].

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod delivery;
pub mod error;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod trace_id;
pub mod user;

mod account_service;
mod catalog_service;
mod coupon_service;
mod delivery_service;
mod order_service;

#[cfg(test)]
pub(crate) mod test_clock;

pub use self::account_service::{AccountService, AdminLoginService};
pub use self::auth::{
    AdminCredentials, LoginCredentials, LoginValidationError, Password, Principal, Role,
};
pub use self::cart::{CartError, CartLine, ResolvedLine, resolve_cart};
pub use self::catalog::{
    CatalogValidationError, Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit,
    VariantId,
};
pub use self::catalog_service::CatalogService;
pub use self::coupon::{
    AppliedCoupon, COUPON_CODE_MAX, Coupon, CouponCartLine, CouponCode, CouponDraft, CouponId,
    CouponRejection, CouponValidationError, DiscountType, validate_coupon,
};
pub use self::coupon_service::CouponService;
pub use self::delivery::{
    DeliveryPartner, GeoPoint, GeoPointValidationError, LocationView, NewPartner,
    PartnerCredentials, PartnerId, PartnerLocation,
};
pub use self::delivery_service::DeliveryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::order::{
    DeliveryType, NewOrder, Order, OrderId, OrderItem, OrderStatus, OrderTransition,
    OrderTransitionError,
};
pub use self::order_service::{OrderService, OrderServiceDeps};
pub use self::pricing::{
    FIRST_ORDER_DISCOUNT_RATE, HYDERABAD_FREE_SHIPPING_ABOVE, MAX_LINE_QUANTITY, MONEY_MAX,
    PriceBreakdown, PricedLine, PricingError, PricingInput, ShippingRegion, billed_weight_kg,
    calculate_shipping, checked_subtotal, parse_weight_kg, price_order, round_money,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    NAME_MAX, NewUser, PasswordHash, PersonName, Phone, SavedAddress, User, UserCredentials,
    UserDraft, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use sresta_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
