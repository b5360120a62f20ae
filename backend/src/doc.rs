//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler from the inbound layer together
//! with the error envelope schemas. Request and response bodies referenced by
//! the handlers are collected automatically.
//!
//! Three header security schemes describe the token audiences: shoppers use
//! `x-auth-token`, the admin dashboard uses `x-admin-token`, and delivery
//! partners use `x-partner-token`.
//!
//! The document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{ADMIN_TOKEN_HEADER, PARTNER_TOKEN_HEADER, USER_TOKEN_HEADER};
use crate::inbound::http::schemas::{Acknowledgement, ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the token header security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        for (name, header, description) in [
            (
                "UserToken",
                USER_TOKEN_HEADER,
                "Shopper token issued by POST /api/login.",
            ),
            (
                "AdminToken",
                ADMIN_TOKEN_HEADER,
                "Admin token issued by POST /api/admin/login.",
            ),
            (
                "PartnerToken",
                PARTNER_TOKEN_HEADER,
                "Delivery partner token issued by POST /api/delivery/login.",
            ),
        ] {
            components.add_security_scheme(
                name,
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    header,
                    description,
                ))),
            );
        }
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Sresta Mart backend API",
        description = "Storefront, admin dashboard and delivery partner endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::list_addresses,
        crate::inbound::http::accounts::add_address,
        crate::inbound::http::catalog::list_products,
        crate::inbound::http::catalog::get_product,
        crate::inbound::http::catalog::admin_list_products,
        crate::inbound::http::catalog::create_product,
        crate::inbound::http::catalog::update_product,
        crate::inbound::http::catalog::delete_product,
        crate::inbound::http::catalog::create_variant,
        crate::inbound::http::catalog::update_variant,
        crate::inbound::http::catalog::delete_variant,
        crate::inbound::http::coupons::list_public_coupons,
        crate::inbound::http::coupons::apply_coupon,
        crate::inbound::http::coupons::admin_list_coupons,
        crate::inbound::http::coupons::create_coupon,
        crate::inbound::http::coupons::delete_coupon,
        crate::inbound::http::orders::quote_order,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::confirm_order,
        crate::inbound::http::orders::track_order,
        crate::inbound::http::orders::admin_list_orders,
        crate::inbound::http::orders::assign_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::orders::complete_order,
        crate::inbound::http::orders::admin_track_order,
        crate::inbound::http::delivery::partner_login,
        crate::inbound::http::delivery::report_location,
        crate::inbound::http::delivery::list_assigned_orders,
        crate::inbound::http::delivery::accept_order,
        crate::inbound::http::delivery::deliver_order,
        crate::inbound::http::delivery::list_partners,
        crate::inbound::http::delivery::create_partner,
        crate::inbound::http::delivery::set_partner_availability,
        crate::inbound::http::admin::admin_login,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, Acknowledgement)),
    tags(
        (name = "accounts", description = "Shopper registration, login and addresses"),
        (name = "catalog", description = "Products and their variants"),
        (name = "coupons", description = "Public coupons and coupon validation"),
        (name = "orders", description = "Checkout, order history and tracking"),
        (name = "delivery", description = "Delivery partner portal"),
        (name = "admin", description = "Admin dashboard operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
