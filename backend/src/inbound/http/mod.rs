//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod catalog;
pub mod coupons;
pub mod delivery;
pub mod error;
pub mod health;
pub mod orders;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// JSON extractor settings shared by every handler.
///
/// Malformed bodies surface as `invalid_request` errors in the standard
/// error envelope instead of actix's plain-text response.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(error::json_error_handler)
}

/// Register every REST handler. Mount under `/api`.
///
/// Handlers sharing a path (`GET` and `POST /admin/products`, for example)
/// are told apart by their method guards.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(accounts::list_addresses)
        .service(accounts::add_address)
        .service(catalog::list_products)
        .service(catalog::get_product)
        .service(coupons::list_public_coupons)
        .service(coupons::apply_coupon)
        .service(orders::quote_order)
        .service(orders::place_order)
        .service(orders::list_orders)
        .service(orders::confirm_order)
        .service(orders::track_order)
        .service(delivery::partner_login)
        .service(delivery::report_location)
        .service(delivery::list_assigned_orders)
        .service(delivery::accept_order)
        .service(delivery::deliver_order)
        .service(admin::admin_login)
        .service(admin::list_users)
        .service(catalog::admin_list_products)
        .service(catalog::create_product)
        .service(catalog::update_product)
        .service(catalog::delete_product)
        .service(catalog::create_variant)
        .service(catalog::update_variant)
        .service(catalog::delete_variant)
        .service(coupons::admin_list_coupons)
        .service(coupons::create_coupon)
        .service(coupons::delete_coupon)
        .service(orders::admin_list_orders)
        .service(orders::assign_order)
        .service(orders::cancel_order)
        .service(orders::complete_order)
        .service(orders::admin_track_order)
        .service(delivery::list_partners)
        .service(delivery::create_partner)
        .service(delivery::set_partner_availability);
}
