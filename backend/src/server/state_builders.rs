//! Builders wiring Diesel repositories and domain services into [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use sresta_backend::domain::ports::{PasswordHasher, TokenCodec};
use sresta_backend::domain::{
    AccountService, AdminLoginService, CatalogService, CouponService, DeliveryService,
    OrderService, OrderServiceDeps,
};
use sresta_backend::inbound::http::state::{BackOfficePorts, HttpState, StorefrontPorts};
use sresta_backend::outbound::persistence::{
    DbPool, DieselCatalogRepository, DieselCouponRepository, DieselOrderRepository,
    DieselPartnerRepository, DieselUserRepository,
};
use sresta_backend::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};

use super::ServerConfig;

/// One Diesel repository per port, sharing a pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    catalog: Arc<DieselCatalogRepository>,
    coupons: Arc<DieselCouponRepository>,
    orders: Arc<DieselOrderRepository>,
    partners: Arc<DieselPartnerRepository>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            catalog: Arc::new(DieselCatalogRepository::new(pool.clone())),
            coupons: Arc::new(DieselCouponRepository::new(pool.clone())),
            orders: Arc::new(DieselOrderRepository::new(pool.clone())),
            partners: Arc::new(DieselPartnerRepository::new(pool.clone())),
        }
    }
}

/// Build the shared HTTP state from the configured pool and secrets.
///
/// Each service is constructed once and shared by every port it implements.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = Repositories::new(&config.db_pool);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let tokens: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(
        &config.token_secret,
        config.token_ttl,
        clock.clone(),
    ));

    let accounts = Arc::new(AccountService::new(
        repos.users.clone(),
        hasher.clone(),
        tokens.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(repos.catalog.clone()));
    let coupons = Arc::new(CouponService::new(
        repos.coupons.clone(),
        repos.catalog.clone(),
        clock.clone(),
    ));
    let orders = Arc::new(OrderService::new(
        OrderServiceDeps {
            orders: repos.orders,
            catalog: repos.catalog,
            coupons: repos.coupons,
            partners: repos.partners.clone(),
        },
        clock.clone(),
        config.location_stale_after,
    ));
    let delivery = Arc::new(DeliveryService::new(
        repos.partners,
        hasher,
        tokens.clone(),
        clock,
    ));
    let admin_login = Arc::new(AdminLoginService::new(
        config.admin.username.clone(),
        config.admin.password.clone(),
        tokens.clone(),
    ));

    let storefront = StorefrontPorts {
        accounts: accounts.clone(),
        catalog: catalog.clone(),
        coupons: coupons.clone(),
        orders: orders.clone(),
        order_query: orders.clone(),
    };
    let back_office = BackOfficePorts {
        admin_login,
        users: accounts,
        catalog_admin: catalog,
        coupon_admin: coupons,
        dispatch: orders.clone(),
        partner_orders: orders,
        partners: delivery.clone(),
        partner_admin: delivery,
    };

    web::Data::new(HttpState::new(storefront, back_office, tokens))
}
