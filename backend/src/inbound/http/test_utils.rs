//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::ports::{
    MockAccountCommand, MockAdminLogin, MockCatalogCommand, MockCatalogQuery, MockCouponCommand,
    MockCouponQuery, MockOrderCommand, MockOrderDispatch, MockOrderQuery, MockPartnerAdmin,
    MockPartnerCommand, MockPartnerOrders, MockTokenCodec, MockUsersQuery, TokenError,
};
use crate::domain::{PartnerId, Principal, UserId};

use super::state::{BackOfficePorts, HttpState, StorefrontPorts};

pub const USER_TOKEN: &str = "user-7";
pub const ADMIN_TOKEN: &str = "admin";
pub const PARTNER_TOKEN: &str = "partner-3";
pub const TEST_USER: UserId = UserId::new(7);
pub const TEST_PARTNER: PartnerId = PartnerId::new(3);

/// Token codec that accepts the three fixed test tokens above.
pub fn fixed_tokens() -> MockTokenCodec {
    let mut tokens = MockTokenCodec::new();
    tokens.expect_verify().returning(|token| match token {
        USER_TOKEN => Ok(Principal::User(TEST_USER)),
        ADMIN_TOKEN => Ok(Principal::Admin),
        PARTNER_TOKEN => Ok(Principal::Partner(TEST_PARTNER)),
        _ => Err(TokenError::invalid("signature mismatch")),
    });
    tokens
}

/// Builder that defaults every port to an expectation-free mock.
///
/// Calling a port the test did not configure panics, which fails the test.
pub struct TestState {
    accounts: MockAccountCommand,
    catalog: MockCatalogQuery,
    coupons: MockCouponQuery,
    orders: MockOrderCommand,
    order_query: MockOrderQuery,
    admin_login: MockAdminLogin,
    users: MockUsersQuery,
    catalog_admin: MockCatalogCommand,
    coupon_admin: MockCouponCommand,
    dispatch: MockOrderDispatch,
    partner_orders: MockPartnerOrders,
    partners: MockPartnerCommand,
    partner_admin: MockPartnerAdmin,
    tokens: MockTokenCodec,
}

impl Default for TestState {
    fn default() -> Self {
        Self {
            accounts: MockAccountCommand::new(),
            catalog: MockCatalogQuery::new(),
            coupons: MockCouponQuery::new(),
            orders: MockOrderCommand::new(),
            order_query: MockOrderQuery::new(),
            admin_login: MockAdminLogin::new(),
            users: MockUsersQuery::new(),
            catalog_admin: MockCatalogCommand::new(),
            coupon_admin: MockCouponCommand::new(),
            dispatch: MockOrderDispatch::new(),
            partner_orders: MockPartnerOrders::new(),
            partners: MockPartnerCommand::new(),
            partner_admin: MockPartnerAdmin::new(),
            tokens: fixed_tokens(),
        }
    }
}

macro_rules! with_port {
    ($($method:ident => $field:ident: $mock:ty),* $(,)?) => {
        impl TestState {
            $(
                pub fn $method(mut self, mock: $mock) -> Self {
                    self.$field = mock;
                    self
                }
            )*
        }
    };
}

with_port! {
    with_accounts => accounts: MockAccountCommand,
    with_catalog => catalog: MockCatalogQuery,
    with_coupons => coupons: MockCouponQuery,
    with_orders => orders: MockOrderCommand,
    with_order_query => order_query: MockOrderQuery,
    with_admin_login => admin_login: MockAdminLogin,
    with_users => users: MockUsersQuery,
    with_catalog_admin => catalog_admin: MockCatalogCommand,
    with_coupon_admin => coupon_admin: MockCouponCommand,
    with_dispatch => dispatch: MockOrderDispatch,
    with_partner_orders => partner_orders: MockPartnerOrders,
    with_partners => partners: MockPartnerCommand,
    with_partner_admin => partner_admin: MockPartnerAdmin,
    with_tokens => tokens: MockTokenCodec,
}

impl TestState {
    pub fn build(self) -> HttpState {
        HttpState::new(
            StorefrontPorts {
                accounts: Arc::new(self.accounts),
                catalog: Arc::new(self.catalog),
                coupons: Arc::new(self.coupons),
                orders: Arc::new(self.orders),
                order_query: Arc::new(self.order_query),
            },
            BackOfficePorts {
                admin_login: Arc::new(self.admin_login),
                users: Arc::new(self.users),
                catalog_admin: Arc::new(self.catalog_admin),
                coupon_admin: Arc::new(self.coupon_admin),
                dispatch: Arc::new(self.dispatch),
                partner_orders: Arc::new(self.partner_orders),
                partners: Arc::new(self.partners),
                partner_admin: Arc::new(self.partner_admin),
            },
            Arc::new(self.tokens),
        )
    }
}

/// Full `/api` surface over the given state.
pub fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(super::json_config())
        .service(web::scope("/api").configure(super::configure))
}
