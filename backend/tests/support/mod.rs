//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. This
//! module wires the real domain services over the in-memory adapters so a
//! scenario can drive the full HTTP surface without PostgreSQL.

pub mod in_memory;

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use sresta_backend::domain::ports::{PasswordHasher, TokenCodec};
use sresta_backend::domain::{
    AccountService, AdminLoginService, CatalogService, CouponService, DeliveryService,
    OrderService, OrderServiceDeps,
};
use sresta_backend::inbound::http::state::{BackOfficePorts, HttpState, StorefrontPorts};
use sresta_backend::inbound::http::{configure, json_config};
use sresta_backend::outbound::security::{Argon2PasswordHasher, JwtTokenCodec, TokenSecret};

use in_memory::{InMemoryCatalog, InMemoryCoupons, InMemoryOrders, InMemoryPartners, InMemoryUsers};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "counter-top";

/// Build handler state over fresh in-memory stores.
pub fn storefront_state() -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = Arc::new(InMemoryUsers::default());
    let catalog = Arc::new(InMemoryCatalog::default());
    let coupons = Arc::new(InMemoryCoupons::default());
    let orders = Arc::new(InMemoryOrders::default());
    let partners = Arc::new(InMemoryPartners::default());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let tokens: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(
        &TokenSecret::from_bytes(vec![42; 32]),
        Duration::hours(1),
        clock.clone(),
    ));

    let accounts = Arc::new(AccountService::new(users, hasher.clone(), tokens.clone()));
    let catalog_service = Arc::new(CatalogService::new(catalog.clone()));
    let coupon_service = Arc::new(CouponService::new(
        coupons.clone(),
        catalog.clone(),
        clock.clone(),
    ));
    let order_service = Arc::new(OrderService::new(
        OrderServiceDeps {
            orders,
            catalog,
            coupons,
            partners: partners.clone(),
        },
        clock.clone(),
        Duration::minutes(10),
    ));
    let delivery = Arc::new(DeliveryService::new(
        partners,
        hasher,
        tokens.clone(),
        clock,
    ));
    let admin_login = Arc::new(AdminLoginService::new(
        Some(ADMIN_USERNAME.to_owned()),
        Some(ADMIN_PASSWORD.to_owned()),
        tokens.clone(),
    ));

    web::Data::new(HttpState::new(
        StorefrontPorts {
            accounts: accounts.clone(),
            catalog: catalog_service.clone(),
            coupons: coupon_service.clone(),
            orders: order_service.clone(),
            order_query: order_service.clone(),
        },
        BackOfficePorts {
            admin_login,
            users: accounts,
            catalog_admin: catalog_service,
            coupon_admin: coupon_service,
            dispatch: order_service.clone(),
            partner_orders: order_service,
            partners: delivery.clone(),
            partner_admin: delivery,
        },
        tokens,
    ))
}

/// Initialise the `/api` scope over `state`.
pub async fn init_app(
    state: web::Data<HttpState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(json_config())
            .service(web::scope("/api").configure(configure)),
    )
    .await
}

/// Send `request` and decode the JSON body, if any.
pub async fn call<S, B>(app: &S, request: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is JSON")
    };
    (status, body)
}
