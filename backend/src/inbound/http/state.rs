//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AdminLogin, CatalogCommand, CatalogQuery, CouponCommand, CouponQuery,
    OrderCommand, OrderDispatch, OrderQuery, PartnerAdmin, PartnerCommand, PartnerOrders,
    TokenCodec, UsersQuery,
};

/// Parameter object bundling the shopper-facing ports.
#[derive(Clone)]
pub struct StorefrontPorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub coupons: Arc<dyn CouponQuery>,
    pub orders: Arc<dyn OrderCommand>,
    pub order_query: Arc<dyn OrderQuery>,
}

/// Parameter object bundling the admin dashboard and delivery portal ports.
#[derive(Clone)]
pub struct BackOfficePorts {
    pub admin_login: Arc<dyn AdminLogin>,
    pub users: Arc<dyn UsersQuery>,
    pub catalog_admin: Arc<dyn CatalogCommand>,
    pub coupon_admin: Arc<dyn CouponCommand>,
    pub dispatch: Arc<dyn OrderDispatch>,
    pub partner_orders: Arc<dyn PartnerOrders>,
    pub partners: Arc<dyn PartnerCommand>,
    pub partner_admin: Arc<dyn PartnerAdmin>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub coupons: Arc<dyn CouponQuery>,
    pub orders: Arc<dyn OrderCommand>,
    pub order_query: Arc<dyn OrderQuery>,
    pub admin_login: Arc<dyn AdminLogin>,
    pub users: Arc<dyn UsersQuery>,
    pub catalog_admin: Arc<dyn CatalogCommand>,
    pub coupon_admin: Arc<dyn CouponCommand>,
    pub dispatch: Arc<dyn OrderDispatch>,
    pub partner_orders: Arc<dyn PartnerOrders>,
    pub partners: Arc<dyn PartnerCommand>,
    pub partner_admin: Arc<dyn PartnerAdmin>,
    /// Verifies the `x-*-token` headers.
    pub tokens: Arc<dyn TokenCodec>,
}

impl HttpState {
    /// Construct state from the two port bundles and the token verifier.
    pub fn new(
        storefront: StorefrontPorts,
        back_office: BackOfficePorts,
        tokens: Arc<dyn TokenCodec>,
    ) -> Self {
        let StorefrontPorts {
            accounts,
            catalog,
            coupons,
            orders,
            order_query,
        } = storefront;
        let BackOfficePorts {
            admin_login,
            users,
            catalog_admin,
            coupon_admin,
            dispatch,
            partner_orders,
            partners,
            partner_admin,
        } = back_office;
        Self {
            accounts,
            catalog,
            coupons,
            orders,
            order_query,
            admin_login,
            users,
            catalog_admin,
            coupon_admin,
            dispatch,
            partner_orders,
            partners,
            partner_admin,
            tokens,
        }
    }
}
