//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`TokenCodec`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`OrderDispatch`], [`PartnerOrders`], [`AdminLogin`]) are implemented by
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod catalog_command;
mod catalog_repository;
mod coupon_command;
mod coupon_repository;
mod order_command;
mod order_repository;
mod partner_command;
mod partner_repository;
mod password_hasher;
mod token_codec;
mod user_repository;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockAdminLogin, MockUsersQuery};
pub use account_command::{AccountCommand, AdminLogin, LoginResponse, RegisterRequest, UsersQuery};
#[cfg(test)]
pub use catalog_command::{MockCatalogCommand, MockCatalogQuery};
pub use catalog_command::{CatalogCommand, CatalogQuery};
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogRepository, CatalogRepositoryError};
#[cfg(test)]
pub use coupon_command::{MockCouponCommand, MockCouponQuery};
pub use coupon_command::{CouponCartItem, CouponCommand, CouponQuery};
#[cfg(test)]
pub use coupon_repository::MockCouponRepository;
pub use coupon_repository::{CouponRepository, CouponRepositoryError};
#[cfg(test)]
pub use order_command::{MockOrderCommand, MockOrderDispatch, MockOrderQuery, MockPartnerOrders};
pub use order_command::{
    CheckoutRequest, OrderCommand, OrderDispatch, OrderQuery, PartnerOrders, PlacedOrder,
};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{
    OrderRepository, OrderRepositoryError, PartnerScope, StatusUpdate,
};
#[cfg(test)]
pub use partner_command::{MockPartnerAdmin, MockPartnerCommand};
pub use partner_command::{
    PartnerAdmin, PartnerCommand, PartnerLoginResponse, RegisterPartnerRequest,
};
#[cfg(test)]
pub use partner_repository::MockPartnerRepository;
pub use partner_repository::{PartnerRepository, PartnerRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{IssuedToken, TokenCodec, TokenError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
