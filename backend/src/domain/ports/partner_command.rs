//! Driving ports for delivery partner accounts and location reports.

use async_trait::async_trait;

use crate::domain::{
    DeliveryPartner, Error, GeoPoint, LoginCredentials, PartnerId, PartnerLocation, Password,
    PersonName, Phone,
};

use super::IssuedToken;

/// Successful partner login.
#[derive(Debug, Clone)]
pub struct PartnerLoginResponse {
    pub token: IssuedToken,
    pub partner: DeliveryPartner,
}

/// Validated partner account payload.
#[derive(Debug, Clone)]
pub struct RegisterPartnerRequest {
    pub name: PersonName,
    pub phone: Phone,
    pub password: Password,
}

/// Partner portal use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartnerCommand: Send + Sync {
    async fn login(&self, credentials: LoginCredentials) -> Result<PartnerLoginResponse, Error>;

    /// Overwrite the partner's last location, stamped with the current time.
    async fn report_location(
        &self,
        partner_id: PartnerId,
        point: GeoPoint,
    ) -> Result<PartnerLocation, Error>;
}

/// Admin partner management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartnerAdmin: Send + Sync {
    /// Create a partner account. A taken phone number is a `conflict`.
    async fn create(&self, request: RegisterPartnerRequest) -> Result<DeliveryPartner, Error>;

    async fn list(&self) -> Result<Vec<DeliveryPartner>, Error>;

    async fn set_availability(
        &self,
        partner_id: PartnerId,
        is_available: bool,
    ) -> Result<DeliveryPartner, Error>;
}
