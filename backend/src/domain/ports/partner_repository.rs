//! Port abstraction for delivery partner storage.
use async_trait::async_trait;

use crate::domain::{
    DeliveryPartner, NewPartner, PartnerCredentials, PartnerId, PartnerLocation, Phone,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by partner repository adapters.
    pub enum PartnerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "partner repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "partner repository query failed: {message}",
        /// The phone number is already registered to another partner.
        Conflict { message: String } => "partner repository conflict: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Insert a partner, available and without a location.
    async fn create(&self, partner: &NewPartner) -> Result<DeliveryPartner, PartnerRepositoryError>;

    /// Every partner, ordered by id.
    async fn list_all(&self) -> Result<Vec<DeliveryPartner>, PartnerRepositoryError>;

    async fn find_by_id(
        &self,
        id: PartnerId,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError>;

    /// Fetch a partner and password hash by phone for login.
    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<PartnerCredentials>, PartnerRepositoryError>;

    /// Toggle availability. Returns `None` for an unknown partner.
    async fn set_availability(
        &self,
        id: PartnerId,
        is_available: bool,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError>;

    /// Overwrite the partner's last location. Returns whether a row changed.
    async fn update_location(
        &self,
        id: PartnerId,
        location: &PartnerLocation,
    ) -> Result<bool, PartnerRepositoryError>;
}
