//! Delivery partner accounts and location reporting.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::account_service::{map_hash_error, map_token_error};
use crate::domain::ports::{
    PartnerAdmin, PartnerCommand, PartnerLoginResponse, PartnerRepository, PartnerRepositoryError,
    PasswordHasher, RegisterPartnerRequest, TokenCodec,
};
use crate::domain::{
    DeliveryPartner, Error, GeoPoint, LoginCredentials, NewPartner, PartnerId, PartnerLocation,
    Principal,
};

const INVALID_CREDENTIALS: &str = "Invalid phone number or password";

pub(crate) fn map_partner_error(error: PartnerRepositoryError) -> Error {
    match error {
        PartnerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("partner repository unavailable: {message}"))
        }
        PartnerRepositoryError::Query { message } => {
            Error::internal(format!("partner repository error: {message}"))
        }
        PartnerRepositoryError::Conflict { .. } => {
            Error::conflict("A delivery partner with this phone number already exists")
        }
    }
}

fn partner_not_found(id: PartnerId) -> Error {
    Error::not_found(format!("delivery partner {id} not found"))
}

/// Partner service implementing [`PartnerCommand`] and [`PartnerAdmin`].
#[derive(Clone)]
pub struct DeliveryService<P> {
    partners: Arc<P>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<P> DeliveryService<P> {
    pub fn new(
        partners: Arc<P>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            partners,
            hasher,
            tokens,
            clock,
        }
    }
}

#[async_trait]
impl<P> PartnerCommand for DeliveryService<P>
where
    P: PartnerRepository,
{
    async fn login(&self, credentials: LoginCredentials) -> Result<PartnerLoginResponse, Error> {
        let Some(record) = self
            .partners
            .find_credentials_by_phone(credentials.phone())
            .await
            .map_err(map_partner_error)?
        else {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), &record.password_hash)
            .map_err(map_hash_error)?
        {
            return Err(Error::invalid_request(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(Principal::Partner(record.partner.id))
            .map_err(map_token_error)?;
        Ok(PartnerLoginResponse {
            token,
            partner: record.partner,
        })
    }

    async fn report_location(
        &self,
        partner_id: PartnerId,
        point: GeoPoint,
    ) -> Result<PartnerLocation, Error> {
        let location = PartnerLocation {
            point,
            updated_at: self.clock.utc(),
        };
        let updated = self
            .partners
            .update_location(partner_id, &location)
            .await
            .map_err(map_partner_error)?;
        if !updated {
            return Err(partner_not_found(partner_id));
        }
        debug!(partner_id = %partner_id, "partner location updated");
        Ok(location)
    }
}

#[async_trait]
impl<P> PartnerAdmin for DeliveryService<P>
where
    P: PartnerRepository,
{
    async fn create(&self, request: RegisterPartnerRequest) -> Result<DeliveryPartner, Error> {
        let password_hash = self.hasher.hash(&request.password).map_err(map_hash_error)?;
        let partner = self
            .partners
            .create(&NewPartner {
                name: request.name,
                phone: request.phone,
                password_hash,
            })
            .await
            .map_err(map_partner_error)?;
        info!(partner_id = %partner.id, "created delivery partner");
        Ok(partner)
    }

    async fn list(&self) -> Result<Vec<DeliveryPartner>, Error> {
        self.partners.list_all().await.map_err(map_partner_error)
    }

    async fn set_availability(
        &self,
        partner_id: PartnerId,
        is_available: bool,
    ) -> Result<DeliveryPartner, Error> {
        let partner = self
            .partners
            .set_availability(partner_id, is_available)
            .await
            .map_err(map_partner_error)?
            .ok_or_else(|| partner_not_found(partner_id))?;
        info!(partner_id = %partner_id, is_available, "partner availability changed");
        Ok(partner)
    }
}
