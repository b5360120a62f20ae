//! Token-header extractors used by HTTP handlers.
//!
//! Each audience has its own header. A handler that takes `UserSession`,
//! `AdminSession` or `PartnerSession` only runs when that header carries a
//! valid token issued for the matching role. A missing or unverifiable token
//! is `401`. A valid token for another role is `403`.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, PartnerId, Principal, Role, UserId};

use super::state::HttpState;

pub const USER_TOKEN_HEADER: &str = "x-auth-token";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
pub const PARTNER_TOKEN_HEADER: &str = "x-partner-token";

/// Authenticated shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSession(pub UserId);

/// Authenticated admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession;

/// Authenticated delivery partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerSession(pub PartnerId);

fn header_token<'a>(req: &'a HttpRequest, header: &'static str) -> Result<&'a str, Error> {
    req.headers()
        .get(header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::unauthorized("No token, authorization denied"))
}

fn verify(req: &HttpRequest, header: &'static str, expected: Role) -> Result<Principal, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = header_token(req, header)?;
    let principal = state.tokens.verify(token).map_err(|err| match err {
        TokenError::Invalid { message } => {
            debug!(header, %message, "rejected token");
            Error::unauthorized("Token is not valid")
        }
        TokenError::Signing { message } => {
            Error::internal(format!("token verification failed: {message}"))
        }
    })?;
    if principal.role() == expected {
        Ok(principal)
    } else {
        Err(Error::forbidden("Access denied"))
    }
}

impl FromRequest for UserSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            verify(req, USER_TOKEN_HEADER, Role::User).and_then(|principal| match principal {
                Principal::User(id) => Ok(Self(id)),
                _ => Err(Error::forbidden("Access denied")),
            }),
        )
    }
}

impl FromRequest for AdminSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verify(req, ADMIN_TOKEN_HEADER, Role::Admin).map(|_| Self))
    }
}

impl FromRequest for PartnerSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            verify(req, PARTNER_TOKEN_HEADER, Role::Partner).and_then(
                |principal| match principal {
                    Principal::Partner(id) => Ok(Self(id)),
                    _ => Err(Error::forbidden("Access denied")),
                },
            ),
        )
    }
}
