//! Authentication primitives: login credentials and token principals.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{PartnerId, Phone, UserId, UserValidationError};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Phone was missing or malformed.
    Phone(UserValidationError),
    /// Admin username was blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone(err) => write!(f, "{err}"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Plaintext password held only for the duration of a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a non-empty password, keeping caller whitespace intact.
    pub fn new(password: &str) -> Result<Self, LoginValidationError> {
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Phone and password pair used by shoppers and delivery partners.
///
/// # Examples
/// ```
/// use sresta_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("9848012345", "secret").unwrap();
/// assert_eq!(creds.phone().as_ref(), "9848012345");
/// assert_eq!(creds.password().expose(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    phone: Phone,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw phone/password inputs.
    pub fn try_from_parts(phone: &str, password: &str) -> Result<Self, LoginValidationError> {
        let phone = Phone::new(phone).map_err(LoginValidationError::Phone)?;
        let password = Password::new(password)?;
        Ok(Self { phone, password })
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Operator credentials checked against configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: Password,
}

impl AdminCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Audience a token was issued for. Each header accepts exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Partner,
}

/// Identity carried inside an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    User(UserId),
    Admin,
    Partner(PartnerId),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Admin => Role::Admin,
            Self::Partner(_) => Role::Partner,
        }
    }

    /// Numeric subject stored in the token; admins use 0.
    pub fn subject(&self) -> i64 {
        match self {
            Self::User(id) => id.get(),
            Self::Admin => 0,
            Self::Partner(id) => id.get(),
        }
    }

    /// Rebuild a principal from a decoded role and subject.
    pub fn from_parts(role: Role, subject: i64) -> Self {
        match role {
            Role::User => Self::User(UserId::new(subject)),
            Role::Admin => Self::Admin,
            Role::Partner => Self::Partner(PartnerId::new(subject)),
        }
    }
}
