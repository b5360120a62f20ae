//! Shopper accounts and their saved addresses.

use std::fmt;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use utoipa::ToSchema;

/// Validation errors raised by user value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptyPhone,
    InvalidPhone,
    EmptyAddressLabel,
    EmptyAddressValue,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyPhone => write!(f, "phone must not be empty"),
            Self::InvalidPhone => write!(
                f,
                "phone must contain 10 to 15 digits, optionally prefixed with +",
            ),
            Self::EmptyAddressLabel => write!(f, "address label must not be empty"),
            Self::EmptyAddressValue => write!(f, "address must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Database identifier of a shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw row identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw row identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum length of a shopper or partner name.
pub const NAME_MAX: usize = 80;

/// Trimmed, non-empty person name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a name.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{10,15}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Phone number used as the login identifier.
///
/// Spaces and dashes are stripped before validation so `98480 12345` and
/// `9848012345` identify the same account.
///
/// # Examples
/// ```
/// use sresta_backend::domain::Phone;
///
/// let phone = Phone::new("98480-12345").unwrap();
/// assert_eq!(phone.as_ref(), "9848012345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "9848012345")]
pub struct Phone(String);

impl Phone {
    /// Normalise and validate a phone number.
    pub fn new(phone: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised: String = phone
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyPhone);
        }
        if !phone_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidPhone);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Phone> for String {
    fn from(value: Phone) -> Self {
        value.0
    }
}

impl TryFrom<String> for Phone {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Labelled delivery address saved on a shopper's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SavedAddress {
    label: String,
    value: String,
}

impl SavedAddress {
    /// Validate and construct an address entry.
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let label = label.into().trim().to_owned();
        let value = value.into().trim().to_owned();
        if label.is_empty() {
            return Err(UserValidationError::EmptyAddressLabel);
        }
        if value.is_empty() {
            return Err(UserValidationError::EmptyAddressValue);
        }
        Ok(Self { label, value })
    }

    /// Short label such as "Home".
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Free-text address used for region matching.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Registered shopper.
///
/// Serialises with the storefront's row field names (`is_admin`,
/// `created_at`). The password hash never leaves the persistence boundary
/// through this type; see [`UserCredentials`] for the login lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    id: UserId,
    name: PersonName,
    phone: Phone,
    is_admin: bool,
    addresses: Vec<SavedAddress>,
    created_at: DateTime<Utc>,
}

/// Field bundle used to rebuild a [`User`] from storage.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub name: PersonName,
    pub phone: Phone,
    pub is_admin: bool,
    pub addresses: Vec<SavedAddress>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from validated parts.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            name,
            phone,
            is_admin,
            addresses,
            created_at,
        } = draft;
        Self {
            id,
            name,
            phone,
            is_admin,
            addresses,
            created_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn addresses(&self) -> &[SavedAddress] {
        &self.addresses
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Stored password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Registration payload once the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: PersonName,
    pub phone: Phone,
    pub password_hash: PasswordHash,
}

/// User row paired with its password hash for login checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}
