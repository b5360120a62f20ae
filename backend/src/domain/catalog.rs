//! Product catalog: products and their priced variants.
//!
//! A [`Variant`] is a purchasable size/price option ("250g", "1kg") that
//! belongs to exactly one [`Product`]. Removing a product removes its variants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised by catalog drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogValidationError {
    #[error("product name must not be empty")]
    EmptyName,
    #[error("product category must not be empty")]
    EmptyCategory,
    #[error("variant label must not be empty")]
    EmptyLabel,
    #[error("variant price must not be negative")]
    NegativePrice,
}

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Raw row identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use row_id;

row_id!(
    /// Database identifier of a product.
    ProductId
);
row_id!(
    /// Database identifier of a variant.
    VariantId
);

/// Priced size option of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub id: VariantId,
    pub label: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
}

/// Catalog entry with its variants, ordered by variant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Find a variant of this product by label, ignoring case.
    pub fn variant_by_label(&self, label: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| variant.label.eq_ignore_ascii_case(label.trim()))
    }
}

/// Validated product fields for inserts and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    name: String,
    description: String,
    category: String,
    image_url: Option<String>,
}

impl ProductDraft {
    /// Validate raw product fields.
    ///
    /// # Examples
    /// ```
    /// use sresta_backend::domain::ProductDraft;
    ///
    /// let draft = ProductDraft::new(" Toor Dal ", "", "Pulses", None).unwrap();
    /// assert_eq!(draft.name(), "Toor Dal");
    /// ```
    pub fn new(
        name: &str,
        description: &str,
        category: &str,
        image_url: Option<&str>,
    ) -> Result<Self, CatalogValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogValidationError::EmptyName);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(CatalogValidationError::EmptyCategory);
        }
        let image_url = image_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned);
        Ok(Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            category: category.to_owned(),
            image_url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// Validated variant fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDraft {
    label: String,
    price: Decimal,
}

impl VariantDraft {
    /// Validate a label and price pair.
    pub fn new(label: &str, price: Decimal) -> Result<Self, CatalogValidationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CatalogValidationError::EmptyLabel);
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CatalogValidationError::NegativePrice);
        }
        Ok(Self {
            label: label.to_owned(),
            price: price.round_dp(2),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

/// Variant edit submitted alongside a product edit.
///
/// Entries with an id update that variant; entries without one are inserted.
/// Existing variants not listed are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEdit {
    pub id: Option<VariantId>,
    pub draft: VariantDraft,
}
