//! Port abstraction for the product catalog store.
//!
//! Multi-row writes (product plus variants) are atomic: adapters run them in
//! a single transaction so a failed variant write leaves no product behind.

use async_trait::async_trait;

use crate::domain::{
    Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit, VariantId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog repository adapters.
    pub enum CatalogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalog repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "catalog repository query failed: {message}",
    }
}

/// Port for reading and editing products and variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products with their variants, ordered by product id.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogRepositoryError>;

    /// One product with its variants.
    async fn find_product(&self, id: ProductId)
    -> Result<Option<Product>, CatalogRepositoryError>;

    /// Products with the given ids; unknown ids are skipped.
    async fn find_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, CatalogRepositoryError>;

    /// Insert a product and, optionally, its first variant in one transaction.
    async fn create_product(
        &self,
        product: &ProductDraft,
        first_variant: Option<VariantDraft>,
    ) -> Result<Product, CatalogRepositoryError>;

    /// Update a product and, when `variants` is given, replace its variant
    /// set in one transaction. Returns `None` for an unknown product.
    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductDraft,
        variants: Option<Vec<VariantEdit>>,
    ) -> Result<Option<Product>, CatalogRepositoryError>;

    /// Delete a product and its variants. Returns whether a row was removed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, CatalogRepositoryError>;

    /// Add a variant. Returns `None` when the product does not exist.
    async fn create_variant(
        &self,
        product_id: ProductId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError>;

    /// Update a variant's label and price.
    async fn update_variant(
        &self,
        id: VariantId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError>;

    /// Delete a variant. Returns whether a row was removed.
    async fn delete_variant(&self, id: VariantId) -> Result<bool, CatalogRepositoryError>;
}
