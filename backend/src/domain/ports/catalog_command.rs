//! Driving ports for browsing and editing the catalog.

use async_trait::async_trait;

use crate::domain::{
    Error, Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit, VariantId,
};

/// Public catalog reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, Error>;

    /// One product, or `not_found`.
    async fn get_product(&self, id: ProductId) -> Result<Product, Error>;
}

/// Admin catalog edits. Unknown ids are `not_found`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    async fn create_product(
        &self,
        product: ProductDraft,
        first_variant: Option<VariantDraft>,
    ) -> Result<Product, Error>;

    async fn update_product(
        &self,
        id: ProductId,
        product: ProductDraft,
        variants: Option<Vec<VariantEdit>>,
    ) -> Result<Product, Error>;

    async fn delete_product(&self, id: ProductId) -> Result<(), Error>;

    async fn create_variant(
        &self,
        product_id: ProductId,
        variant: VariantDraft,
    ) -> Result<Variant, Error>;

    async fn update_variant(&self, id: VariantId, variant: VariantDraft) -> Result<Variant, Error>;

    async fn delete_variant(&self, id: VariantId) -> Result<(), Error>;
}
