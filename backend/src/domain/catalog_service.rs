//! Catalog domain service implementing the catalog driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{CatalogCommand, CatalogQuery, CatalogRepository, CatalogRepositoryError};
use crate::domain::{
    Error, Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit, VariantId,
};

pub(crate) fn map_catalog_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalog repository unavailable: {message}"))
        }
        CatalogRepositoryError::Query { message } => {
            Error::internal(format!("catalog repository error: {message}"))
        }
    }
}

fn product_not_found(id: ProductId) -> Error {
    Error::not_found(format!("product {id} not found"))
}

fn variant_not_found(id: VariantId) -> Error {
    Error::not_found(format!("variant {id} not found"))
}

/// Catalog service over a [`CatalogRepository`].
#[derive(Clone)]
pub struct CatalogService<R> {
    catalog: Arc<R>,
}

impl<R> CatalogService<R> {
    pub fn new(catalog: Arc<R>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl<R> CatalogQuery for CatalogService<R>
where
    R: CatalogRepository,
{
    async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.catalog.list_products().await.map_err(map_catalog_error)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, Error> {
        self.catalog
            .find_product(id)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| product_not_found(id))
    }
}

#[async_trait]
impl<R> CatalogCommand for CatalogService<R>
where
    R: CatalogRepository,
{
    async fn create_product(
        &self,
        product: ProductDraft,
        first_variant: Option<VariantDraft>,
    ) -> Result<Product, Error> {
        let created = self
            .catalog
            .create_product(&product, first_variant)
            .await
            .map_err(map_catalog_error)?;
        info!(product_id = %created.id, "created product");
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: ProductDraft,
        variants: Option<Vec<VariantEdit>>,
    ) -> Result<Product, Error> {
        if let Some(edits) = variants.as_deref() {
            let mut seen = std::collections::HashSet::new();
            if let Some(duplicate) = edits
                .iter()
                .filter_map(|edit| edit.id)
                .find(|variant_id| !seen.insert(*variant_id))
            {
                return Err(Error::invalid_request(format!(
                    "variant {duplicate} is listed more than once"
                )));
            }
        }
        self.catalog
            .update_product(id, &product, variants)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| product_not_found(id))
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), Error> {
        let removed = self
            .catalog
            .delete_product(id)
            .await
            .map_err(map_catalog_error)?;
        if removed {
            info!(product_id = %id, "deleted product");
            Ok(())
        } else {
            Err(product_not_found(id))
        }
    }

    async fn create_variant(
        &self,
        product_id: ProductId,
        variant: VariantDraft,
    ) -> Result<Variant, Error> {
        self.catalog
            .create_variant(product_id, &variant)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| product_not_found(product_id))
    }

    async fn update_variant(&self, id: VariantId, variant: VariantDraft) -> Result<Variant, Error> {
        self.catalog
            .update_variant(id, &variant)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| variant_not_found(id))
    }

    async fn delete_variant(&self, id: VariantId) -> Result<(), Error> {
        let removed = self
            .catalog
            .delete_variant(id)
            .await
            .map_err(map_catalog_error)?;
        if removed {
            Ok(())
        } else {
            Err(variant_not_found(id))
        }
    }
}
