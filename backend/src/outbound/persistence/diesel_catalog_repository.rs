//! PostgreSQL-backed catalog adapter.
//!
//! Products and variants are loaded with two queries and stitched together in
//! memory. Writes touching both tables run inside one transaction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CatalogRepository, CatalogRepositoryError};
use crate::domain::{
    Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit, VariantId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewVariantRow, ProductFields, ProductRow, VariantRow, VariantUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{product_variants, products};

/// Diesel-backed implementation of the catalog repository port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    map_basic_pool_error(error, CatalogRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogRepositoryError::query,
        CatalogRepositoryError::connection,
    )
}

fn product_fields(draft: &ProductDraft) -> ProductFields<'_> {
    ProductFields {
        name: draft.name(),
        description: draft.description(),
        category: draft.category(),
        image_url: draft.image_url(),
    }
}

fn row_to_variant(row: VariantRow) -> Variant {
    Variant {
        id: VariantId::new(row.id),
        label: row.label,
        price: row.price,
    }
}

fn row_to_product(row: ProductRow, variants: Vec<Variant>) -> Product {
    Product {
        id: ProductId::new(row.id),
        name: row.name,
        description: row.description,
        category: row.category,
        image_url: row.image_url,
        variants,
    }
}

/// Attach variants to their products, keeping product order.
fn assemble_products(products: Vec<ProductRow>, variants: Vec<VariantRow>) -> Vec<Product> {
    let mut by_product: HashMap<i64, Vec<Variant>> = HashMap::new();
    for row in variants {
        by_product
            .entry(row.product_id)
            .or_default()
            .push(row_to_variant(row));
    }
    products
        .into_iter()
        .map(|row| {
            let variants = by_product.remove(&row.id).unwrap_or_default();
            row_to_product(row, variants)
        })
        .collect()
}

async fn load_variants(
    conn: &mut AsyncPgConnection,
    product_ids: &[i64],
) -> Result<Vec<VariantRow>, diesel::result::Error> {
    product_variants::table
        .filter(product_variants::product_id.eq_any(product_ids))
        .order(product_variants::id.asc())
        .select(VariantRow::as_select())
        .load(conn)
        .await
}

async fn load_products(
    conn: &mut AsyncPgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<Product>, diesel::result::Error> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let variants = if ids.is_empty() {
        Vec::new()
    } else {
        load_variants(conn, &ids).await?
    };
    Ok(assemble_products(rows, variants))
}

/// Apply a full variant list to a product: listed variants that belong to
/// it are updated, the rest are inserted, and unlisted ones are removed.
async fn replace_variants(
    conn: &mut AsyncPgConnection,
    product_id: i64,
    edits: &[VariantEdit],
) -> Result<(), diesel::result::Error> {
    let existing: HashSet<i64> = product_variants::table
        .filter(product_variants::product_id.eq(product_id))
        .select(product_variants::id)
        .load::<i64>(conn)
        .await?
        .into_iter()
        .collect();

    let kept: Vec<i64> = edits
        .iter()
        .filter_map(|edit| edit.id.map(VariantId::get))
        .filter(|id| existing.contains(id))
        .collect();

    diesel::delete(
        product_variants::table
            .filter(product_variants::product_id.eq(product_id))
            .filter(product_variants::id.ne_all(&kept)),
    )
    .execute(conn)
    .await?;

    for edit in edits {
        let draft = &edit.draft;
        match edit.id.map(VariantId::get).filter(|id| existing.contains(id)) {
            Some(id) => {
                diesel::update(product_variants::table.find(id))
                    .set(&VariantUpdate {
                        label: draft.label(),
                        price: draft.price(),
                    })
                    .execute(conn)
                    .await?;
            }
            None => {
                diesel::insert_into(product_variants::table)
                    .values(&NewVariantRow {
                        product_id,
                        label: draft.label(),
                        price: draft.price(),
                    })
                    .execute(conn)
                    .await?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProductRow> = products::table
            .order(products::id.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_products(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn find_product(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, CatalogRepositoryError> {
        let products = self.find_products(&[id]).await?;
        Ok(products.into_iter().next())
    }

    async fn find_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, CatalogRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();

        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(&raw_ids))
            .order(products::id.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_products(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn create_product(
        &self,
        product: &ProductDraft,
        first_variant: Option<VariantDraft>,
    ) -> Result<Product, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let fields = product_fields(product);

        let (row, variants) = conn
            .transaction(|conn| {
                async move {
                    let row: ProductRow = diesel::insert_into(products::table)
                        .values(&fields)
                        .returning(ProductRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let mut variants: Vec<VariantRow> = Vec::new();
                    if let Some(variant) = first_variant {
                        let inserted: VariantRow = diesel::insert_into(product_variants::table)
                            .values(&NewVariantRow {
                                product_id: row.id,
                                label: variant.label(),
                                price: variant.price(),
                            })
                            .returning(VariantRow::as_returning())
                            .get_result(conn)
                            .await?;
                        variants.push(inserted);
                    }
                    Ok::<_, diesel::result::Error>((row, variants))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_product(
            row,
            variants.into_iter().map(row_to_variant).collect(),
        ))
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductDraft,
        variants: Option<Vec<VariantEdit>>,
    ) -> Result<Option<Product>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let fields = product_fields(product);

        conn.transaction(|conn| {
            async move {
                let updated: Option<ProductRow> = diesel::update(products::table.find(id.get()))
                    .set(&fields)
                    .returning(ProductRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                let Some(row) = updated else {
                    return Ok(None);
                };
                if let Some(edits) = variants.as_deref() {
                    replace_variants(conn, row.id, edits).await?;
                }
                let mut loaded = load_products(conn, vec![row]).await?;
                Ok::<_, diesel::result::Error>(loaded.pop())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(products::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn create_variant(
        &self,
        product_id: ProductId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let product_exists: bool = diesel::select(diesel::dsl::exists(
            products::table.find(product_id.get()),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if !product_exists {
            return Ok(None);
        }

        let row: VariantRow = diesel::insert_into(product_variants::table)
            .values(&NewVariantRow {
                product_id: product_id.get(),
                label: variant.label(),
                price: variant.price(),
            })
            .returning(VariantRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Some(row_to_variant(row)))
    }

    async fn update_variant(
        &self,
        id: VariantId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<VariantRow> = diesel::update(product_variants::table.find(id.get()))
            .set(&VariantUpdate {
                label: variant.label(),
                price: variant.price(),
            })
            .returning(VariantRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_variant))
    }

    async fn delete_variant(&self, id: VariantId) -> Result<bool, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(product_variants::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
