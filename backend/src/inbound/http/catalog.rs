//! Catalog handlers: public browsing and admin product/variant management.
//!
//! ```text
//! GET /api/products
//! GET /api/products/{id}
//! POST /api/admin/products {"name":"Toor Dal","category":"Pulses","variant":{"label":"1kg","price":180}}
//! PUT /api/admin/products/{id} {..., "variants":[{"id":4,"label":"1kg","price":175}]}
//! POST /api/admin/variants {"productId":1,"label":"500g","price":95}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Product, ProductDraft, ProductId, Variant, VariantDraft, VariantEdit, VariantId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminSession;
use crate::inbound::http::schemas::{Acknowledgement, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, required, required_text};

const NAME: FieldName = FieldName::new("name");
const CATEGORY: FieldName = FieldName::new("category");
const LABEL: FieldName = FieldName::new("label");
const PRICE: FieldName = FieldName::new("price");
const PRODUCT_ID: FieldName = FieldName::new("productId");

/// Label and price of a variant.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantBody {
    pub label: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

/// Variant entry inside a product edit. Entries without `id` are inserted.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantEditBody {
    pub id: Option<i64>,
    pub label: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

/// Body for `POST /api/admin/products` and `PUT /api/admin/products/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "image_url")]
    pub image_url: Option<String>,
    /// First variant, created in the same transaction as the product.
    pub variant: Option<VariantBody>,
    /// Full replacement variant list on edit.
    pub variants: Option<Vec<VariantEditBody>>,
}

/// Body for `POST /api/admin/variants`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewVariantBody {
    pub product_id: Option<i64>,
    pub label: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

fn product_draft(body: &ProductBody) -> ApiResult<ProductDraft> {
    let name = required_text(body.name.clone(), NAME)?;
    let category = required_text(body.category.clone(), CATEGORY)?;
    ProductDraft::new(
        &name,
        body.description.as_deref().unwrap_or_default(),
        &category,
        body.image_url.as_deref(),
    )
    .map_err(|err| invalid_field_error(NAME, err))
}

fn variant_draft(label: Option<String>, price: Option<Decimal>) -> ApiResult<VariantDraft> {
    let label = required_text(label, LABEL)?;
    let price = required(price, PRICE)?;
    VariantDraft::new(&label, price).map_err(|err| invalid_field_error(PRICE, err))
}

fn variant_edits(bodies: Vec<VariantEditBody>) -> ApiResult<Vec<VariantEdit>> {
    bodies
        .into_iter()
        .map(|body| {
            let draft = variant_draft(body.label, body.price)?;
            Ok(VariantEdit {
                id: body.id.map(VariantId::new),
                draft,
            })
        })
        .collect()
}

/// List every product with its variants.
#[utoipa::path(
    get,
    path = "/api/products",
    responses((status = 200, description = "Products", body = [Product])),
    tags = ["catalog"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Product>>> {
    Ok(web::Json(state.catalog.list_products().await?))
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "No such product", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Product>> {
    let product = state
        .catalog
        .get_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product))
}

/// Admin view of the catalog.
#[utoipa::path(
    get,
    path = "/api/admin/products",
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListProducts"
)]
#[get("/admin/products")]
pub async fn admin_list_products(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<Vec<Product>>> {
    Ok(web::Json(state.catalog.list_products().await?))
}

/// Create a product, optionally with its first variant.
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = ProductBody,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product", body = ErrorSchema),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createProduct"
)]
#[post("/admin/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<ProductBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = product_draft(&body)?;
    let first_variant = body
        .variant
        .map(|variant| variant_draft(variant.label, variant.price))
        .transpose()?;
    let product = state
        .catalog_admin
        .create_product(draft, first_variant)
        .await?;
    Ok(HttpResponse::Created().json(product))
}

/// Edit a product. A `variants` list replaces the product's variants.
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductBody,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid product", body = ErrorSchema),
        (status = 404, description = "No such product", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateProduct"
)]
#[put("/admin/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
    payload: web::Json<ProductBody>,
) -> ApiResult<web::Json<Product>> {
    let body = payload.into_inner();
    let draft = product_draft(&body)?;
    let variants = body.variants.map(variant_edits).transpose()?;
    let product = state
        .catalog_admin
        .update_product(ProductId::new(path.into_inner()), draft, variants)
        .await?;
    Ok(web::Json(product))
}

/// Delete a product and its variants.
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = Acknowledgement),
        (status = 404, description = "No such product", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteProduct"
)]
#[delete("/admin/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Acknowledgement>> {
    state
        .catalog_admin
        .delete_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(Acknowledgement::new("Product deleted")))
}

/// Add a variant to an existing product.
#[utoipa::path(
    post,
    path = "/api/admin/variants",
    request_body = NewVariantBody,
    responses(
        (status = 201, description = "Variant created", body = Variant),
        (status = 400, description = "Invalid variant", body = ErrorSchema),
        (status = 404, description = "No such product", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createVariant"
)]
#[post("/admin/variants")]
pub async fn create_variant(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<NewVariantBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let product_id = required(body.product_id, PRODUCT_ID)?;
    let draft = variant_draft(body.label, body.price)?;
    let variant = state
        .catalog_admin
        .create_variant(ProductId::new(product_id), draft)
        .await?;
    Ok(HttpResponse::Created().json(variant))
}

/// Change a variant's label and price.
#[utoipa::path(
    put,
    path = "/api/admin/variants/{id}",
    params(("id" = i64, Path, description = "Variant id")),
    request_body = VariantBody,
    responses(
        (status = 200, description = "Variant updated", body = Variant),
        (status = 404, description = "No such variant", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateVariant"
)]
#[put("/admin/variants/{id}")]
pub async fn update_variant(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
    payload: web::Json<VariantBody>,
) -> ApiResult<web::Json<Variant>> {
    let body = payload.into_inner();
    let draft = variant_draft(body.label, body.price)?;
    let variant = state
        .catalog_admin
        .update_variant(VariantId::new(path.into_inner()), draft)
        .await?;
    Ok(web::Json(variant))
}

#[utoipa::path(
    delete,
    path = "/api/admin/variants/{id}",
    params(("id" = i64, Path, description = "Variant id")),
    responses(
        (status = 200, description = "Variant deleted", body = Acknowledgement),
        (status = 404, description = "No such variant", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteVariant"
)]
#[delete("/admin/variants/{id}")]
pub async fn delete_variant(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Acknowledgement>> {
    state
        .catalog_admin
        .delete_variant(VariantId::new(path.into_inner()))
        .await?;
    Ok(web::Json(Acknowledgement::new("Variant deleted")))
}
