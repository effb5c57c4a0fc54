use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{Product, ProductDraft};
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::handlers::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal string between "1.00" and "9999.99"
    pub unit_price: String,
    pub inventory: i32,
    /// Id of the collection the product is filed under
    pub collection: i64,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft, DomainError> {
        let unit_price = BigDecimal::from_str(self.unit_price.trim())
            .map_err(|_| DomainError::invalid_input("unit_price", "must be a decimal number"))?;
        Ok(ProductDraft {
            title: self.title,
            slug: self.slug,
            description: self.description,
            unit_price,
            inventory: self.inventory,
            collection_id: self.collection,
        })
    }
}

/// The short product form embedded in cart and order items.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub title: String,
    /// Current catalog price as a decimal string, e.g. "9.99"
    pub unit_price: String,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        ProductSummary {
            id: p.id,
            title: p.title.clone(),
            unit_price: p.unit_price.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub inventory: i32,
    pub unit_price: String,
    pub price_with_tax: String,
    pub collection: i64,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        ProductResponse {
            id: p.id,
            title: p.title.clone(),
            slug: p.slug.clone(),
            description: p.description.clone(),
            inventory: p.inventory,
            unit_price: p.unit_price.to_string(),
            price_with_tax: p.price_with_tax().to_string(),
            collection: p.collection_id,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products ordered by title", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = web::block(move || state.catalog.list_products())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ProductResponse> = products.iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || state.catalog.get_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(&product)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid field or unknown collection"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner().into_draft()?;

    let product = web::block(move || state.catalog.create_product(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(&product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product replaced", body = ProductResponse),
        (status = 400, description = "Invalid field or unknown collection"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let draft = body.into_inner().into_draft()?;

    let product = web::block(move || state.catalog.update_product(product_id, draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(&product)))
}

/// DELETE /products/{id}
///
/// Refused with 405 while any order item references the product.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 405, description = "Product is on an order"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    web::block(move || state.catalog.delete_product(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
