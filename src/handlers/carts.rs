use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::{CartLine, CartView};
use crate::errors::AppError;
use crate::handlers::products::ProductSummary;
use crate::handlers::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: i64,
    /// Added on top of any quantity already in the cart. Must be at least 1.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: i64,
    pub product: ProductSummary,
    pub quantity: i32,
    /// quantity × current unit price
    pub total_price: String,
}

impl From<&CartLine> for CartItemResponse {
    fn from(line: &CartLine) -> Self {
        CartItemResponse {
            id: line.item.id,
            product: ProductSummary::from(&line.product),
            quantity: line.item.quantity,
            total_price: line.total_price().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: Uuid,
    pub items: Vec<CartItemResponse>,
    pub total_price: String,
}

impl From<&CartView> for CartResponse {
    fn from(view: &CartView) -> Self {
        CartResponse {
            id: view.cart.id,
            items: view.lines.iter().map(CartItemResponse::from).collect(),
            total_price: view.total_price().to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /carts
#[utoipa::path(
    post,
    path = "/carts",
    responses(
        (status = 201, description = "Cart created", body = CartResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "carts"
)]
pub async fn create_cart(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let cart = web::block(move || state.carts.create_cart())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CartResponse::from(&cart)))
}

/// GET /carts/{cart_id}
///
/// Returns the cart with its items priced at today's catalog prices.
#[utoipa::path(
    get,
    path = "/carts/{cart_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
    ),
    responses(
        (status = 200, description = "Cart found", body = CartResponse),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();

    let cart = web::block(move || state.carts.get_cart(cart_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartResponse::from(&cart)))
}

/// DELETE /carts/{cart_id}
#[utoipa::path(
    delete,
    path = "/carts/{cart_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
    ),
    responses(
        (status = 204, description = "Cart deleted"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn delete_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();

    web::block(move || state.carts.delete_cart(cart_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /carts/{cart_id}/items
#[utoipa::path(
    get,
    path = "/carts/{cart_id}/items",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
    ),
    responses(
        (status = 200, description = "Items in the cart", body = [CartItemResponse]),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn list_cart_items(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();

    let lines = web::block(move || state.carts.list_items(cart_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CartItemResponse> = lines.iter().map(CartItemResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /carts/{cart_id}/items
///
/// Adds a product to the cart. Posting a product that is already in the
/// cart increases its quantity.
#[utoipa::path(
    post,
    path = "/carts/{cart_id}/items",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added or merged", body = CartItemResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Cart or product not found"),
    ),
    tag = "carts"
)]
pub async fn add_cart_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let cart_id = path.into_inner();
    let body = body.into_inner();

    let line = web::block(move || state.carts.upsert_item(cart_id, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CartItemResponse::from(&line)))
}

/// PATCH /carts/{cart_id}/items/{item_id}
#[utoipa::path(
    patch,
    path = "/carts/{cart_id}/items/{item_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
        ("item_id" = i64, Path, description = "Cart item id"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = CartItemResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "carts"
)]
pub async fn update_cart_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, i64)>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, item_id) = path.into_inner();
    let quantity = body.into_inner().quantity;

    let line = web::block(move || state.carts.update_item(cart_id, item_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CartItemResponse::from(&line)))
}

/// DELETE /carts/{cart_id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/carts/{cart_id}/items/{item_id}",
    params(
        ("cart_id" = Uuid, Path, description = "Cart UUID"),
        ("item_id" = i64, Path, description = "Cart item id"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "Cart item not found"),
    ),
    tag = "carts"
)]
pub async fn remove_cart_item(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, i64)>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, item_id) = path.into_inner();

    web::block(move || state.carts.remove_item(cart_id, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
