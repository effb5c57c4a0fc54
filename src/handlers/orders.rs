use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{OrderLine, OrderView, PaymentStatus};
use crate::errors::AppError;
use crate::handlers::auth::AuthenticatedUser;
use crate::handlers::products::ProductSummary;
use crate::handlers::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub cart_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    /// "C" (completed) or "F" (failed)
    pub payment_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub quantity: i32,
    pub product: ProductSummary,
    /// Price paid per unit, fixed when the order was placed
    pub unit_price: String,
    pub total_price: String,
}

impl From<&OrderLine> for OrderItemResponse {
    fn from(line: &OrderLine) -> Self {
        OrderItemResponse {
            id: line.item.id,
            quantity: line.item.quantity,
            product: ProductSummary::from(&line.product),
            unit_price: line.item.unit_price.to_string(),
            total_price: line.total_price().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub customer: CustomerSummary,
    pub placed_at: String,
    /// "P" (pending), "C" (completed) or "F" (failed)
    pub payment_status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_order_price: String,
}

impl From<&OrderView> for OrderResponse {
    fn from(view: &OrderView) -> Self {
        OrderResponse {
            id: view.order.id,
            customer: CustomerSummary {
                id: view.customer.id,
                first_name: view.customer.first_name.clone(),
                last_name: view.customer.last_name.clone(),
            },
            placed_at: view.order.placed_at.to_rfc3339(),
            payment_status: view.order.payment_status.code().to_string(),
            items: view.lines.iter().map(OrderItemResponse::from).collect(),
            total_order_price: view.total_order_price().to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Converts the cart into an order for the authenticated customer. The order,
/// its items and the cart deletion commit in a single database transaction;
/// a cart that has already been placed answers 404.
#[utoipa::path(
    post,
    path = "/orders",
    params(
        ("X-User-Id" = i64, Header, description = "Authenticated user id"),
    ),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Cart is empty"),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "Cart or customer not found"),
        (status = 503, description = "Transaction rolled back, safe to retry"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let cart_id = body.into_inner().cart_id;

    let order = web::block(move || state.orders.place_order(cart_id, user.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(&order)))
}

/// GET /orders
///
/// Returns the authenticated customer's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("X-User-Id" = i64, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 200, description = "Orders of the caller", body = [OrderResponse]),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "No customer for this user"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.orders.list_orders(user.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = orders.iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
        ("X-User-Id" = i64, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(user.user_id, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// PATCH /orders/{id}
///
/// Settles a pending payment. Completed and failed are final.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated", body = OrderResponse),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_payment_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePaymentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: PaymentStatus = body.into_inner().payment_status.parse()?;

    let order = web::block(move || state.orders.update_payment_status(order_id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}
///
/// Deletes the order with its items and answers with what was removed.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = i64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.delete_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(&order)))
}
