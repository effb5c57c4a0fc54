use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::review::{Review, ReviewDraft};
use crate::errors::AppError;
use crate::handlers::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub name: String,
    pub description: String,
}

impl From<ReviewRequest> for ReviewDraft {
    fn from(req: ReviewRequest) -> Self {
        ReviewDraft {
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    /// RFC 3339 timestamp of when the review was written
    pub date: String,
    pub name: String,
    pub description: String,
}

impl From<&Review> for ReviewResponse {
    fn from(r: &Review) -> Self {
        ReviewResponse {
            id: r.id,
            date: r.date.to_rfc3339(),
            name: r.name.clone(),
            description: r.description.clone(),
        }
    }
}

/// GET /products/{product_id}/reviews
#[utoipa::path(
    get,
    path = "/products/{product_id}/reviews",
    params(
        ("product_id" = i64, Path, description = "Product id"),
    ),
    responses(
        (status = 200, description = "Reviews of the product", body = [ReviewResponse]),
        (status = 404, description = "Product not found"),
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let reviews = web::block(move || state.catalog.list_reviews(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ReviewResponse> = reviews.iter().map(ReviewResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{product_id}/reviews/{id}
#[utoipa::path(
    get,
    path = "/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = i64, Path, description = "Product id"),
        ("id" = i64, Path, description = "Review id"),
    ),
    responses(
        (status = 200, description = "Review found", body = ReviewResponse),
        (status = 404, description = "Product or review not found"),
    ),
    tag = "reviews"
)]
pub async fn get_review(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (product_id, review_id) = path.into_inner();

    let review = web::block(move || state.catalog.get_review(product_id, review_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ReviewResponse::from(&review)))
}

/// POST /products/{product_id}/reviews
#[utoipa::path(
    post,
    path = "/products/{product_id}/reviews",
    params(
        ("product_id" = i64, Path, description = "Product id"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review written", body = ReviewResponse),
        (status = 400, description = "Blank name or description"),
        (status = 404, description = "Product not found"),
    ),
    tag = "reviews"
)]
pub async fn create_review(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let draft = ReviewDraft::from(body.into_inner());

    let review = web::block(move || state.catalog.create_review(product_id, draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ReviewResponse::from(&review)))
}

/// PUT /products/{product_id}/reviews/{id}
#[utoipa::path(
    put,
    path = "/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = i64, Path, description = "Product id"),
        ("id" = i64, Path, description = "Review id"),
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review replaced", body = ReviewResponse),
        (status = 400, description = "Blank name or description"),
        (status = 404, description = "Product or review not found"),
    ),
    tag = "reviews"
)]
pub async fn update_review(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let (product_id, review_id) = path.into_inner();
    let draft = ReviewDraft::from(body.into_inner());

    let review = web::block(move || state.catalog.update_review(product_id, review_id, draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ReviewResponse::from(&review)))
}

/// DELETE /products/{product_id}/reviews/{id}
#[utoipa::path(
    delete,
    path = "/products/{product_id}/reviews/{id}",
    params(
        ("product_id" = i64, Path, description = "Product id"),
        ("id" = i64, Path, description = "Review id"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Product or review not found"),
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (product_id, review_id) = path.into_inner();

    web::block(move || state.catalog.delete_review(product_id, review_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
