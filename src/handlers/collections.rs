use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{Collection, CollectionDraft};
use crate::errors::AppError;
use crate::handlers::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    pub title: String,
    #[serde(default)]
    pub featured_product: Option<i64>,
}

impl From<CollectionRequest> for CollectionDraft {
    fn from(req: CollectionRequest) -> Self {
        CollectionDraft {
            title: req.title,
            featured_product_id: req.featured_product,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub id: i64,
    pub title: String,
    pub featured_product: Option<i64>,
    pub products_count: i64,
}

impl From<&Collection> for CollectionResponse {
    fn from(c: &Collection) -> Self {
        CollectionResponse {
            id: c.id,
            title: c.title.clone(),
            featured_product: c.featured_product_id,
            products_count: c.products_count,
        }
    }
}

/// GET /collections
#[utoipa::path(
    get,
    path = "/collections",
    responses(
        (status = 200, description = "Collections with product counts", body = [CollectionResponse]),
    ),
    tag = "collections"
)]
pub async fn list_collections(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let collections = web::block(move || state.catalog.list_collections())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CollectionResponse> = collections.iter().map(CollectionResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /collections/{id}
#[utoipa::path(
    get,
    path = "/collections/{id}",
    params(
        ("id" = i64, Path, description = "Collection id"),
    ),
    responses(
        (status = 200, description = "Collection found", body = CollectionResponse),
        (status = 404, description = "Collection not found"),
    ),
    tag = "collections"
)]
pub async fn get_collection(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let collection_id = path.into_inner();

    let collection = web::block(move || state.catalog.get_collection(collection_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CollectionResponse::from(&collection)))
}

/// POST /collections
#[utoipa::path(
    post,
    path = "/collections",
    request_body = CollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Blank title or unknown featured product"),
    ),
    tag = "collections"
)]
pub async fn create_collection(
    state: web::Data<AppState>,
    body: web::Json<CollectionRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = CollectionDraft::from(body.into_inner());

    let collection = web::block(move || state.catalog.create_collection(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CollectionResponse::from(&collection)))
}

/// PUT /collections/{id}
#[utoipa::path(
    put,
    path = "/collections/{id}",
    params(
        ("id" = i64, Path, description = "Collection id"),
    ),
    request_body = CollectionRequest,
    responses(
        (status = 200, description = "Collection replaced", body = CollectionResponse),
        (status = 400, description = "Blank title or unknown featured product"),
        (status = 404, description = "Collection not found"),
    ),
    tag = "collections"
)]
pub async fn update_collection(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CollectionRequest>,
) -> Result<HttpResponse, AppError> {
    let collection_id = path.into_inner();
    let draft = CollectionDraft::from(body.into_inner());

    let collection = web::block(move || state.catalog.update_collection(collection_id, draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CollectionResponse::from(&collection)))
}

/// DELETE /collections/{id}
///
/// Refused with 405 while the collection still holds products.
#[utoipa::path(
    delete,
    path = "/collections/{id}",
    params(
        ("id" = i64, Path, description = "Collection id"),
    ),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Collection not found"),
        (status = 405, description = "Collection still has products"),
    ),
    tag = "collections"
)]
pub async fn delete_collection(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let collection_id = path.into_inner();

    web::block(move || state.catalog.delete_collection(collection_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
