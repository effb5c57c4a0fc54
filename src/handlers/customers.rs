use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::customer::{Customer, ProfileUpdate};
use crate::errors::AppError;
use crate::handlers::auth::AuthenticatedUser;
use crate::handlers::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// ISO-8601 date; omit or send null to clear it
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            birth_date: req.birth_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// One of "B" (bronze), "S" (silver), "G" (gold)
    pub membership: String,
    /// ISO-8601 date
    pub birth_date: Option<String>,
}

impl From<&Customer> for CustomerProfileResponse {
    fn from(c: &Customer) -> Self {
        CustomerProfileResponse {
            id: c.id,
            user_id: c.user_id,
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            phone: c.phone.clone(),
            membership: c.membership.code().to_string(),
            birth_date: c.birth_date.map(|d| d.to_string()),
        }
    }
}

/// GET /customers/me
///
/// Returns the profile of the customer behind the authenticated user.
#[utoipa::path(
    get,
    path = "/customers/me",
    params(
        ("X-User-Id" = i64, Header, description = "Authenticated user id"),
    ),
    responses(
        (status = 200, description = "Customer profile", body = CustomerProfileResponse),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "No customer for this user"),
    ),
    tag = "customers"
)]
pub async fn me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let customer = web::block(move || state.customers.get_profile(user.user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CustomerProfileResponse::from(&customer)))
}

/// PUT /customers/me
///
/// Replaces the caller's name, phone and birth date. Membership is not editable.
#[utoipa::path(
    put,
    path = "/customers/me",
    params(
        ("X-User-Id" = i64, Header, description = "Authenticated user id"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = CustomerProfileResponse),
        (status = 400, description = "Blank or overlong field"),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "No customer for this user"),
    ),
    tag = "customers"
)]
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let update = ProfileUpdate::from(body.into_inner());

    let customer = web::block(move || state.customers.update_profile(user.user_id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CustomerProfileResponse::from(&customer)))
}
