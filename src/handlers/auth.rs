use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::errors::AppError;

/// Set by the fronting authentication layer once it has verified the caller.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The principal a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(user_from_headers(req))
    }
}

fn user_from_headers(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
    let user_id = raw
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;
    Ok(AuthenticatedUser { user_id })
}
