use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    NotAllowed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transaction failed: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(kind) => AppError::NotFound(kind.to_string()),
            DomainError::InvalidInput { field, reason } => AppError::InvalidInput {
                field: field.to_string(),
                reason,
            },
            DomainError::InvalidState(reason) => AppError::InvalidState(reason),
            DomainError::NotAllowed(reason) => AppError::NotAllowed(reason),
            DomainError::TransactionFailure(msg) => AppError::Unavailable(msg),
            DomainError::Storage(msg) | DomainError::Delivery(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput { .. } | AppError::InvalidState(_) => StatusCode::BAD_REQUEST,
            AppError::NotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(kind) => serde_json::json!({
                "error": self.to_string(),
                "resource": kind,
            }),
            AppError::InvalidInput { field, .. } => serde_json::json!({
                "error": self.to_string(),
                "field": field,
            }),
            AppError::InvalidState(_) | AppError::NotAllowed(_) | AppError::Unauthorized(_) => {
                serde_json::json!({
                    "error": self.to_string()
                })
            }
            AppError::Unavailable(msg) => {
                log::error!("transaction rolled back: {}", msg);
                serde_json::json!({
                    "error": "The request could not be completed, please retry",
                    "retryable": true,
                })
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                serde_json::json!({
                    "error": "Internal server error"
                })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("cart".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_state_and_input_return_400() {
        assert_eq!(
            AppError::InvalidState("cart empty".to_string())
                .error_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        let err = AppError::InvalidInput {
            field: "quantity".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn refused_delete_returns_405_with_reason() {
        let err: AppError = DomainError::NotAllowed(
            "Collection cannot be deleted because it includes one or more products.".to_string(),
        )
        .into();
        assert_eq!(err.error_response().status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            err.to_string(),
            "Collection cannot be deleted because it includes one or more products."
        );
    }

    #[test]
    fn transaction_failure_is_retryable_503() {
        let err: AppError = DomainError::TransactionFailure("deadlock".to_string()).into();
        assert_eq!(err.error_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            AppError::NotFound("cart".to_string()).to_string(),
            "cart not found"
        );
    }

    #[test]
    fn domain_not_found_keeps_resource_kind() {
        let app_err: AppError = DomainError::NotFound("customer").into();
        assert!(matches!(app_err, AppError::NotFound(kind) if kind == "customer"));
    }

    #[test]
    fn domain_storage_maps_to_app_internal() {
        let app_err: AppError = DomainError::Storage("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn domain_invalid_input_keeps_field() {
        let app_err: AppError = DomainError::invalid_input("quantity", "bad value").into();
        assert!(matches!(app_err, AppError::InvalidInput { field, .. } if field == "quantity"));
    }
}
