//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Insufficient permissions")]
    Forbidden,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,
    #[error("Resource already exists")]
    Conflict(String),

    // Billing errors
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Billing is not enabled")]
    BillingDisabled,

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),

            // Validation
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            // Resources
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),

            // Billing
            ApiError::GatewayError(msg) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", msg.clone()),
            ApiError::BillingDisabled => {
                (StatusCode::SERVICE_UNAVAILABLE, "BILLING_DISABLED", self.to_string())
            }

            // Internal
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database error".to_string(),
            ),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    // PostgreSQL unique violation
                    if code == "23505" {
                        return ApiError::Conflict("Resource already exists".to_string());
                    }
                }
                ApiError::Database(db_err.to_string())
            }
            _ => ApiError::Database(err.to_string()),
        }
    }
}

#[cfg(feature = "billing")]
impl From<humantic_billing::BillingError> for ApiError {
    fn from(err: humantic_billing::BillingError) -> Self {
        use humantic_billing::BillingError;
        match err {
            BillingError::GatewayApi(msg) => {
                tracing::error!("Gateway error: {}", msg);
                ApiError::GatewayError(msg)
            }
            BillingError::InvalidProduct(id) => {
                ApiError::Validation(format!("Unknown product: {}", id))
            }
            BillingError::InvalidTier(tier) => {
                ApiError::Validation(format!("Invalid plan tier: {}", tier))
            }
            BillingError::UpgradeNotAllowed { from, to } => ApiError::Validation(format!(
                "Plan change from {} to {} is not an upgrade",
                from, to
            )),
            BillingError::PhaseOrderViolation(msg) => ApiError::Conflict(msg),
            BillingError::ImmutableRecord(id) => {
                ApiError::Conflict(format!("Payment {} is already paid", id))
            }
            BillingError::NotFound(_) => ApiError::NotFound,
            BillingError::Database(msg) => ApiError::Database(msg),
            BillingError::Config(msg) => {
                tracing::error!("Billing configuration error: {}", msg);
                ApiError::Internal
            }
            BillingError::Internal(msg) => {
                tracing::error!("Billing internal error: {}", msg);
                ApiError::Internal
            }
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
