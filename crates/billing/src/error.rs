//! Billing error types

use thiserror::Error;
use uuid::Uuid;

/// Billing-specific errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Gateway API error: {0}")]
    GatewayApi(String),

    #[error("Unknown product: {0}")]
    InvalidProduct(String),

    #[error("Invalid plan tier: {0}")]
    InvalidTier(String),

    #[error("Plan change from {from} to {to} is not an upgrade")]
    UpgradeNotAllowed { from: String, to: String },

    #[error("Phase 2 payment requires a paid phase 1 for the same activation: {0}")]
    PhaseOrderViolation(String),

    #[error("Payment record {0} is already paid and cannot be modified")]
    ImmutableRecord(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<stripe::StripeError> for BillingError {
    fn from(err: stripe::StripeError) -> Self {
        BillingError::GatewayApi(err.to_string())
    }
}

impl From<sqlx::Error> for BillingError {
    fn from(err: sqlx::Error) -> Self {
        BillingError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        BillingError::GatewayApi(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
