//! Payment ledger routes

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use humantic_billing::{summarize, LedgerSummary};
use humantic_shared::types::PaymentTracking;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{authorize, AuthUser, Capability};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub plan: String,
    pub phase: String,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub gateway: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<PaymentTracking> for PaymentResponse {
    fn from(record: PaymentTracking) -> Self {
        Self {
            id: record.id,
            plan: record.plan_type,
            phase: record.phase,
            status: record.status,
            amount_cents: record.amount_cents,
            currency: record.currency,
            gateway: record.gateway,
            due_date: record.due_date,
            paid_at: record.paid_at,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPaymentsResponse {
    pub payments: Vec<PaymentResponse>,
    pub summary: LedgerSummary,
}

/// GET /api/payments/user/:user_id
/// Users read their own ledger; reading anyone else's requires the
/// all-payments capability.
pub async fn get_user_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserPaymentsResponse>> {
    if auth.id != user_id {
        authorize(&auth, Capability::ViewAllPayments)?;
    }

    let billing = state.billing()?;
    let records = billing.ledger.list_for_user(user_id).await?;
    let summary = summarize(&records);

    Ok(Json(UserPaymentsResponse {
        payments: records.into_iter().map(PaymentResponse::from).collect(),
        summary,
    }))
}
