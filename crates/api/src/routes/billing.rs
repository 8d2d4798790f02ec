//! Billing routes: checkout, upgrade options, and subscription state

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use humantic_billing::{entitlement, CheckoutResponse, Product};
use humantic_shared::types::Gateway;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::{authorize, AuthUser, Capability};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub price_id: String,
    pub plan_name: String,
    pub idempotency_key: Option<String>,
}

/// POST /api/stripe/create-checkout
///
/// Despite the legacy path, this dispatches to whichever gateway the
/// requested product belongs to.
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateCheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    authorize(&auth, Capability::ManageOwnBilling)?;

    // Validate before any side effect
    if req.price_id.trim().is_empty() {
        return Err(ApiError::Validation("priceId is required".to_string()));
    }
    if req.plan_name.trim().is_empty() {
        return Err(ApiError::Validation("planName is required".to_string()));
    }

    let billing = state.billing()?;
    let current_plan = current_plan(&state, &auth).await?;

    let response = billing
        .checkout
        .create_checkout(
            auth.id,
            current_plan,
            req.price_id.trim(),
            req.idempotency_key.as_deref(),
        )
        .await?;

    Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub price_id: String,
    pub name: String,
    pub description: String,
    pub plan: String,
    pub category: String,
    pub gateway: String,
    pub amount_cents: i64,
    pub total_value_cents: Option<i64>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            price_id: product.price_id.to_string(),
            name: product.name.to_string(),
            description: product.description.to_string(),
            plan: product.tier.to_string(),
            category: product.category.to_string(),
            gateway: product.gateway.to_string(),
            amount_cents: product.amount_cents,
            total_value_cents: product.total_value_cents,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    pub gateway: Option<String>,
}

/// GET /api/billing/upgrade-options?gateway=
pub async fn upgrade_options(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<GatewayQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    authorize(&auth, Capability::ManageOwnBilling)?;

    let gateway = parse_gateway(query.gateway.as_deref())?;
    let current_plan = current_plan(&state, &auth).await?;

    let options: Vec<ProductResponse> = entitlement::upgrade_options(current_plan)
        .into_iter()
        .filter(|p| gateway.map_or(true, |g| p.gateway == g))
        .map(ProductResponse::from)
        .collect();

    Ok(Json(options))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub gateway: String,
    pub status: String,
    pub cancel_at_period_end: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub current_period_start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub current_period_end: Option<OffsetDateTime>,
}

/// GET /api/billing/subscription?gateway=
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<GatewayQuery>,
) -> ApiResult<Json<SubscriptionResponse>> {
    authorize(&auth, Capability::ManageOwnBilling)?;

    let gateway = parse_gateway(query.gateway.as_deref())?
        .ok_or_else(|| ApiError::Validation("gateway is required".to_string()))?;

    let billing = state.billing()?;
    let subscription = billing.subscriptions.get_for_user(auth.id, gateway).await?;

    let response = match subscription {
        Some(sub) => SubscriptionResponse {
            gateway: sub.gateway.clone(),
            status: sub.subscription_status().to_string(),
            cancel_at_period_end: sub.cancel_at_period_end,
            current_period_start: sub.current_period_start,
            current_period_end: sub.current_period_end,
        },
        // No mirror row means the subscription never started
        None => SubscriptionResponse {
            gateway: gateway.to_string(),
            status: humantic_shared::types::SubscriptionStatus::NotStarted.to_string(),
            cancel_at_period_end: false,
            current_period_start: None,
            current_period_end: None,
        },
    };

    Ok(Json(response))
}

fn parse_gateway(raw: Option<&str>) -> ApiResult<Option<Gateway>> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .parse::<Gateway>()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("Invalid gateway: {}", s))),
    }
}

/// The caller's current plan tier, tolerating unknown stored values
async fn current_plan(
    state: &AppState,
    auth: &AuthUser,
) -> ApiResult<Option<humantic_shared::types::PlanTier>> {
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT plan FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.pool)
        .await?;

    let (plan,) = row.ok_or(ApiError::NotFound)?;
    Ok(plan
        .as_deref()
        .and_then(humantic_shared::types::PlanTier::parse_lossy))
}
