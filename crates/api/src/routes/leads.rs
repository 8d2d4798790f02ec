//! Lead capture routes (public, used by marketing site forms)

use axum::{extract::State, Json};
use humantic_shared::types::Lead;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::journey::JourneyStage;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: String,
    pub agent_type: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            email: lead.email,
            name: lead.name,
            source: lead.source,
            agent_type: lead.agent_type,
            created_at: lead.created_at,
        }
    }
}

fn validate_email(email: &str) -> ApiResult<&str> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    Ok(email)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

/// POST /api/leads/with-email
pub async fn create_lead_with_email(
    State(state): State<AppState>,
    Json(req): Json<CreateLeadRequest>,
) -> ApiResult<Json<LeadResponse>> {
    let email = validate_email(&req.email)?;
    let source = req.source.as_deref().unwrap_or("website");

    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (id, email, name, source)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(&req.name)
    .bind(source)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(lead_id = %lead.id, source = %source, "Lead captured");

    // New leads enter the journey at the first stage
    state
        .journey
        .notify(JourneyStage::Entrada, lead.id, &lead.email)
        .await;

    Ok(Json(lead.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCustomizationRequest {
    pub email: String,
    pub agent_type: Option<String>,
}

/// POST /api/agent-customization/email-only
pub async fn capture_agent_customization(
    State(state): State<AppState>,
    Json(req): Json<AgentCustomizationRequest>,
) -> ApiResult<Json<LeadResponse>> {
    let email = validate_email(&req.email)?;

    let lead = sqlx::query_as::<_, Lead>(
        r#"
        INSERT INTO leads (id, email, source, agent_type)
        VALUES ($1, $2, 'agent-customization', $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(&req.agent_type)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(lead_id = %lead.id, "Agent customization lead captured");

    state
        .journey
        .notify(JourneyStage::Entrada, lead.id, &lead.email)
        .await;

    Ok(Json(lead.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert_eq!(validate_email("  user@example.com  ").unwrap(), "user@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("not-an-email").is_err());
    }
}
