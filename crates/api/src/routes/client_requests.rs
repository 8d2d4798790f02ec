//! Client request routes

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use humantic_shared::types::{ClientRequest, RequestStatus};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{authorize, has_capability, AuthUser, Capability};
use crate::error::{ApiError, ApiResult};
use crate::journey::JourneyStage;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequestResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub description: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ClientRequest> for ClientRequestResponse {
    fn from(request: ClientRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            subject: request.subject,
            description: request.description,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// GET /api/client-requests
/// Clients see their own requests; admins see everything.
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<ClientRequestResponse>>> {
    let requests = if has_capability(&auth, Capability::ManageRequests) {
        sqlx::query_as::<_, ClientRequest>(
            "SELECT * FROM client_requests ORDER BY created_at DESC",
        )
        .fetch_all(&state.pool)
        .await?
    } else {
        sqlx::query_as::<_, ClientRequest>(
            "SELECT * FROM client_requests WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(auth.id)
        .fetch_all(&state.pool)
        .await?
    };

    Ok(Json(
        requests.into_iter().map(ClientRequestResponse::from).collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub subject: String,
    pub description: String,
}

/// POST /api/client-requests
pub async fn create_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<Json<ClientRequestResponse>> {
    authorize(&auth, Capability::SubmitRequests)?;

    if body.subject.trim().is_empty() {
        return Err(ApiError::Validation("Subject is required".to_string()));
    }
    if body.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".to_string()));
    }

    let request = sqlx::query_as::<_, ClientRequest>(
        r#"
        INSERT INTO client_requests (id, user_id, subject, description, status)
        VALUES ($1, $2, $3, $4, 'open')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(body.subject.trim())
    .bind(body.description.trim())
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(
        user_id = %auth.id,
        request_id = %request.id,
        "Client request created"
    );

    // Opening a request moves the client into the adjustment stage
    state
        .journey
        .notify(JourneyStage::Ajuste, auth.id, &auth.email)
        .await;

    Ok(Json(request.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatusBody {
    pub status: String,
}

/// PATCH /api/client-requests/:request_id
pub async fn update_request_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatusBody>,
) -> ApiResult<Json<ClientRequestResponse>> {
    authorize(&auth, Capability::ManageRequests)?;

    let status: RequestStatus = body
        .status
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid status: {}", body.status)))?;

    let request = sqlx::query_as::<_, ClientRequest>(
        r#"
        UPDATE client_requests
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(request_id)
    .bind(status.to_string())
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound)?;

    tracing::info!(
        admin_id = %auth.id,
        request_id = %request_id,
        status = %status,
        "Client request status updated"
    );

    // Resolution moves the request owner into the review stage
    if status == RequestStatus::Resolved {
        let owner: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = $1")
            .bind(request.user_id)
            .fetch_optional(&state.pool)
            .await?;
        if let Some((email,)) = owner {
            state
                .journey
                .notify(JourneyStage::Revisao, request.user_id, &email)
                .await;
        }
    }

    Ok(Json(request.into()))
}
