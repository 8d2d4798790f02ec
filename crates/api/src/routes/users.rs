//! User administration routes

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use humantic_shared::types::{PlanTier, User, UserRole};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{authorize, AuthUser, Capability};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub plan: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            plan: user.plan,
            created_at: user.created_at,
        }
    }
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    authorize(&auth, Capability::ManageUsers)?;

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub plan: Option<String>,
}

/// PATCH /api/users/:user_id
/// Users may update their own profile fields; role and plan changes require
/// the user-management capability.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let self_update = auth.id == user_id;
    if !self_update || req.role.is_some() || req.plan.is_some() {
        authorize(&auth, Capability::ManageUsers)?;
    }

    // Validate before touching the database
    if let Some(role) = &req.role {
        role.parse::<UserRole>()
            .map_err(|_| ApiError::Validation(format!("Invalid role: {}", role)))?;
    }
    if let Some(plan) = &req.plan {
        plan.parse::<PlanTier>()
            .map_err(|_| ApiError::Validation(format!("Invalid plan: {}", plan)))?;
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            role = COALESCE($3, role),
            plan = COALESCE($4, plan),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.role)
    .bind(&req.plan)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound)?;

    tracing::info!(
        actor_id = %auth.id,
        user_id = %user_id,
        "User updated"
    );

    Ok(Json(user.into()))
}

/// Guard against an admin removing their own account
fn ensure_not_self(auth_id: Uuid, target_id: Uuid) -> ApiResult<()> {
    if auth_id == target_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }
    Ok(())
}

/// DELETE /api/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    authorize(&auth, Capability::ManageUsers)?;
    ensure_not_self(auth.id, user_id)?;

    let deleted: Option<(Uuid,)> = sqlx::query_as("DELETE FROM users WHERE id = $1 RETURNING id")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;

    if deleted.is_none() {
        return Err(ApiError::NotFound);
    }

    tracing::info!(
        admin_id = %auth.id,
        user_id = %user_id,
        "User deleted"
    );

    Ok(Json(json!({"deleted": user_id})))
}
