//! Journey stage routes

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::journey::JourneyStage;
use crate::state::AppState;

/// POST /api/journey/:stage
/// Records a stage transition for the caller and forwards it to the
/// automation webhook.
pub async fn notify_stage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(stage): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let stage: JourneyStage = stage
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid journey stage: {}", stage)))?;

    state.journey.notify(stage, auth.id, &auth.email).await;

    Ok(Json(json!({"stage": stage.to_string(), "notified": true})))
}
