// Saved startup routes - bookmark toggling and lookup.

use crate::core::saved_startups::ToggleOutcome;
use crate::web::api_error::ApiError;
use crate::web::auth::{CallerId, MaybeCaller};
use crate::web::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub startup_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleRequest {
    pub startup_id: Option<i64>,
}

/// `GET /api/saved-startups[?startupId=]`
///
/// With a startup id: whether the caller saved it. Without: the caller's
/// whole list. Anonymous callers simply have nothing saved.
pub async fn status(
    State(state): State<AppState>,
    MaybeCaller(user_id): MaybeCaller,
    Query(query): Query<SavedQuery>,
) -> Result<Json<Value>, ApiError> {
    let user_id = match user_id {
        Some(id) => id,
        None => return Ok(Json(json!({ "saved": false }))),
    };

    if let Some(startup_id) = query.startup_id {
        let saved = state.saved_startups.is_saved(user_id, startup_id).await?;
        return Ok(Json(json!({ "saved": saved })));
    }

    let saved: Vec<Value> = state
        .saved_startups
        .list(user_id)
        .await?
        .into_iter()
        .map(|s| json!({ "id": s.id, "startupId": s.startup_id, "createdAt": s.created_at }))
        .collect();
    Ok(Json(json!({ "savedStartups": saved })))
}

/// `POST /api/saved-startups` - save if not saved, unsave otherwise.
pub async fn toggle(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<ToggleRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let startup_id = body
        .startup_id
        .ok_or_else(|| ApiError::bad_request("startupId is required"))?;

    match state.saved_startups.toggle(user_id, startup_id).await? {
        ToggleOutcome::Saved(_) => Ok((
            StatusCode::CREATED,
            Json(json!({ "saved": true, "message": "Startup saved" })),
        )),
        ToggleOutcome::Removed => Ok((
            StatusCode::OK,
            Json(json!({ "saved": false, "message": "Startup unsaved" })),
        )),
    }
}
