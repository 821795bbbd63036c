// Scheduled trigger for the approval sweep.
//
// The scheduler calls `GET /api/cron/activate` with the shared secret; the
// handler runs one sweep and reports how many listings went live.

use crate::web::api_error::ApiError;
use crate::web::auth::authorize_cron;
use crate::web::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub async fn activate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    if !authorize_cron(&headers, state.cron_secret.as_deref()) {
        tracing::warn!("Rejected cron trigger with missing or invalid secret");
        return Err(ApiError::Unauthorized);
    }

    let now = Utc::now();
    let approved = state.approval.sweep_at(now).await.map_err(|e| {
        tracing::error!("Cron job failed: {}", e);
        ApiError::Internal("Cron job failed")
    })?;

    Ok(Json(json!({
        "success": true,
        "approved": approved,
        "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })))
}
