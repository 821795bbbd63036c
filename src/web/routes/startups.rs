// Startup submission and detail routes.

use crate::core::approval::Submission;
use crate::core::moderation::StartupContent;
use crate::web::api_error::ApiError;
use crate::web::auth::CallerId;
use crate::web::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitStartupRequest {
    pub name: String,
    pub tagline: String,
    pub logo: String,
    pub industry: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub value_proposition: Option<String>,
    pub business_model: Option<String>,
    pub funding_goal: i64,
    pub minimum_investment: i64,
}

impl From<SubmitStartupRequest> for Submission {
    fn from(req: SubmitStartupRequest) -> Self {
        Submission {
            content: StartupContent {
                name: req.name,
                tagline: req.tagline,
                problem: req.problem,
                solution: req.solution,
                value_proposition: req.value_proposition,
                business_model: req.business_model,
                industry: req.industry,
            },
            logo: req.logo,
            funding_goal: req.funding_goal,
            minimum_investment: req.minimum_investment,
        }
    }
}

/// `POST /api/startups` - moderate and store a new listing as pending.
pub async fn submit(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<SubmitStartupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (startup, moderation) = state.approval.submit(user_id, body.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": startup.id,
            "status": startup.status,
            "moderation": moderation,
        })),
    ))
}

/// `GET /api/startups/{id}`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let startup = state
        .approval
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Startup not found".to_string()))?;

    Ok(Json(json!({ "startup": startup })))
}
