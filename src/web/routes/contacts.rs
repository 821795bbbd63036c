// Contact routes - the signed-in user's address book.

use crate::core::contacts::{AddContact, ContactCategory, ContactUpdate};
use crate::web::api_error::ApiError;
use crate::web::auth::CallerId;
use crate::web::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddContactRequest {
    pub contact_user_id: Option<i64>,
    pub startup_id: Option<i64>,
    pub note: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContactRequest {
    pub id: Option<i64>,
    pub note: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveContactQuery {
    pub id: Option<i64>,
}

/// Empty means "not given".
fn parse_category(raw: Option<String>) -> Result<Option<ContactCategory>, ApiError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::bad_request),
    }
}

/// `GET /api/contacts`
pub async fn list(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<Value>, ApiError> {
    let contacts = state.contacts.list(user_id).await?;
    Ok(Json(json!({ "contacts": contacts })))
}

/// `POST /api/contacts`
pub async fn add(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<AddContactRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let contact_user_id = body
        .contact_user_id
        .ok_or_else(|| ApiError::bad_request("Contact user ID is required"))?;

    let contact = state
        .contacts
        .add(
            user_id,
            AddContact {
                contact_user_id,
                startup_id: body.startup_id,
                note: body.note,
                category: parse_category(body.category)?,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "contact": contact, "message": "Contact saved" })),
    ))
}

/// `DELETE /api/contacts?id=`
pub async fn remove(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Query(query): Query<RemoveContactQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::bad_request("Contact ID is required"))?;

    state.contacts.remove(user_id, id).await?;
    Ok(Json(json!({ "message": "Contact removed" })))
}

/// `PATCH /api/contacts` - only the fields present in the body change.
pub async fn update(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<UpdateContactRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = body
        .id
        .ok_or_else(|| ApiError::bad_request("Contact ID is required"))?;

    let contact = state
        .contacts
        .update(
            user_id,
            id,
            ContactUpdate {
                note: body.note,
                category: parse_category(body.category)?,
            },
        )
        .await?;

    Ok(Json(json!({ "contact": contact, "message": "Contact updated" })))
}
