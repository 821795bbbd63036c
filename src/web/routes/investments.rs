// Investment route.

use crate::web::api_error::ApiError;
use crate::web::auth::CallerId;
use crate::web::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestRequest {
    pub startup_id: Option<i64>,
    pub amount: Option<i64>,
}

/// `POST /api/investments`
pub async fn invest(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(body): Json<InvestRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let startup_id = body
        .startup_id
        .ok_or_else(|| ApiError::bad_request("startupId is required"))?;
    let amount = body
        .amount
        .ok_or_else(|| ApiError::bad_request("amount is required"))?;

    let investment = state
        .investments
        .invest(user_id, startup_id, amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "investment": investment, "message": "Investment recorded" })),
    ))
}

#[cfg(test)]
mod tests {
    use crate::core::approval::StartupStore;
    use crate::infra::startups::sqlite_startup_store::tests::insert_startup;
    use crate::infra::startups::SqliteStartupStore;
    use crate::web::tests::{request, send, test_app};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_invest_in_approved_startup() {
        let (_dir, db, app) = test_app("{\"score\": 90}").await;
        let store = SqliteStartupStore::new(Arc::clone(&db));
        let now = Utc::now();
        let id = insert_startup(&store, now - Duration::hours(1), 90).await;

        // Still pending.
        let body = json!({ "startupId": id, "amount": 1000 });
        let (status, err) =
            send(&app, request("POST", "/api/investments", Some(3), Some(body.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "This startup is not accepting investments");

        store
            .approve_eligible(now - Duration::minutes(30), 61, now)
            .await
            .unwrap();

        let (status, created) =
            send(&app, request("POST", "/api/investments", Some(3), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["investment"]["amount"], 1000);
        assert_eq!(created["investment"]["investorId"], 3);

        let startup = store.get(id).await.unwrap().unwrap();
        assert_eq!(startup.funding_raised, 1000);
        assert_eq!(startup.investor_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_investments() {
        let (_dir, db, app) = test_app("{\"score\": 90}").await;
        let store = SqliteStartupStore::new(Arc::clone(&db));
        let now = Utc::now();
        // Goal 100K, minimum 500.
        let id = insert_startup(&store, now - Duration::hours(1), 90).await;
        store
            .approve_eligible(now - Duration::minutes(30), 61, now)
            .await
            .unwrap();

        let cases = [
            (json!({ "amount": 1000 }), StatusCode::BAD_REQUEST),
            (json!({ "startupId": id }), StatusCode::BAD_REQUEST),
            (json!({ "startupId": id, "amount": -5 }), StatusCode::BAD_REQUEST),
            (json!({ "startupId": id, "amount": 100 }), StatusCode::BAD_REQUEST),
            (json!({ "startupId": id, "amount": 200000 }), StatusCode::BAD_REQUEST),
            (json!({ "startupId": id + 1, "amount": 1000 }), StatusCode::NOT_FOUND),
        ];
        for (body, expected) in cases {
            let (status, _) =
                send(&app, request("POST", "/api/investments", Some(3), Some(body))).await;
            assert_eq!(status, expected);
        }

        let body = json!({ "startupId": id, "amount": 1000 });
        let (status, _) = send(&app, request("POST", "/api/investments", None, Some(body))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(store.get(id).await.unwrap().unwrap().funding_raised, 0);
    }
}
