// Web layer - axum routes and the state they share.
//
// Like every adapter, this layer is thin: pull primitives out of the request,
// call a core service, turn the result into JSON.

pub mod api_error;

pub mod auth;

#[path = "routes/route_catalog.rs"]
pub mod routes;

use crate::core::approval::ApprovalService;
use crate::core::contacts::ContactService;
use crate::core::investments::InvestmentService;
use crate::core::moderation::ContentClassifier;
use crate::core::saved_startups::SavedStartupService;
use crate::infra::contacts::SqliteContactStore;
use crate::infra::investments::SqliteInvestmentStore;
use crate::infra::saved_startups::SqliteSavedStartupStore;
use crate::infra::startups::SqliteStartupStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub type Approval = ApprovalService<SqliteStartupStore, Box<dyn ContentClassifier>>;

/// Shared by every handler. Cloned per request, so everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub approval: Arc<Approval>,
    pub contacts: Arc<ContactService<SqliteContactStore>>,
    pub saved_startups: Arc<SavedStartupService<SqliteSavedStartupStore>>,
    pub investments: Arc<InvestmentService<SqliteInvestmentStore>>,
    pub cron_secret: Option<Arc<str>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/cron/activate", get(routes::cron::activate))
        .route("/api/startups", post(routes::startups::submit))
        .route("/api/startups/{id}", get(routes::startups::detail))
        .route(
            "/api/contacts",
            get(routes::contacts::list)
                .post(routes::contacts::add)
                .delete(routes::contacts::remove)
                .patch(routes::contacts::update),
        )
        .route(
            "/api/saved-startups",
            get(routes::saved_startups::status).post(routes::saved_startups::toggle),
        )
        .route("/api/investments", post(routes::investments::invest))
        .with_state(state)
}
