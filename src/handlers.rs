use crate::cache::listing_etag;
use crate::config::Config;
use crate::errors::AppError;
use crate::leads::{DeleteConfirmation, LeadOperations};
use crate::models::*;
use crate::notify::{Notification, NotificationLog};
use axum::{
    extract::{FromRequest, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// `Json` body extractor whose rejections use the `AppError` body shape.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead repository operations (store, cache, notifier and scorer).
    pub leads: LeadOperations,
    /// Application configuration.
    pub config: Config,
    /// Recent notifications raised by the operations.
    pub notifications: Arc<NotificationLog>,
}

/// Lead routes without transport middleware.
///
/// `main` adds rate limiting, body limits, tracing and CORS on top.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/leads", get(list_leads).post(create_lead))
        .route("/api/v1/leads/:id", put(update_lead).delete(delete_lead))
        .route("/api/v1/leads/:id/score", post(score_lead))
        .route("/api/v1/notifications", get(list_notifications))
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-desk-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/v1/leads
///
/// Lists all leads, newest first. Responds with an `ETag`; a matching
/// `If-None-Match` yields 304 without a body.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let leads = state.leads.list().await?;
    let etag = listing_etag(&leads);

    let client_etag = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if client_etag == Some(etag.as_str()) {
        tracing::debug!("GET /leads - not modified");
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    tracing::debug!("GET /leads - {} lead(s)", leads.len());
    Ok(([(header::ETAG, etag)], Json(leads.to_vec())).into_response())
}

/// POST /api/v1/leads
///
/// Creates a lead. Status defaults to `new`; a blank company is stored as null.
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    AppJson(input): AppJson<CreateLeadInput>,
) -> Result<(StatusCode, Json<Lead>), AppError> {
    tracing::info!("POST /leads - name: {}", input.name);

    let lead = state.leads.create(&input).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// PUT /api/v1/leads/:id
///
/// Overwrites name, email, company and status of one lead.
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<UpdateLeadInput>,
) -> Result<StatusCode, AppError> {
    tracing::info!("PUT /leads/{}", id);

    state.leads.update(id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/leads/:id?confirm=true
///
/// Deletion is irreversible and refused unless explicitly confirmed.
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /leads/{} - confirmed: {}", id, params.confirm);

    if !params.confirm {
        return Err(AppError::ConfirmationRequired(
            "Deleting a lead is irreversible; repeat the request with confirm=true".to_string(),
        ));
    }

    state.leads.delete(DeleteConfirmation::confirm(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/leads/:id/score
///
/// Scores the lead's current snapshot. The score is not stored.
pub async fn score_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoreResponse>, AppError> {
    tracing::info!("POST /leads/{}/score", id);

    let lead = state.leads.find(id).await?;
    let result = state.leads.score(&lead).await?;
    let band = result.band();

    Ok(Json(ScoreResponse {
        lead_id: result.lead_id,
        score: result.score,
        band,
        guidance: band.guidance().to_string(),
        explanation: result.explanation,
    }))
}

/// GET /api/v1/notifications
///
/// Most recent notifications, oldest first.
pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.recent())
}
