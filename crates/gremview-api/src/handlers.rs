//! HTTP request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gremview_core::config::PROJECT_NAME;
use gremview_query::QueryRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy`.
    pub status: String,
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
}

/// Connection test response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// `connected` or `error`.
    pub status: String,
    /// Success message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: PROJECT_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/query`
///
/// The pipeline runs in its own task. Dropping this handler (the client
/// went away) cancels the task's token, which closes the primary session.
pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;

    if request.is_edge_properties() {
        let response = state
            .pipeline
            .edge_properties(&request)
            .await
            .map_err(ApiError::flatten)?;
        return Ok(Json(response).into_response());
    }

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let pipeline = Arc::clone(&state.pipeline);
    let task = tokio::spawn(async move { pipeline.run(&request, cancel).await });

    let response = task
        .await
        .map_err(|e| ApiError::Internal(format!("Query task failed: {e}")))??;
    Ok(Json(response).into_response())
}

/// `POST /api/test-connection`
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let endpoint = request.endpoint(&state.config().backend)?;

    let response = match state.pipeline.test_connection(&endpoint).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ConnectionStatus {
                status: "connected".to_string(),
                message: Some("Connection successful".to_string()),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(endpoint = %endpoint, error = %e, "Connection test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectionStatus {
                    status: "error".to_string(),
                    message: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    };
    Ok(response.into_response())
}

/// Fallback for unsupported methods on the API routes.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
