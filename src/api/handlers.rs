//! API request handlers
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::AnswerResponse;
use crate::api::types::ApiResponse;
use crate::api::types::ErrorDetail;
use crate::api::types::HealthResponse;
use crate::api::types::QueryRequest;
use crate::api::types::StoreResponse;
use crate::errors::RagError;
use crate::service::RagService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RagService>,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn status_for(error: &RagError) -> StatusCode {
    match error {
        RagError::Validation(_) => StatusCode::BAD_REQUEST,
        RagError::Collaborator { .. } | RagError::Transport { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure<T>(error: &RagError) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        status_for(error),
        Json(ApiResponse::error(ErrorDetail::from(error))),
    )
}

/// Unreadable or incomplete bodies are validation failures like an empty query
fn query_text(payload: Result<Json<QueryRequest>, JsonRejection>) -> Result<String, RagError> {
    payload
        .map(|Json(req)| req.query)
        .map_err(|e| RagError::Validation(format!("invalid request body: {}", e.body_text())))
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Answer a question (POST /api/query)
pub async fn answer_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> HandlerResult<AnswerResponse> {
    info!("POST /api/query");
    let query = query_text(payload).map_err(|e| failure(&e))?;

    match state.service.answer_query(&query).await {
        Ok(answer) => Ok(Json(ApiResponse::success(AnswerResponse {
            answer: answer.answer,
            contexts: answer.contexts,
        }))),
        Err(e) => {
            error!("Error answering query: {}", e);
            Err(failure(&e))
        }
    }
}

/// Store query text as a vector (POST /api/store)
pub async fn store_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> HandlerResult<StoreResponse> {
    info!("POST /api/store");
    let query = query_text(payload).map_err(|e| failure(&e))?;

    match state.service.store_query(&query).await {
        Ok(ack) => Ok(Json(ApiResponse::success(StoreResponse {
            id: ack.id,
            namespace: ack.namespace,
        }))),
        Err(e) => {
            error!("Error storing query: {}", e);
            Err(failure(&e))
        }
    }
}
