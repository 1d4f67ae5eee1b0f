//! REST API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::error::PlannerError;
use crate::types::{ProjectInput, ProjectPlan, UsageMetrics};

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let detail = match self {
            PlannerError::Config(msg)
            | PlannerError::Validation(msg)
            | PlannerError::Pipeline(msg) => msg,
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Greeting response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Root endpoint
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, World!".to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>, PlannerError> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Successful plan response: the plan fields at top level plus token usage
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: ProjectPlan,
    pub token_usage: UsageMetrics,
}

/// Run the planning crew for a project
pub async fn plan_project(
    State(state): State<AppState>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<Json<PlanResponse>, PlannerError> {
    let Json(input) = payload.map_err(|e| PlannerError::Validation(e.body_text()))?;

    tracing::info!(
        project_type = %input.project_type,
        industry = %input.industry,
        "Planning project"
    );

    match state.runner.run(&input).await {
        Ok(output) => Ok(Json(PlanResponse {
            plan: output.plan,
            token_usage: output.usage,
        })),
        Err(e) => {
            tracing::error!("Error during project planning: {}", e);
            Err(e)
        }
    }
}
