// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Each `/v1` handler is a thin wrapper around one [`JobService`] call;
//! [`ApiError`] maps [`GazetteError`] onto status codes.
//!
//! [`JobService`]: gazette_jobs::JobService

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use gazette_core::{GazetteError, JobId, TopicDefinition};
use gazette_jobs::{Notice, SendRequest, StatusReport};

use crate::server::GatewayState;

/// Request body for POST /v1/jobs.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    /// Topic slugs to generate. Unknown slugs are ignored.
    pub topics: Vec<String>,
}

/// Response body for POST /v1/jobs.
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: JobId,
}

/// Request body for POST /v1/jobs/{id}/review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub confirmed: bool,
}

/// Response body for POST /v1/jobs/{id}/email.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub notice: Notice,
    pub status: StatusReport,
}

/// Response body for GET /v1/topics.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub topics: Vec<TopicDefinition>,
    pub groups: Vec<String>,
    pub default_subject: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_jobs: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`GazetteError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub GazetteError);

impl From<GazetteError> for ApiError {
    fn from(err: GazetteError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GazetteError::JobNotFound { .. } => StatusCode::NOT_FOUND,
            GazetteError::ArtifactMissing { .. } => StatusCode::GONE,
            GazetteError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            GazetteError::NotReady { .. } => StatusCode::CONFLICT,
            GazetteError::Email { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// GET /health
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        active_jobs: state.service.registry().active_count(),
    })
}

/// GET /metrics
///
/// Prometheus text format, or 404 when no exporter is installed.
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /v1/topics
pub async fn get_topics(State(state): State<GatewayState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        topics: state.service.topics().to_vec(),
        groups: state.service.recipient_groups(),
        default_subject: state.service.default_subject(),
    })
}

/// POST /v1/jobs
pub async fn post_jobs(
    State(state): State<GatewayState>,
    Json(body): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<CreateJobResponse>)> {
    let job_id = state.service.create_job(&body.topics)?;
    Ok((StatusCode::ACCEPTED, Json(CreateJobResponse { job_id })))
}

/// GET /v1/jobs/{id}
pub async fn get_job(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusReport>> {
    Ok(Json(state.service.get_status(&JobId::from(id.as_str()))?))
}

/// POST /v1/jobs/{id}/review
pub async fn post_review(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<ReviewRequest>,
) -> ApiResult<Json<StatusReport>> {
    let id = JobId::from(id.as_str());
    state.service.set_review_confirmed(&id, body.confirmed)?;
    Ok(Json(state.service.get_status(&id)?))
}

/// POST /v1/jobs/{id}/approve
pub async fn post_approve(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusReport>> {
    let id = JobId::from(id.as_str());
    state.service.approve(&id)?;
    Ok(Json(state.service.get_status(&id)?))
}

/// POST /v1/jobs/{id}/email
///
/// Blocked and failed sends still answer 200; the notice says what happened.
pub async fn post_email(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Option<Json<SendRequest>>,
) -> ApiResult<Json<EmailResponse>> {
    let id = JobId::from(id.as_str());
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let notice = state.service.send_email(&id, request).await?;
    let status = state.service.get_status(&id)?;
    Ok(Json(EmailResponse { notice, status }))
}

/// GET /v1/jobs/{id}/download
pub async fn get_download(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let artifact = state.service.download(&JobId::from(id.as_str())).await?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
