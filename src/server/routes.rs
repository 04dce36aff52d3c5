//! HTTP handlers for the analysis operations.
//!
//! All payloads are JSON. Input defects degrade to empty results; only an
//! invalid repo path is a client error (400). Engine state lives in the
//! shared `AppState`.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::analysis::Symbol;
use crate::engine::OpenBuffer;
use crate::graph::GraphData;
use crate::rules::Diagnostic;
use crate::Error;

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidRepoPath(_) => StatusCode::BAD_REQUEST,
        Error::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn error_response(err: Error) -> (StatusCode, Json<ErrorBody>) {
    (
        status_for(&err),
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
    pub file_path: String,
    pub repo_path: String,
    #[serde(default)]
    pub open_buffers: Vec<OpenBufferPayload>,
}

#[derive(Deserialize)]
pub struct OpenBufferPayload {
    pub content: String,
    pub file_path: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub file: String,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorBody>)> {
    let open_buffers: Vec<OpenBuffer> = req
        .open_buffers
        .into_iter()
        .map(|b| OpenBuffer {
            content: b.content,
            file_path: b.file_path,
        })
        .collect();

    let diagnostics = state
        .engine
        .analyze(
            &req.content,
            &req.file_path,
            Path::new(&req.repo_path),
            &open_buffers,
        )
        .map_err(error_response)?;

    Ok(Json(AnalyzeResponse {
        diagnostics,
        file: req.file_path,
    }))
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub repo_path: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub symbol_count: usize,
    pub repo_path: String,
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, (StatusCode, Json<ErrorBody>)> {
    let symbol_count = state
        .engine
        .refresh(Path::new(&req.repo_path))
        .map_err(error_response)?;
    Ok(Json(RefreshResponse {
        symbol_count,
        repo_path: req.repo_path,
    }))
}

#[derive(Deserialize)]
pub struct RepoQuery {
    pub repo_path: String,
}

#[derive(Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<Symbol>,
}

pub async fn symbols(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RepoQuery>,
) -> Result<Json<SymbolsResponse>, (StatusCode, Json<ErrorBody>)> {
    let symbols = state
        .engine
        .symbols(Path::new(&q.repo_path))
        .map_err(error_response)?;
    Ok(Json(SymbolsResponse { symbols }))
}

pub async fn graph(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RepoQuery>,
) -> Result<Json<GraphData>, (StatusCode, Json<ErrorBody>)> {
    let graph = state
        .engine
        .graph(Path::new(&q.repo_path))
        .map_err(error_response)?;
    Ok(Json(graph))
}

#[derive(Deserialize)]
pub struct SaveDiagnosticsRequest {
    pub repo_path: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
pub struct SaveDiagnosticsResponse {
    pub saved: usize,
}

pub async fn save_diagnostics(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveDiagnosticsRequest>,
) -> Result<Json<SaveDiagnosticsResponse>, (StatusCode, Json<ErrorBody>)> {
    let saved = state
        .engine
        .save_diagnostics(Path::new(&req.repo_path), &req.diagnostics)
        .map_err(error_response)?;
    Ok(Json(SaveDiagnosticsResponse { saved }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
