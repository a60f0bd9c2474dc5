//! HTTP endpoint handlers

use crate::error::{ErrorResponse, ScanError};
use crate::report::{render_html, ScanDocument};
use crate::server::types::{ApiResponse, Empty};
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::{error, info};

/// Upstream data problems are the gateway's fault, everything else is ours
fn status_for(err: &ScanError) -> StatusCode {
    match err {
        ScanError::Gateway(_)
        | ScanError::Http(_)
        | ScanError::NoData(_)
        | ScanError::InsufficientData { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ScanError) -> Response {
    error!("Scan failed: {}", err);
    let status = status_for(&err);
    (
        status,
        Json(ApiResponse::<Empty>::error(ErrorResponse::from(err))),
    )
        .into_response()
}

/// Health check endpoint - GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message("BW scanner is running"))
}

/// HTML report - GET /
pub async fn report_page(State(state): State<AppState>) -> Response {
    info!("Scan requested: HTML report");
    match state.scan().await {
        Ok(result) => Html(render_html(&result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// JSON document - GET /api/scan
pub async fn scan_json(State(state): State<AppState>) -> Response {
    info!("Scan requested: JSON document");
    match state.scan().await {
        Ok(result) => Json(ApiResponse::success_with_data(ScanDocument::from(&result))).into_response(),
        Err(e) => error_response(e),
    }
}
