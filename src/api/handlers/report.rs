//! Handlers for building and fetching rollup reports.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::report::ReportRequest;
use crate::domain::report::Report;
use crate::error::AppError;
use crate::state::AppState;

/// Builds a report over all recorded clicks and stores it as the last build.
///
/// # Endpoint
///
/// `POST /report`
///
/// # Request Body
///
/// ```json
/// { "dimensions": ["SourceIP", "TimeInterval"] }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "1.2.3.4": { "sum": 2, "groups": { "10:30": { "sum": 2 } } },
///   "5.6.7.8": { "sum": 1, "groups": { "10:31": { "sum": 1 } } }
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not valid JSON or does not carry
/// 1 to 3 dimension names.
/// Returns 500 Internal Server Error if the report cannot be stored.
pub async fn build_report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<Report>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid JSON payload",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    request.validate()?;

    let report = state
        .report_service
        .build_and_store(&request.dimensions)
        .await?;

    Ok(Json(report))
}

/// Returns the most recently built report without rebuilding it.
///
/// # Endpoint
///
/// `GET /report`
///
/// # Errors
///
/// Returns 404 Not Found if no report has been built yet.
pub async fn last_report_handler(State(state): State<AppState>) -> Result<Json<Report>, AppError> {
    let report = state.report_service.last_report().await?;
    Ok(Json(report))
}
