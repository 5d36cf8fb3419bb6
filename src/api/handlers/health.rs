//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The report file exists but cannot be read
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "records": { "status": "ok", "message": "1 destinations, 3 clicks (0 orphaned)" },
///     "reports": { "status": "ok", "message": "Last build available" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let records_check = check_records(&state).await;
    let reports_check = check_reports(&state).await;

    let all_healthy = records_check.is_ok() && reports_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            records: records_check,
            reports: reports_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Summarizes the in-memory record store.
async fn check_records(state: &AppState) -> CheckStatus {
    let counts = state.event_store.counts().await;
    CheckStatus::ok(format!(
        "{} destinations, {} clicks ({} orphaned)",
        counts.parents, counts.clicks, counts.orphan_clicks
    ))
}

/// Checks that the last build, if any, can be read back.
async fn check_reports(state: &AppState) -> CheckStatus {
    match state.report_service.has_report().await {
        Ok(true) => CheckStatus::ok("Last build available"),
        Ok(false) => CheckStatus::ok("No report built yet"),
        Err(e) => CheckStatus::error(format!("Report store error: {}", e)),
    }
}
