//! API route configuration.

use crate::api::handlers::{build_report_handler, last_report_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Report routes.
///
/// # Endpoints
///
/// - `POST /report` - Build a report for the given dimensions and store it
/// - `GET  /report` - Fetch the last stored build
pub fn report_routes() -> Router<AppState> {
    Router::new().route("/report", get(last_report_handler).post(build_report_handler))
}
