//! DTOs for the report endpoints.

use serde::Deserialize;
use validator::Validate;

/// Request to build a rollup report.
///
/// Dimension names are applied outermost first. Names other than `SourceIP`,
/// `TimeInterval` and `Destination` are accepted and ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    #[serde(alias = "Dimensions")]
    #[validate(length(min = 1, max = 3, message = "Between 1 and 3 dimensions are required"))]
    pub dimensions: Vec<String>,
}
