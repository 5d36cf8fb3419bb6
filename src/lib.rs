//! # Link Analytics
//!
//! Click analytics collector for a URL shortener, built with Axum and Tokio.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Records, dimensions and the rollup builder
//! - **Application Layer** ([`application`]) - Event store and report service
//! - **Infrastructure Layer** ([`infrastructure`]) - JSON file persistence
//! - **Ingestion** ([`ingest`]) - Line-protocol TCP gateway and its client
//! - **API Layer** ([`api`]) - Report query handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Registration and click events over a one-shot TCP protocol
//! - Clicks linked to their destination by URL, unmatched clicks kept as orphans
//! - Full snapshot persistence with atomic file replacement
//! - Nested rollups by source IP, minute of day and destination
//!
//! ## Quick Start
//!
//! ```bash
//! export RECORDS_PATH="data/connections.json"
//! cargo run
//!
//! cargo run --bin admin -- notify click http://example.com abc123 1.2.3.4
//! curl -X POST localhost:8080/report -d '{"dimensions":["SourceIP"]}' \
//!      -H 'content-type: application/json'
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ingest;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, StoreError};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{EventStore, ReportService};
    pub use crate::domain::dimension::Dimension;
    pub use crate::domain::entities::{ChildRecord, ParentRecord, Record};
    pub use crate::domain::report::{Report, ReportNode, build_report};
    pub use crate::error::{AppError, StoreError};
    pub use crate::ingest::GatewayClient;
    pub use crate::state::AppState;
}
