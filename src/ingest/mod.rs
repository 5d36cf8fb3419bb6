//! Ingestion gateway between the redirect front end and the event store.
//!
//! # Modules
//!
//! - [`protocol`] - Line-oriented request/reply codec and validation
//! - [`server`] - TCP listener applying one event per connection
//! - [`client`] - Notifier used by the front end to emit events

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{ClientError, GatewayClient};
pub use server::{handle_connection, run_gateway};
