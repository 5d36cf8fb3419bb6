//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs use Serde for deserialization and validator for input
//! validation. Built reports are serialized straight from
//! [`crate::domain::report::Report`].

pub mod health;
pub mod report;
