//! Infrastructure layer for external integrations.
//!
//! Implements the storage interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - JSON file repositories

pub mod persistence;
