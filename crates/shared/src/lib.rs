//! Shared types, errors, and configuration for Petledger.
//!
//! This crate provides common types used across all other crates:
//! - Money as integer minor currency units
//! - Typed IDs for type-safe entity references
//! - Epoch-millisecond time helpers
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
