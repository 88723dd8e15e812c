//! Shared configuration and errors for Filedrop.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (server, storage, retention)
//! - The application-wide error taxonomy

pub mod config;
pub mod error;

pub use config::{AppConfig, RetentionConfig, ServerConfig, StorageConfig};
pub use error::{AppError, INTERNAL_ERROR_MESSAGE};
