//! Upload and retention pipeline for Filedrop.
//!
//! This crate contains the service logic with ZERO web dependencies.
//! The HTTP layer drives it and renders its results.
//!
//! # Modules
//!
//! - `naming` - Collision-resistant storage names from media types
//! - `upload` - Upload policy and the validate/name/place pipeline
//! - `storage` - Staged writes into the storage directory
//! - `retention` - Periodic age-based cleanup

pub mod naming;
pub mod retention;
pub mod storage;
pub mod upload;
