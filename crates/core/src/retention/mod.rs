//! Age-based retention for stored files.
//!
//! A [`RetentionSweeper`] periodically lists the storage directory and
//! deletes regular files whose modification time is older than the
//! retention threshold. It runs as a background worker owned by the
//! process and stops when its cancellation token fires.
//!
//! # Modules
//!
//! - `policy` - Retention threshold and sweep interval
//! - `error` - Sweep error types
//! - `sweeper` - Sweep pass and background worker

mod error;
mod policy;
mod sweeper;

pub use error::SweepError;
pub use policy::RetentionPolicy;
pub use sweeper::{RetentionSweeper, SweepReport};
