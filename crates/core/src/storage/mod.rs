//! Storage placement for uploaded files.
//!
//! Bytes are streamed into a staging file next to their final location and
//! renamed onto the generated name only once the upload is complete:
//!
//! ```text
//! <dir>/.partial-<uuid>.<ext>   ── write chunks ──┐
//!                                                 │ commit (fsync + rename)
//! <dir>/<uuid>.<ext>            ◄─────────────────┘
//! ```
//!
//! A staging file is removed when its [`PendingFile`] is discarded or
//! dropped, so aborted uploads never become servable.

mod error;
mod placer;

pub use error::StorageError;
pub use placer::{PendingFile, STAGING_PREFIX, StoragePlacer, StoredFile};
