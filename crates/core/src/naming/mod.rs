//! Storage name generation.
//!
//! Every stored file is named `<uuid-v4>.<extension>`. The identifier is
//! random and the extension comes from a fixed table keyed by the declared
//! media type, so nothing the client sends about its filename ever reaches
//! the filesystem.

mod extensions;

#[cfg(test)]
mod naming_props;

use std::fmt;

use uuid::Uuid;

pub use extensions::{FALLBACK_EXTENSION, essence, extension_for, extension_or_fallback};

/// Longest extension accepted by [`StorageName::parse`].
const MAX_EXTENSION_LEN: usize = 10;

/// Length of a hyphenated UUID.
const UUID_LEN: usize = 36;

/// A generated file name, safe to use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageName(String);

impl StorageName {
    /// Generates a fresh name for an upload of the given media type.
    ///
    /// Never fails: unknown media types get the fallback extension.
    #[must_use]
    pub fn generate(media_type: &str) -> Self {
        let ext = extension_or_fallback(media_type);
        Self(format!("{}.{ext}", Uuid::new_v4()))
    }

    /// Parses a name previously produced by [`StorageName::generate`].
    ///
    /// Returns `None` for anything else, including dotfiles, staging
    /// files and path traversal attempts.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (id, ext) = name.split_once('.')?;

        let id_ok = id.len() == UUID_LEN
            && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
            && Uuid::try_parse(id).is_ok();
        let ext_ok = (1..=MAX_EXTENSION_LEN).contains(&ext.len())
            && ext
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

        (id_ok && ext_ok).then(|| Self(name.to_string()))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The extension part, without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, ext)| ext)
    }
}

impl fmt::Display for StorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
