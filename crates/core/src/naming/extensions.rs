//! Media type to filename extension table.

/// Extension used when a media type has no entry in [`EXTENSIONS`].
pub const FALLBACK_EXTENSION: &str = "dat";

/// Canonical extension for each known media type essence.
const EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/avif", "avif"),
    ("application/pdf", "pdf"),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
    ("application/json", "json"),
    ("application/zip", "zip"),
    ("video/mp4", "mp4"),
    ("audio/mpeg", "mp3"),
];

/// Returns the lowercase essence of a media type, without parameters.
///
/// `"Image/JPEG; charset=binary"` becomes `"image/jpeg"`.
#[must_use]
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Looks up the canonical extension for a media type.
#[must_use]
pub fn extension_for(media_type: &str) -> Option<&'static str> {
    let essence = essence(media_type);
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == essence)
        .map(|(_, ext)| *ext)
}

/// Like [`extension_for`], falling back to [`FALLBACK_EXTENSION`].
#[must_use]
pub fn extension_or_fallback(media_type: &str) -> &'static str {
    extension_for(media_type).unwrap_or(FALLBACK_EXTENSION)
}
