//! Property-based tests for storage name generation.

use std::collections::HashSet;

use proptest::prelude::*;

use super::{FALLBACK_EXTENSION, StorageName, extension_for};

// Property: names are unique across a large batch.
#[test]
fn prop_ten_thousand_names_are_distinct() {
    const N: usize = 10_000;

    let names: HashSet<StorageName> = (0..N)
        .map(|_| StorageName::generate("image/jpeg"))
        .collect();

    assert_eq!(names.len(), N);
}

// Property: whatever the client declares, the generated name is a single
// safe path component that round-trips through `parse`.
proptest! {
    #[test]
    fn prop_generated_name_is_safe(media_type in ".*") {
        let name = StorageName::generate(&media_type);
        let s = name.as_str();

        prop_assert!(!s.contains('/'));
        prop_assert!(!s.contains('\\'));
        prop_assert!(!s.contains(".."));
        prop_assert!(!s.starts_with('.'));
        prop_assert_eq!(StorageName::parse(s), Some(name.clone()));
    }
}

// Property: the extension is the mapped one, or the fallback.
proptest! {
    #[test]
    fn prop_extension_matches_table(media_type in "[a-z]{1,12}/[a-z0-9+.-]{1,20}") {
        let name = StorageName::generate(&media_type);
        let expected = extension_for(&media_type).unwrap_or(FALLBACK_EXTENSION);
        prop_assert_eq!(name.extension(), expected);
    }
}
