//! Property-based tests for the upload policy.

use proptest::prelude::*;

use super::error::UploadError;
use super::policy::UploadPolicy;

// Property: only whitelisted media types are accepted.
proptest! {
    #[test]
    fn prop_mime_type_validation(media_type in "[a-z]+/[a-z0-9+.-]+") {
        let policy = UploadPolicy::default();
        let allowed = ["image/jpeg", "image/png", "image/gif"].contains(&media_type.as_str());

        let result = policy.check_media_type(&media_type);
        if allowed {
            prop_assert!(result.is_ok());
        } else {
            let unsupported = matches!(result, Err(UploadError::UnsupportedType { .. }));
            prop_assert!(unsupported, "Expected UnsupportedType error");
        }
    }
}

// Property: sizes over the limit by at least one byte are rejected.
proptest! {
    #[test]
    fn prop_file_size_validation(
        max_size in 1u64..20_000_000,
        file_size in 0u64..40_000_000,
    ) {
        let policy = UploadPolicy::new(["image/png"], max_size, 1);
        let result = policy.check_size(file_size);

        if file_size <= max_size {
            prop_assert!(result.is_ok());
        } else {
            let too_large = matches!(result, Err(UploadError::FileTooLarge { max }) if max == max_size);
            prop_assert!(too_large, "Expected FileTooLarge error");
        }
    }
}

// Property: an unsupported type always wins over size and count.
proptest! {
    #[test]
    fn prop_type_rule_has_priority(size in any::<u64>(), count in any::<usize>()) {
        let policy = UploadPolicy::default();
        let unsupported = matches!(
            policy.check("application/pdf", size, count),
            Err(UploadError::UnsupportedType { .. })
        );
        prop_assert!(unsupported);
    }
}
