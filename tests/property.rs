//! Property-based tests
//!
//! Use proptest to check the validation rules every message, draft and
//! signup goes through on both sides of the wire.

use proptest::prelude::*;

use parley::client::RetryPolicy;
use parley::shared::auth::is_valid_email;
use parley::shared::media::{parse_image_data_uri, ImageAttachment};
use parley::shared::{MessageDraft, SendMessageRequest};

proptest! {
    #[test]
    fn test_blank_text_never_validates(text in "[ \\t\\n]*") {
        prop_assert!(MessageDraft::text(text.clone()).to_request().is_err());
        let request = SendMessageRequest { text: Some(text), image: None };
        prop_assert!(request.normalized().is_err());
    }

    #[test]
    fn test_normalized_text_is_trimmed(text in "\\PC*") {
        let request = SendMessageRequest { text: Some(text.clone()), image: None };
        match request.normalized() {
            Ok(normalized) => {
                let kept = normalized.text.expect("text survives");
                prop_assert_eq!(kept.as_str(), text.trim());
                prop_assert!(!kept.is_empty());
            }
            Err(_) => prop_assert!(text.trim().is_empty()),
        }
    }

    #[test]
    fn test_image_drafts_encode_to_valid_data_uris(
        bytes in proptest::collection::vec(any::<u8>(), 1..512),
        subtype in "(png|jpeg|gif|webp)",
    ) {
        let content_type = format!("image/{}", subtype);
        let image = ImageAttachment::new(content_type.clone(), bytes.clone()).unwrap();
        let request = MessageDraft::image(image).to_request().unwrap();
        let uri = request.image.expect("image kept");
        let info = parse_image_data_uri(&uri).unwrap();
        prop_assert_eq!(info.content_type, content_type);
        prop_assert_eq!(info.size, bytes.len());
    }

    #[test]
    fn test_emails_without_at_are_rejected(local in "[a-z0-9.]{1,20}") {
        prop_assert!(!is_valid_email(&local));
        let with_domain = format!("{}@example.com", local);
        prop_assert!(is_valid_email(&with_domain));
    }

    #[test]
    fn test_backoff_doubles(attempt in 0u32..7, base_ms in 1u64..2000) {
        let policy = RetryPolicy::new(8, std::time::Duration::from_millis(base_ms));
        let next = policy.delay_for(attempt + 1);
        prop_assert_eq!(next, policy.delay_for(attempt) * 2);
    }
}
