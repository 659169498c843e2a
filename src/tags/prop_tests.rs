use super::*;
use crate::test_utils::arb_messy_string;
use proptest::prelude::*;

fn is_slug_char(c: char) -> bool {
    c == '-' || (c.is_alphanumeric() && !c.is_ascii_uppercase())
}

proptest! {
    /// Slugs only contain alphanumerics without ASCII capitals and single inner dashes
    #[test]
    fn prop_slugify_output_shape(raw in arb_messy_string()) {
        let slug = slugify(&raw);
        prop_assert!(slug.chars().all(is_slug_char), "bad slug: {:?}", slug);
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    /// Slugifying twice changes nothing
    #[test]
    fn prop_slugify_idempotent(raw in arb_messy_string()) {
        let once = slugify(&raw);
        prop_assert_eq!(slugify(&once), once);
    }

    /// Normalising a produced token again gives the same token
    #[test]
    fn prop_normalize_tag_stable_on_tokens(raw in arb_messy_string()) {
        if let Some(token) = normalize_tag(&raw) {
            prop_assert_eq!(normalize_tag(&token), Some(token.clone()));
        }
    }

    /// Every token has a non-empty key and value around one colon
    #[test]
    fn prop_normalize_tag_token_shape(raw in arb_messy_string()) {
        if let Some(token) = normalize_tag(&raw) {
            let (key, value) = token.split_once(':').unwrap();
            prop_assert!(!key.is_empty());
            prop_assert!(!value.is_empty());
            prop_assert!(!value.contains(':'));
        }
    }

    /// Tokens are unique no matter how repetitive the input is
    #[test]
    fn prop_normalize_tags_unique(words in prop::collection::vec("[A-Za-z -]{0,12}", 0..12)) {
        let vision = VisionExtraction {
            garment_types: words.clone(),
            graphics: words.clone(),
            colors: words,
            ..Default::default()
        };
        let tokens = normalize_tags(&vision);
        let mut deduped = tokens.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), tokens.len());
    }
}
