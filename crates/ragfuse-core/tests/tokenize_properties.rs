use proptest::prelude::*;
use ragfuse_core::tokenize::tokenize;

proptest! {
    #[test]
    fn tokens_are_lowercase_ascii_words(s in ".{0,200}") {
        for token in tokenize(&s) {
            prop_assert!(!token.is_empty());
            prop_assert!(token.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn tokenize_is_deterministic(s in ".{0,200}") {
        prop_assert_eq!(tokenize(&s), tokenize(&s));
    }

    #[test]
    fn case_does_not_matter_for_ascii(s in "[A-Za-z0-9 ,.!]{0,100}") {
        prop_assert_eq!(tokenize(&s), tokenize(&s.to_ascii_uppercase()));
    }
}
