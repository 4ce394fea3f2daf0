//! Property tests for phone normalization and synthetic keys.

use proptest::prelude::*;

use vetmigrate_core::resolver::{is_synthetic, normalize_phone, synthetic_key};

proptest! {
    /// Whatever goes in, the output is `+` followed by at least 10 digits.
    #[test]
    fn normalized_shape(raw in ".{0,32}") {
        if let Some(normalized) = normalize_phone(&raw) {
            prop_assert!(normalized.starts_with('+'));
            let digits = &normalized[1..];
            prop_assert!(digits.len() >= 10);
            prop_assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    /// Normalization is a fixpoint: feeding the canonical form back in
    /// changes nothing.
    #[test]
    fn normalization_is_stable(raw in "[0-9+() -]{0,20}") {
        if let Some(first) = normalize_phone(&raw) {
            prop_assert_eq!(normalize_phone(&first), Some(first));
        }
    }

    /// Formatting noise between the digits never changes the key.
    #[test]
    fn punctuation_is_ignored(digits in "[0-9]{10,12}", seps in "[ ()-]{0,6}") {
        let mut noisy = String::new();
        for (i, c) in digits.chars().enumerate() {
            noisy.push(c);
            if let Some(sep) = seps.chars().nth(i % seps.len().max(1)) {
                noisy.push(sep);
            }
        }
        prop_assert_eq!(normalize_phone(&noisy), normalize_phone(&digits));
    }

    /// Fewer than 10 digits is never a phone.
    #[test]
    fn short_inputs_rejected(digits in "[0-9]{0,9}") {
        prop_assert_eq!(normalize_phone(&digits), None);
    }

    /// Synthetic keys are injective over legacy ids and always flagged.
    #[test]
    fn synthetic_keys_distinct(a in 1i64..1_000_000, b in 1i64..1_000_000) {
        prop_assert!(is_synthetic(&synthetic_key(a)));
        if a != b {
            prop_assert_ne!(synthetic_key(a), synthetic_key(b));
        }
    }
}
