//! Phone normalization and synthetic identity keys.
//!
//! The legacy store holds phones in every format operators ever typed:
//! `+7 (999) 123-45-67`, `8-999-123-45-67`, `9991234567`, with stray
//! spaces and punctuation. All of those must collapse to one canonical
//! key, because the phone IS the dedup key for person records.
//!
//! Normalization rules, exhaustively:
//! 1. Keep ASCII digits only; drop everything else (including `+`).
//! 2. Fewer than 10 digits: not a usable phone, return `None`.
//! 3. Exactly 11 digits starting with `8`: domestic trunk prefix,
//!    rewrite to country code `7`.
//! 4. Exactly 10 digits: bare subscriber number, prepend `7`.
//! 5. Anything else (11 starting with `7`, or longer international
//!    numbers): keep digits as-is.
//! 6. Emit `+` followed by the canonical digits.

/// Reserved prefix for synthetic identity keys. Real normalized phones
/// always start with `+`, so the two namespaces cannot collide.
pub const SYNTHETIC_PREFIX: &str = "9000";

/// Normalize a raw phone string to a canonical `+<digits>` key.
///
/// Returns `None` when the input has fewer than 10 digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 10 {
        return None;
    }

    let canonical = if digits.len() == 11 && digits.starts_with('8') {
        format!("7{}", &digits[1..])
    } else if digits.len() == 10 {
        format!("7{digits}")
    } else {
        digits
    };

    Some(format!("+{canonical}"))
}

/// Build a synthetic identity key for a record with no usable phone.
///
/// A pure function of the legacy id (reserved prefix + zero-padded id),
/// so the key is unique per record and stable across re-runs.
pub fn synthetic_key(legacy_id: i64) -> String {
    format!("{SYNTHETIC_PREFIX}{legacy_id:06}")
}

/// Whether an identity key was synthesized rather than normalized from a
/// real phone.
pub fn is_synthetic(key: &str) -> bool {
    key.starts_with(SYNTHETIC_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_variants_collapse() {
        let expected = Some("+79991234567".to_string());
        assert_eq!(normalize_phone("+79991234567"), expected);
        assert_eq!(normalize_phone("89991234567"), expected);
        assert_eq!(normalize_phone("9991234567"), expected);
        assert_eq!(normalize_phone("+7 (999) 123-45-67"), expected);
        assert_eq!(normalize_phone("8-999-123-45-67"), expected);
        assert_eq!(normalize_phone(" 8 999 123 45 67 "), expected);
    }

    #[test]
    fn test_too_short_rejected() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("123456"), None);
        assert_eq!(normalize_phone("+7 999 123"), None);
        assert_eq!(normalize_phone("not a phone"), None);
    }

    #[test]
    fn test_international_passthrough() {
        // Longer foreign numbers keep their digits untouched
        assert_eq!(
            normalize_phone("+420 601 123 456"),
            Some("+420601123456".to_string())
        );
    }

    #[test]
    fn test_eleven_digits_starting_with_seven() {
        assert_eq!(
            normalize_phone("79991234567"),
            Some("+79991234567".to_string())
        );
    }

    #[test]
    fn test_synthetic_key_stable_and_padded() {
        assert_eq!(synthetic_key(123), "9000000123");
        assert_eq!(synthetic_key(123), synthetic_key(123));
        assert_eq!(synthetic_key(987654), "9000987654");
        // Ids wider than the pad stay unique
        assert_eq!(synthetic_key(12345678), "900012345678");
    }

    #[test]
    fn test_synthetic_keys_distinct_per_id() {
        assert_ne!(synthetic_key(1), synthetic_key(2));
    }

    #[test]
    fn test_is_synthetic() {
        assert!(is_synthetic(&synthetic_key(5)));
        assert!(!is_synthetic("+79991234567"));
    }
}
