//! Contact identifier normalization.
//!
//! Allow-list membership checks only work if the same canonical form is
//! produced at add, remove, and lookup time, so every path funnels through
//! [`normalize_contact`].

use crate::error::ParrotError;

/// Normalize a phone-style contact identifier to canonical digits-only form.
///
/// Steps, in order:
/// 1. Strip a transport suffix — everything from the first `@` on
///    (e.g. `919876543210@s.whatsapp.net` → `919876543210`).
/// 2. Drop separator characters (spaces, dashes, dots, parentheses).
/// 3. A leading `+` marks the number as already country-coded; strip it.
/// 4. Otherwise strip one leading `0` (trunk prefix), then prefix the
///    default country code when the number is bare (10 digits or fewer).
///
/// Returns `ValidationError` for empty input, non-digit residue, or
/// implausible length.
pub fn normalize_contact(raw: &str, country_code: &str) -> Result<String, ParrotError> {
    let trimmed = raw.trim();
    let without_suffix = trimmed.split('@').next().unwrap_or("");

    let mut has_plus = false;
    let mut digits = String::with_capacity(without_suffix.len());
    for (i, c) in without_suffix.chars().enumerate() {
        match c {
            '+' if i == 0 => has_plus = true,
            ' ' | '-' | '.' | '(' | ')' => {}
            d if d.is_ascii_digit() => digits.push(d),
            other => {
                return Err(ParrotError::Validation(format!(
                    "invalid character '{other}' in contact '{raw}'"
                )))
            }
        }
    }

    if digits.is_empty() {
        return Err(ParrotError::Validation(format!(
            "contact '{raw}' contains no digits"
        )));
    }

    let normalized = if has_plus {
        digits
    } else {
        let bare = digits.strip_prefix('0').unwrap_or(&digits);
        if bare.len() <= 10 {
            format!("{country_code}{bare}")
        } else {
            bare.to_string()
        }
    };

    if !(7..=15).contains(&normalized.len()) {
        return Err(ParrotError::Validation(format!(
            "contact '{raw}' normalizes to implausible length {}",
            normalized.len()
        )));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_number_gets_country_code() {
        assert_eq!(
            normalize_contact("9876543210", "91").unwrap(),
            "919876543210"
        );
    }

    #[test]
    fn test_leading_zero_stripped_before_prefixing() {
        assert_eq!(
            normalize_contact("09876543210", "91").unwrap(),
            "919876543210"
        );
    }

    #[test]
    fn test_plus_form_keeps_own_country_code() {
        assert_eq!(
            normalize_contact("+449876543210", "91").unwrap(),
            "449876543210"
        );
    }

    #[test]
    fn test_transport_suffix_stripped() {
        assert_eq!(
            normalize_contact("919876543210@s.whatsapp.net", "91").unwrap(),
            "919876543210"
        );
        assert_eq!(
            normalize_contact("919876543210@c.us", "91").unwrap(),
            "919876543210"
        );
    }

    #[test]
    fn test_already_prefixed_number_untouched() {
        // 12 digits: already carries a country code, no prefixing.
        assert_eq!(
            normalize_contact("919876543210", "91").unwrap(),
            "919876543210"
        );
    }

    #[test]
    fn test_all_equivalent_forms_agree() {
        let forms = [
            "9876543210",
            "09876543210",
            "+919876543210",
            "919876543210",
            "91 98765 43210",
            "9876543210@s.whatsapp.net",
        ];
        for form in forms {
            assert_eq!(
                normalize_contact(form, "91").unwrap(),
                "919876543210",
                "form '{form}' should normalize to the canonical id"
            );
        }
    }

    #[test]
    fn test_separators_dropped() {
        assert_eq!(
            normalize_contact("(987) 654-3210", "91").unwrap(),
            "919876543210"
        );
    }

    #[test]
    fn test_empty_and_garbage_rejected() {
        assert!(normalize_contact("", "91").is_err());
        assert!(normalize_contact("@s.whatsapp.net", "91").is_err());
        assert!(normalize_contact("call-me-maybe", "91").is_err());
    }

    #[test]
    fn test_implausible_length_rejected() {
        assert!(normalize_contact("12", "91").is_err());
        assert!(normalize_contact("12345678901234567890", "91").is_err());
    }
}
