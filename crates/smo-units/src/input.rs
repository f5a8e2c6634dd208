//! Validation of typed numeric input.

use std::sync::LazyLock;

use regex::Regex;

use crate::{UnitsError, UnitsResult};

/// Optional sign, optional integer part, optional point, at least one digit,
/// optional exponent. `"5."` and `"1e"` are rejected.
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$").expect("number pattern is valid")
});

/// Parse the text of a quantity input field.
///
/// Surrounding whitespace is ignored; anything else that does not match the
/// numeric input pattern fails with [`UnitsError::InvalidNumber`].
pub fn parse_display_number(text: &str) -> UnitsResult<f64> {
    let trimmed = text.trim();
    let invalid = || UnitsError::InvalidNumber {
        text: text.to_string(),
    };
    if !NUMBER_PATTERN.is_match(trimmed) {
        return Err(invalid());
    }
    trimmed.parse::<f64>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_exponent_forms() {
        assert_eq!(parse_display_number("42").unwrap(), 42.0);
        assert_eq!(parse_display_number(" -1.5 ").unwrap(), -1.5);
        assert_eq!(parse_display_number("+.25").unwrap(), 0.25);
        assert_eq!(parse_display_number("1.23456e+5").unwrap(), 123_456.0);
        assert_eq!(parse_display_number("1E-3").unwrap(), 0.001);
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "5.", "1e", "abc", "1,5", "NaN", "inf", "1 2", "--1"] {
            assert!(
                matches!(parse_display_number(text), Err(UnitsError::InvalidNumber { .. })),
                "{text:?} should be rejected"
            );
        }
    }
}
