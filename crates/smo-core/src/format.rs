//! Display formatting for engineering values.
//!
//! Every number shown next to a unit goes through [`format_number`] so that
//! input fields, converter rows and result tables agree on precision.

use crate::Real;

/// Magnitudes below this collapse to `"0"`.
pub const ZERO_BELOW: Real = 1e-80;
/// Magnitudes above this are written in exponential form.
pub const EXPONENTIAL_ABOVE: Real = 1e5;
/// Magnitudes below this (and above [`ZERO_BELOW`]) are written in exponential form.
pub const EXPONENTIAL_BELOW: Real = 1e-3;
/// Significant digits kept in plain decimal form.
pub const SIGNIFICANT_DIGITS: i32 = 6;
/// Fractional mantissa digits in exponential form.
pub const EXPONENT_DIGITS: usize = 5;

/// Format a number for display.
///
/// - `0` and anything with `|n| < 1e-80` gives `"0"`
/// - `|n| > 1e5` or `|n| < 1e-3` gives `d.ddddde±x` (e.g. `1.23456e+5`)
/// - everything else is rounded to 6 significant digits and printed as a
///   plain decimal (`123.456789` gives `"123.457"`)
///
/// The sign rides along with the value; negative numbers follow the same rules.
pub fn format_number(n: Real) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = n.abs();
    if n == 0.0 || magnitude < ZERO_BELOW {
        return "0".to_string();
    }
    if magnitude > EXPONENTIAL_ABOVE || magnitude < EXPONENTIAL_BELOW {
        return to_exponential(n, EXPONENT_DIGITS);
    }

    let k = SIGNIFICANT_DIGITS - magnitude.log10().floor() as i32 - 1;
    let mult = (10.0 as Real).powi(k);
    // half-up, so -2.5 rounds to -2
    let rounded = (n * mult + 0.5).floor() / mult;
    format!("{rounded}")
}

/// Exponential notation with an explicit exponent sign: `1.00000e-4`, `1.23456e+5`.
///
/// The mantissa is rounded half-up, like the plain branch.
fn to_exponential(n: Real, digits: usize) -> String {
    let ten: Real = 10.0;
    let magnitude = n.abs();

    // Kept digits as an integer, rounded half-up.
    let round_at = |exp: i32| -> Real {
        let shift = digits as i32 - exp;
        let scaled = if shift >= 0 {
            magnitude * ten.powi(shift)
        } else {
            magnitude / ten.powi(-shift)
        };
        (scaled + 0.5).floor()
    };
    let low = ten.powi(digits as i32);
    let high = ten.powi(digits as i32 + 1);

    let mut exp = magnitude.log10().floor() as i32;
    let mut mantissa = round_at(exp);
    if mantissa < low {
        exp -= 1;
        mantissa = round_at(exp);
    }
    if mantissa >= high {
        // 9.999995 rounds up to 10.00000
        exp += 1;
        mantissa = round_at(exp);
    }

    let mantissa = format!("{mantissa:.0}");
    let (lead, rest) = mantissa.split_at(1);
    let sign = if n < 0.0 { "-" } else { "" };
    let exp_sign = if exp < 0 { "-" } else { "+" };
    if rest.is_empty() {
        format!("{sign}{lead}e{exp_sign}{}", exp.abs())
    } else {
        format!("{sign}{lead}.{rest}e{exp_sign}{}", exp.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_tiny_collapse() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e-90), "0");
        assert_eq!(format_number(-1e-85), "0");
    }

    #[test]
    fn large_and_small_use_exponential() {
        assert_eq!(format_number(123_456.0), "1.23456e+5");
        assert_eq!(format_number(0.0001), "1.00000e-4");
        assert_eq!(format_number(-2.5e7), "-2.50000e+7");
        assert_eq!(format_number(1e-50), "1.00000e-50");
    }

    #[test]
    fn exponential_ties_round_up() {
        assert_eq!(format_number(123_456.5), "1.23457e+5");
        assert_eq!(format_number(100_000.5), "1.00001e+5");
        assert_eq!(format_number(-123_456.5), "-1.23457e+5");
        assert_eq!(format_number(999_999.5), "1.00000e+6");
    }

    #[test]
    fn mid_range_rounds_to_six_significant_digits() {
        assert_eq!(format_number(123.456789), "123.457");
        assert_eq!(format_number(-123.456789), "-123.457");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.001234567), "0.00123457");
        assert_eq!(format_number(99_999.0), "99999");
        assert_eq!(format_number(273.15), "273.15");
    }

    #[test]
    fn boundaries_stay_plain() {
        assert_eq!(format_number(1e5), "100000");
        assert_eq!(format_number(1e-3), "0.001");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_number(Real::NAN), "NaN");
        assert_eq!(format_number(Real::INFINITY), "Infinity");
        assert_eq!(format_number(Real::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn representation_artifacts_are_trimmed() {
        // 0.1 + 0.2 = 0.30000000000000004
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }
}
