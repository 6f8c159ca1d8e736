//! Number formatting for the calculator display.
//!
//! Two representations exist for every value:
//! - the *stored* form kept in the keypad's `current` slot, written the way a
//!   JavaScript engine stringifies numbers so it parses back losslessly
//! - the *display* form with thousand separators, exponential notation for
//!   very large or very small magnitudes and at most 8 fractional digits

use serde::Deserialize;

/// Values with a magnitude at or above this are shown in exponential form.
const EXPONENTIAL_ABOVE: f64 = 1e12;
/// Non-zero values with a magnitude below this are shown in exponential form.
const EXPONENTIAL_BELOW: f64 = 0.001;
/// Integers below this magnitude take the grouped-integer fast path.
const GROUPED_INTEGER_BELOW: f64 = 1e6;

/// Separators used when rendering numbers.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayFormat {
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }
}

/// Parse an operand string.
///
/// Accepts everything [`to_stored`] produces, including `NaN` and
/// `Infinity`. Returns `None` for text that is not a number at all.
pub fn parse_operand(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Stringify a value for storage in the keypad's `current` slot.
///
/// Matches JavaScript's `String(number)`: shortest round-trip digits, decimal
/// notation between `1e-6` and `1e21`, `1e+21` style outside that range.
pub fn to_stored(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        format!("{}", value)
    } else {
        with_exponent_sign(format!("{:e}", value))
    }
}

/// Format the keypad's `current` text for display.
///
/// Empty text and `"0"` show as `0`; text that does not parse is shown as is.
pub fn format_number(text: &str, format: &DisplayFormat) -> String {
    if text.is_empty() || text == "0" {
        return "0".to_string();
    }

    match parse_operand(text) {
        Some(value) if !value.is_nan() => format_value(value, format),
        _ => text.to_string(),
    }
}

/// Format a numeric value for display.
pub fn format_value(value: f64, format: &DisplayFormat) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return to_stored(value);
    }

    let abs = value.abs();

    if value.fract() == 0.0 && abs < GROUPED_INTEGER_BELOW {
        // `as i64` also folds -0 into 0
        return group_digits(&(value as i64).to_string(), format.thousands_separator);
    }

    if abs >= EXPONENTIAL_ABOVE || (abs < EXPONENTIAL_BELOW && value != 0.0) {
        return with_exponent_sign(format!("{:.6e}", value));
    }

    let fixed = format!("{:.8}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    let int_part = group_digits(int_part, format.thousands_separator);

    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}{}{}", int_part, format.decimal_separator, frac_part)
    }
}

/// Insert thousand separators into an integer string with an optional sign.
fn group_digits(digits: &str, separator: char) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(separator);
        }
        result.push(c);
    }

    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Rust writes `1e21` where JavaScript writes `1e+21`.
fn with_exponent_sign(formatted: String) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(text: &str) -> String {
        format_number(text, &DisplayFormat::default())
    }

    #[test]
    fn test_zero_and_empty() {
        assert_eq!(fmt(""), "0");
        assert_eq!(fmt("0"), "0");
        assert_eq!(fmt("-0"), "0");
    }

    #[test]
    fn test_integers_grouped() {
        assert_eq!(fmt("42"), "42");
        assert_eq!(fmt("999999"), "999,999");
        assert_eq!(fmt("-12345"), "-12,345");
        assert_eq!(fmt("1234567"), "1,234,567");
        assert_eq!(fmt("987654321012"), "987,654,321,012");
    }

    #[test]
    fn test_exponential_form() {
        assert_eq!(fmt("0.0000001"), "1.000000e-7");
        assert_eq!(fmt("1e-7"), "1.000000e-7");
        assert_eq!(fmt("1234567890123"), "1.234568e+12");
        assert_eq!(fmt("-0.0005"), "-5.000000e-4");
    }

    #[test]
    fn test_fraction_digits() {
        assert_eq!(fmt("3.14159265"), "3.14159265");
        assert_eq!(fmt("3.141592653589793"), "3.14159265");
        assert_eq!(fmt("0.5"), "0.5");
        assert_eq!(fmt("1234.5"), "1,234.5");
        assert_eq!(fmt("0.30000000000000004"), "0.3");
    }

    #[test]
    fn test_unparseable_text_shown_verbatim() {
        assert_eq!(fmt("."), ".");
        assert_eq!(fmt("NaN"), "NaN");
        assert_eq!(fmt("Infinity"), "Infinity");
    }

    #[test]
    fn test_custom_separators() {
        let format = DisplayFormat {
            thousands_separator: '.',
            decimal_separator: ',',
        };
        assert_eq!(format_number("1234.25", &format), "1.234,25");
        assert_eq!(format_number("7654321", &format), "7.654.321");
    }

    #[test]
    fn test_stored_form() {
        assert_eq!(to_stored(9.0), "9");
        assert_eq!(to_stored(-0.0), "0");
        assert_eq!(to_stored(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(to_stored(1e21), "1e+21");
        assert_eq!(to_stored(1.5e-8), "1.5e-8");
        assert_eq!(to_stored(1e-7), "1e-7");
        assert_eq!(to_stored(5e-7), "5e-7");
        assert_eq!(to_stored(1e-6), "0.000001");
        assert_eq!(to_stored(f64::NAN), "NaN");
        assert_eq!(to_stored(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_stored_form_parses_back() {
        for value in [0.1 + 0.2, 1e21, -2.5e-9, 123456789.0] {
            assert_eq!(parse_operand(&to_stored(value)), Some(value));
        }
        assert!(parse_operand(&to_stored(f64::NAN)).is_some_and(f64::is_nan));
        assert_eq!(parse_operand("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_operand("12."), Some(12.0));
        assert_eq!(parse_operand("."), None);
        assert_eq!(parse_operand("-"), None);
    }
}
