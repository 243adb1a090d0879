//! Locale-aware number formatting and parsing
//!
//! Rounding is half-up (midpoint away from zero) at every precision
//! level; grouping and decimal separators come from a per-language symbol
//! table with root falling back to `en` conventions. Parsing accepts
//! ASCII space, NBSP, and narrow NBSP as grouping besides the locale's
//! own separator.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::diagnostics::runtime::FormattingError;
use crate::locale::codes;
use crate::locale::NumberOptions;

/// Decimal and grouping separators for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: &'static str,
    pub group: &'static str,
}

const DOT_COMMA: NumberSymbols = NumberSymbols {
    decimal: ".",
    group: ",",
};
const COMMA_DOT: NumberSymbols = NumberSymbols {
    decimal: ",",
    group: ".",
};
const COMMA_NBSP: NumberSymbols = NumberSymbols {
    decimal: ",",
    group: "\u{00A0}",
};

/// Symbols for a canonical locale code
pub fn symbols_for(locale: &str) -> NumberSymbols {
    let canonical = match codes::validate_locale(locale) {
        Ok(validated) => validated.canonical,
        Err(_) => return DOT_COMMA,
    };
    match codes::language(&canonical) {
        "de" | "es" | "it" | "nl" | "pt" | "da" | "el" | "id" | "tr" | "ro" | "hr" | "sr"
        | "bs" | "bg" | "is" | "vi" => COMMA_DOT,
        "fr" | "ru" | "uk" | "pl" | "cs" | "sk" | "fi" | "sv" | "nb" | "no" | "lv" | "lt"
        | "et" | "hu" => COMMA_NBSP,
        _ => DOT_COMMA,
    }
}

/// Round half-up to `dp` fraction digits
pub fn round_half_up(value: &Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Apply fraction-digit bounds, returning the digits to display
fn apply_fraction_bounds(value: &Decimal, options: &NumberOptions) -> (Decimal, u32) {
    let mut result = *value;
    if let Some(max) = options.maximum_fraction_digits {
        if result.scale() > max {
            result = round_half_up(&result, max);
        }
    }
    let mut scale = result.scale();
    if let Some(min) = options.minimum_fraction_digits {
        scale = scale.max(min);
    }
    (result, scale)
}

/// Format a decimal with the locale's separators
pub fn format_number(locale: &str, value: &Decimal, options: &NumberOptions) -> String {
    let symbols = symbols_for(locale);
    let (value, scale) = apply_fraction_bounds(value, options);

    let negative = value.is_sign_negative() && !value.is_zero();
    let abs = value.abs();
    let integer = abs.trunc();
    let mut integer_digits = integer.to_string();
    if let Some(stripped) = integer_digits.strip_prefix('-') {
        integer_digits = stripped.to_string();
    }

    let grouped = if options.use_grouping && integer_digits.len() > 3 {
        group_digits(&integer_digits, symbols.group)
    } else {
        integer_digits
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if scale > 0 {
        out.push_str(symbols.decimal);
        out.push_str(&fraction_digits(&abs, scale));
    }
    out
}

/// Insert the group separator every three digits from the right
fn group_digits(digits: &str, separator: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in chars.iter().enumerate() {
        if index > 0 && (chars.len() - index) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(*ch);
    }
    out
}

/// Fraction digits of `|value|` padded or truncated to `scale`
fn fraction_digits(abs: &Decimal, scale: u32) -> String {
    let rendered = abs.fract().to_string();
    let digits = rendered.strip_prefix("0.").unwrap_or("");
    let mut out: String = digits.chars().take(scale as usize).collect();
    while (out.len() as u32) < scale {
        out.push('0');
    }
    out
}

/// Parse locale-formatted text into a decimal
pub fn parse_decimal(locale: &str, text: &str) -> Result<Decimal, FormattingError> {
    let symbols = symbols_for(locale);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FormattingError::parse_failure(
            "decimal",
            text,
            "empty input",
        ));
    }

    let mut normalized = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let token = ch.to_string();
        if token == symbols.group || matches!(ch, ' ' | '\u{00A0}' | '\u{202F}') {
            continue;
        }
        if token == symbols.decimal {
            normalized.push('.');
        } else {
            normalized.push(ch);
        }
    }

    Decimal::from_str(&normalized).map_err(|_| {
        FormattingError::parse_failure(
            "decimal",
            text,
            format!("not a number in locale {locale:?}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decimal(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[rstest]
    #[case("en", "1234.56", "1,234.56")]
    #[case("en", "5", "5")]
    #[case("en", "123", "123")]
    #[case("en", "1234567", "1,234,567")]
    #[case("de", "1234.56", "1.234,56")]
    #[case("fr", "1234.56", "1\u{00A0}234,56")]
    #[case("en", "-1234.5", "-1,234.5")]
    fn formatting(#[case] locale: &str, #[case] value: &str, #[case] expected: &str) {
        assert_eq!(
            format_number(locale, &decimal(value), &NumberOptions::default()),
            expected
        );
    }

    #[test]
    fn grouping_can_be_disabled() {
        let options = NumberOptions {
            use_grouping: false,
            ..NumberOptions::default()
        };
        assert_eq!(format_number("en", &decimal("1234567"), &options), "1234567");
    }

    #[test]
    fn minimum_fraction_digits_pad() {
        let options = NumberOptions {
            minimum_fraction_digits: Some(2),
            ..NumberOptions::default()
        };
        assert_eq!(format_number("en", &decimal("5"), &options), "5.00");
        assert_eq!(format_number("en", &decimal("5.1"), &options), "5.10");
    }

    #[test]
    fn maximum_fraction_digits_round_half_up() {
        let options = NumberOptions {
            maximum_fraction_digits: Some(2),
            ..NumberOptions::default()
        };
        assert_eq!(format_number("en", &decimal("1.005"), &options), "1.01");
        assert_eq!(format_number("en", &decimal("2.675"), &options), "2.68");
        assert_eq!(format_number("en", &decimal("-1.005"), &options), "-1.01");
    }

    #[test]
    fn precision_is_preserved_without_bounds() {
        assert_eq!(
            format_number("en", &decimal("1.500"), &NumberOptions::default()),
            "1.500"
        );
    }

    #[rstest]
    #[case("fr_FR", "1 234,56", "1234.56")]
    #[case("fr_FR", "1\u{00A0}234,56", "1234.56")]
    #[case("en_US", "1,234.56", "1234.56")]
    #[case("de_DE", "1.234,56", "1234.56")]
    #[case("en", "42", "42")]
    #[case("en", "-0.5", "-0.5")]
    fn parsing(#[case] locale: &str, #[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_decimal(locale, text).unwrap(), decimal(expected));
    }

    #[test]
    fn unparseable_text_reports_the_input() {
        let err = parse_decimal("en_US", "five").unwrap_err();
        assert_eq!(err.parse_type.as_deref(), Some("decimal"));
        assert_eq!(err.input_value.as_deref(), Some("five"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(parse_decimal("en", "   ").is_err());
    }
}
