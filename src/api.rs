//! Top-Level Processing API
//!
//! Pure functions over the engine's subsystems. This module contains no
//! I/O operations, CLI handling, or process exits: every function takes
//! structured input and returns structured output.
//!
//! The inverse-parsing helpers (`parse_decimal` and friends) return
//! `(Option<value>, errors)` pairs; they never panic and only the
//! underlying locale data being absent surfaces through the oracle as a
//! typed condition.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::diagnostics::runtime::FormattingError;
use crate::locale::{default_oracle, CurrencyParseOptions, ParsedCurrency};
use crate::parser::{ParseError, Parser, ParserConfig};
use crate::serializer::{SerializeError, SerializeOptions, Serializer};
use crate::syntax::ast::Resource;
use crate::validator::{ResourceValidator, ValidationOptions, ValidationResult};

/// Parse FTL source with default limits
pub fn parse(source: &str) -> Result<Resource, ParseError> {
    Parser::default().parse(source)
}

/// Parse with explicit limits
pub fn parse_with_config(source: &str, config: ParserConfig) -> Result<Resource, ParseError> {
    Parser::new(config)?.parse(source)
}

/// Serialize a resource with default options (validation on)
pub fn serialize(resource: &Resource) -> Result<String, SerializeError> {
    Serializer::default().serialize(resource)
}

/// Serialize with explicit options
pub fn serialize_with_options(
    resource: &Resource,
    options: SerializeOptions,
) -> Result<String, SerializeError> {
    Serializer::new(options).serialize(resource)
}

/// Run the six validation passes over a resource
pub fn validate_resource(
    resource: &Resource,
    source: Option<&str>,
    options: ValidationOptions,
) -> ValidationResult {
    ResourceValidator::new(options).validate(resource, source)
}

/// JSON rendering of a resource's AST
pub fn resource_to_json(resource: &Resource) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(resource)
}

fn split_result<T>(result: Result<T, FormattingError>) -> (Option<T>, Vec<FormattingError>) {
    match result {
        Ok(value) => (Some(value), Vec::new()),
        Err(error) => (None, vec![error]),
    }
}

/// Parse locale-formatted decimal text
pub fn parse_decimal(text: &str, locale: &str) -> (Option<Decimal>, Vec<FormattingError>) {
    split_result(default_oracle().parse_decimal(locale, text))
}

/// Parse locale-formatted numeric text, requiring a whole number
pub fn parse_number(text: &str, locale: &str) -> (Option<i64>, Vec<FormattingError>) {
    let (decimal, mut errors) = parse_decimal(text, locale);
    let Some(decimal) = decimal else {
        for error in &mut errors {
            error.parse_type = Some("number".to_string());
        }
        return (None, errors);
    };
    if !decimal.fract().is_zero() {
        return (
            None,
            vec![FormattingError::parse_failure(
                "number",
                text,
                "expected a whole number",
            )],
        );
    }
    use rust_decimal::prelude::ToPrimitive;
    match decimal.to_i64() {
        Some(value) => (Some(value), Vec::new()),
        None => (
            None,
            vec![FormattingError::parse_failure(
                "number",
                text,
                "number is out of range",
            )],
        ),
    }
}

/// Parse locale-formatted currency text
pub fn parse_currency(
    text: &str,
    locale: &str,
    options: &CurrencyParseOptions,
) -> (Option<ParsedCurrency>, Vec<FormattingError>) {
    split_result(default_oracle().parse_currency(locale, text, options))
}

/// Parse locale-formatted date text
pub fn parse_date(text: &str, locale: &str) -> (Option<NaiveDate>, Vec<FormattingError>) {
    split_result(default_oracle().parse_date(locale, text))
}

/// Parse locale-formatted datetime text; date-only input yields midnight
pub fn parse_datetime(text: &str, locale: &str) -> (Option<NaiveDateTime>, Vec<FormattingError>) {
    split_result(default_oracle().parse_datetime(locale, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decimal_scenario_french_grouping() {
        let (value, errors) = parse_decimal("1 234,56", "fr_FR");
        assert_eq!(value, Some(Decimal::from_str("1234.56").unwrap()));
        assert!(errors.is_empty());
    }

    #[test]
    fn decimal_scenario_failure_reports_input() {
        let (value, errors) = parse_decimal("five", "en_US");
        assert!(value.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].parse_type.as_deref(), Some("decimal"));
        assert_eq!(errors[0].input_value.as_deref(), Some("five"));
    }

    #[test]
    fn number_requires_whole_values() {
        assert_eq!(parse_number("1,234", "en_US").0, Some(1234));
        let (value, errors) = parse_number("1.5", "en_US");
        assert!(value.is_none());
        assert_eq!(errors[0].parse_type.as_deref(), Some("number"));
    }

    #[test]
    fn resource_json_is_valid_json() {
        let resource = parse("m = hello").unwrap();
        let json = resource_to_json(&resource).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["entries"].is_array());
    }

    #[test]
    fn currency_parse_round_trips_symbol() {
        let (value, errors) =
            parse_currency("$12.34", "en_US", &CurrencyParseOptions::default());
        let parsed = value.unwrap();
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.amount, Decimal::from_str("12.34").unwrap());
        assert!(errors.is_empty());
    }

    #[test]
    fn date_parse_uses_locale_patterns() {
        let (value, errors) = parse_date("24/12/2025", "fr_FR");
        assert!(errors.is_empty());
        assert_eq!(
            value,
            Some(chrono::NaiveDate::from_ymd_opt(2025, 12, 24).unwrap())
        );
    }
}
