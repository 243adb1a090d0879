//! Locale Data Oracle
//!
//! The rest of the engine never talks to locale data directly; it goes
//! through the [`LocaleOracle`] trait. The parser, validator, and
//! serializer do not use it at all, so they stay usable without any locale
//! data path. [`BuiltinLocale`] is the bundled provider: hand-carried CLDR
//! cardinal plural rules, number and date patterns, and currency metadata
//! for the common locales, with root fallback for everything else.
//!
//! Formatting rounds half-up (away from zero) at every precision level,
//! and decimal precision is preserved end to end via [`rust_decimal`].

pub mod codes;
pub mod currency;
pub mod dates;
pub mod numbers;
pub mod plural;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::diagnostics::runtime::FormattingError;

/// Locale-layer failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The code does not match the accepted BCP-47 shape
    InvalidCode { code: String, reason: String },
    /// The code exceeds even the extended length ceiling
    CodeTooLong { length: usize, max: usize },
    /// The provider has no data for the locale and cannot fall back
    UnsupportedLocale(String),
    /// Not a known ISO 4217 code
    InvalidCurrencyCode(String),
    /// The underlying locale-data source is absent
    DataUnavailable(String),
}

impl std::fmt::Display for LocaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocaleError::InvalidCode { code, reason } => {
                write!(f, "invalid locale code {code:?}: {reason}")
            }
            LocaleError::CodeTooLong { length, max } => {
                write!(f, "locale code is {length} characters, limit is {max}")
            }
            LocaleError::UnsupportedLocale(code) => {
                write!(f, "no locale data for {code:?}")
            }
            LocaleError::InvalidCurrencyCode(code) => {
                write!(f, "invalid currency code {code:?}")
            }
            LocaleError::DataUnavailable(what) => write!(f, "locale data unavailable: {what}"),
        }
    }
}

impl std::error::Error for LocaleError {}

/// CLDR cardinal plural categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

/// Options for number and currency formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberOptions {
    pub minimum_fraction_digits: Option<u32>,
    pub maximum_fraction_digits: Option<u32>,
    pub use_grouping: bool,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            minimum_fraction_digits: None,
            maximum_fraction_digits: None,
            use_grouping: true,
        }
    }
}

/// Date/time formatting styles, mirroring CLDR skeleton widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeStyle {
    Full,
    Long,
    #[default]
    Medium,
    Short,
}

/// Options for date/time formatting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeOptions {
    pub date_style: Option<DateTimeStyle>,
    /// When absent, only the date is rendered
    pub time_style: Option<DateTimeStyle>,
}

/// A currency amount recovered from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCurrency {
    pub amount: Decimal,
    pub currency: String,
}

/// Options for currency parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyParseOptions {
    /// Used when the text carries no symbol or code
    pub default_currency: Option<String>,
    /// Fall back to the locale's default currency when the text carries
    /// no symbol or code
    pub infer_from_locale: bool,
}

/// Abstract locale-data provider
///
/// Implementations must be thread-safe; a bundle shares its oracle across
/// concurrent `format_pattern` calls. Parsing methods report failures as
/// [`FormattingError`] values carrying the offending input, never panics.
pub trait LocaleOracle: Send + Sync {
    /// CLDR cardinal category for a number. `precision` pins the count of
    /// visible fraction digits (the CLDR `v` operand); the value is
    /// quantized to it before rule evaluation.
    fn plural_category(
        &self,
        locale: &str,
        value: &Decimal,
        precision: Option<u32>,
    ) -> Result<PluralCategory, LocaleError>;

    fn format_number(
        &self,
        locale: &str,
        value: &Decimal,
        options: &NumberOptions,
    ) -> Result<String, LocaleError>;

    fn format_currency(
        &self,
        locale: &str,
        value: &Decimal,
        currency: &str,
        options: &NumberOptions,
    ) -> Result<String, LocaleError>;

    fn format_datetime(
        &self,
        locale: &str,
        value: &NaiveDateTime,
        options: &DateTimeOptions,
    ) -> Result<String, LocaleError>;

    fn parse_decimal(&self, locale: &str, text: &str) -> Result<Decimal, FormattingError>;

    fn parse_currency(
        &self,
        locale: &str,
        text: &str,
        options: &CurrencyParseOptions,
    ) -> Result<ParsedCurrency, FormattingError>;

    fn parse_date(&self, locale: &str, text: &str) -> Result<NaiveDate, FormattingError>;

    fn parse_datetime(&self, locale: &str, text: &str) -> Result<NaiveDateTime, FormattingError>;
}

/// The bundled locale-data provider
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLocale;

impl LocaleOracle for BuiltinLocale {
    fn plural_category(
        &self,
        locale: &str,
        value: &Decimal,
        precision: Option<u32>,
    ) -> Result<PluralCategory, LocaleError> {
        plural::plural_category(locale, value, precision)
    }

    fn format_number(
        &self,
        locale: &str,
        value: &Decimal,
        options: &NumberOptions,
    ) -> Result<String, LocaleError> {
        Ok(numbers::format_number(locale, value, options))
    }

    fn format_currency(
        &self,
        locale: &str,
        value: &Decimal,
        currency: &str,
        options: &NumberOptions,
    ) -> Result<String, LocaleError> {
        currency::format_currency(locale, value, currency, options)
    }

    fn format_datetime(
        &self,
        locale: &str,
        value: &NaiveDateTime,
        options: &DateTimeOptions,
    ) -> Result<String, LocaleError> {
        Ok(dates::format_datetime(locale, value, options))
    }

    fn parse_decimal(&self, locale: &str, text: &str) -> Result<Decimal, FormattingError> {
        numbers::parse_decimal(locale, text)
    }

    fn parse_currency(
        &self,
        locale: &str,
        text: &str,
        options: &CurrencyParseOptions,
    ) -> Result<ParsedCurrency, FormattingError> {
        currency::parse_currency(locale, text, options)
    }

    fn parse_date(&self, locale: &str, text: &str) -> Result<NaiveDate, FormattingError> {
        dates::parse_date(locale, text)
    }

    fn parse_datetime(&self, locale: &str, text: &str) -> Result<NaiveDateTime, FormattingError> {
        dates::parse_datetime(locale, text)
    }
}

static DEFAULT_ORACLE: Lazy<Arc<dyn LocaleOracle>> = Lazy::new(|| Arc::new(BuiltinLocale));

/// The shared default oracle
pub fn default_oracle() -> Arc<dyn LocaleOracle> {
    Arc::clone(&DEFAULT_ORACLE)
}
