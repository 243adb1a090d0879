//! Runtime argument values
//!
//! Caller arguments form a closed sum type; there is no dynamic or null
//! variant. [`FluentNumber`] carries both a display string and a numeric
//! identity, so the output of `NUMBER()` or `CURRENCY()` can still drive
//! plural selection downstream.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Argument map passed to `format_pattern`; ordered for stable cache keys
pub type FluentArgs = BTreeMap<String, FluentValue>;

/// A formatted number that kept its numeric identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluentNumber {
    pub value: Decimal,
    /// Locale-formatted display string
    pub formatted: String,
    /// Count of displayed fraction digits, when pinned by formatting
    pub precision: Option<u32>,
}

impl FluentNumber {
    pub fn new(value: Decimal, formatted: impl Into<String>) -> Self {
        Self {
            value,
            formatted: formatted.into(),
            precision: None,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }
}

impl std::fmt::Display for FluentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted)
    }
}

/// Closed sum of argument value kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FluentValue {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Bool(bool),
    DateTime(NaiveDateTime),
    Number(FluentNumber),
}

impl FluentValue {
    /// Numeric identity, when the value has one
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FluentValue::Integer(i) => Some(Decimal::from(*i)),
            FluentValue::Decimal(d) => Some(*d),
            FluentValue::Number(n) => Some(n.value),
            _ => None,
        }
    }

    /// Displayed fraction digits, when the value pins them
    pub fn precision(&self) -> Option<u32> {
        match self {
            FluentValue::Number(n) => n.precision,
            FluentValue::Decimal(d) => Some(d.scale()),
            FluentValue::Integer(_) => Some(0),
            _ => None,
        }
    }
}

impl From<&str> for FluentValue {
    fn from(value: &str) -> Self {
        FluentValue::String(value.to_string())
    }
}

impl From<String> for FluentValue {
    fn from(value: String) -> Self {
        FluentValue::String(value)
    }
}

impl From<i64> for FluentValue {
    fn from(value: i64) -> Self {
        FluentValue::Integer(value)
    }
}

impl From<i32> for FluentValue {
    fn from(value: i32) -> Self {
        FluentValue::Integer(value as i64)
    }
}

impl From<Decimal> for FluentValue {
    fn from(value: Decimal) -> Self {
        FluentValue::Decimal(value)
    }
}

impl From<bool> for FluentValue {
    fn from(value: bool) -> Self {
        FluentValue::Bool(value)
    }
}

impl From<NaiveDateTime> for FluentValue {
    fn from(value: NaiveDateTime) -> Self {
        FluentValue::DateTime(value)
    }
}

impl From<FluentNumber> for FluentValue {
    fn from(value: FluentNumber) -> Self {
        FluentValue::Number(value)
    }
}

/// Convenience constructor for argument maps
///
/// ```rust
/// use ftl_engine::resolver::value::args;
/// let map = args([("n", 5.into()), ("name", "Ada".into())]);
/// assert_eq!(map.len(), 2);
/// ```
pub fn args<const N: usize>(pairs: [(&str, FluentValue); N]) -> FluentArgs {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numeric_identity_spans_value_kinds() {
        assert_eq!(
            FluentValue::Integer(5).as_decimal(),
            Some(Decimal::from(5))
        );
        let number = FluentNumber::new(Decimal::from_str("2.50").unwrap(), "2.50");
        assert_eq!(
            FluentValue::Number(number).as_decimal(),
            Some(Decimal::from_str("2.50").unwrap())
        );
        assert_eq!(FluentValue::Bool(true).as_decimal(), None);
    }

    #[test]
    fn precision_tracks_the_displayed_digits() {
        let number = FluentNumber::new(Decimal::from(2), "2.00").with_precision(2);
        assert_eq!(FluentValue::Number(number).precision(), Some(2));
        assert_eq!(
            FluentValue::Decimal(Decimal::from_str("1.50").unwrap()).precision(),
            Some(2)
        );
    }
}
