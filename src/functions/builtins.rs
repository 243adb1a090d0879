//! Built-in functions: NUMBER, DATETIME, CURRENCY
//!
//! NUMBER and CURRENCY return a [`FluentNumber`], so their output carries
//! both the display string and the numeric identity that later plural
//! selection needs. DATETIME renders to a plain string.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::diagnostics::runtime::{FormattingError, FormattingErrorKind};
use crate::functions::{FunctionContext, FunctionRegistry, FunctionSignature, RegistryError};
use crate::locale::{currency, DateTimeOptions, DateTimeStyle, NumberOptions};
use crate::resolver::value::{FluentNumber, FluentValue};

/// Register the three builtins on a registry
pub fn register_all(registry: &mut FunctionRegistry) -> Result<(), RegistryError> {
    registry.register(
        FunctionSignature::new("NUMBER", 1)
            .with_param("minimumFractionDigits", "minimum_fraction_digits")
            .with_param("maximumFractionDigits", "maximum_fraction_digits")
            .with_param("useGrouping", "use_grouping")
            .with_locale_injection(),
        Arc::new(number),
    )?;
    registry.register(
        FunctionSignature::new("DATETIME", 1)
            .with_param("dateStyle", "date_style")
            .with_param("timeStyle", "time_style")
            .with_locale_injection(),
        Arc::new(datetime),
    )?;
    registry.register(
        FunctionSignature::new("CURRENCY", 1)
            .with_param("currency", "currency")
            .with_param("minimumFractionDigits", "minimum_fraction_digits")
            .with_param("maximumFractionDigits", "maximum_fraction_digits")
            .with_locale_injection(),
        Arc::new(currency_fn),
    )?;
    Ok(())
}

fn function_error(name: &str, message: impl Into<String>) -> FormattingError {
    FormattingError::new(FormattingErrorKind::FormattingError, message.into())
        .with_fallback(format!("{{!{name}}}"))
}

/// Coerce a positional argument to its decimal identity
fn decimal_arg(name: &str, value: &FluentValue) -> Result<Decimal, FormattingError> {
    if let Some(decimal) = value.as_decimal() {
        return Ok(decimal);
    }
    if let FluentValue::String(text) = value {
        if let Ok(decimal) = Decimal::from_str(text) {
            return Ok(decimal);
        }
    }
    Err(function_error(
        name,
        format!("{name}() takes a numeric value, got {value:?}"),
    ))
}

fn u32_option(
    name: &str,
    named: &BTreeMap<String, FluentValue>,
    key: &str,
) -> Result<Option<u32>, FormattingError> {
    let Some(value) = named.get(key) else {
        return Ok(None);
    };
    let as_u32 = match value {
        FluentValue::Integer(i) if *i >= 0 => Some(*i as u32),
        FluentValue::Decimal(d) if d.fract().is_zero() && !d.is_sign_negative() => {
            use rust_decimal::prelude::ToPrimitive;
            d.to_u32()
        }
        _ => None,
    };
    as_u32
        .map(Some)
        .ok_or_else(|| function_error(name, format!("{name}() option {key} must be a non-negative integer")))
}

fn bool_option(
    name: &str,
    named: &BTreeMap<String, FluentValue>,
    key: &str,
    default: bool,
) -> Result<bool, FormattingError> {
    match named.get(key) {
        None => Ok(default),
        Some(FluentValue::Bool(b)) => Ok(*b),
        Some(FluentValue::String(s)) if s == "true" => Ok(true),
        Some(FluentValue::String(s)) if s == "false" => Ok(false),
        Some(_) => Err(function_error(
            name,
            format!("{name}() option {key} must be a boolean"),
        )),
    }
}

fn number_options(
    name: &str,
    named: &BTreeMap<String, FluentValue>,
) -> Result<NumberOptions, FormattingError> {
    Ok(NumberOptions {
        minimum_fraction_digits: u32_option(name, named, "minimum_fraction_digits")?,
        maximum_fraction_digits: u32_option(name, named, "maximum_fraction_digits")?,
        use_grouping: bool_option(name, named, "use_grouping", true)?,
    })
}

/// Displayed fraction digits after applying the bounds
fn displayed_precision(value: &Decimal, options: &NumberOptions) -> Option<u32> {
    if options.minimum_fraction_digits.is_none() && options.maximum_fraction_digits.is_none() {
        return None;
    }
    let mut scale = value.scale();
    if let Some(max) = options.maximum_fraction_digits {
        scale = scale.min(max);
    }
    if let Some(min) = options.minimum_fraction_digits {
        scale = scale.max(min);
    }
    Some(scale)
}

fn number(
    positional: &[FluentValue],
    named: &BTreeMap<String, FluentValue>,
    ctx: &FunctionContext<'_>,
) -> Result<FluentValue, FormattingError> {
    let value = decimal_arg("NUMBER", &positional[0])?;
    let options = number_options("NUMBER", named)?;

    let formatted = ctx
        .oracle
        .format_number(ctx.locale, &value, &options)
        .map_err(|err| function_error("NUMBER", err.to_string()))?;

    let mut result = FluentNumber::new(value, formatted);
    result.precision = displayed_precision(&value, &options).or_else(|| {
        // Inherit a precision pinned earlier in the chain.
        positional[0].precision()
    });
    Ok(FluentValue::Number(result))
}

fn style_option(
    named: &BTreeMap<String, FluentValue>,
    key: &str,
) -> Result<Option<DateTimeStyle>, FormattingError> {
    let Some(value) = named.get(key) else {
        return Ok(None);
    };
    let FluentValue::String(style) = value else {
        return Err(function_error(
            "DATETIME",
            format!("DATETIME() option {key} must be a string"),
        ));
    };
    match style.as_str() {
        "full" => Ok(Some(DateTimeStyle::Full)),
        "long" => Ok(Some(DateTimeStyle::Long)),
        "medium" => Ok(Some(DateTimeStyle::Medium)),
        "short" => Ok(Some(DateTimeStyle::Short)),
        other => Err(function_error(
            "DATETIME",
            format!("DATETIME() does not understand {key} {other:?}"),
        )),
    }
}

fn datetime(
    positional: &[FluentValue],
    named: &BTreeMap<String, FluentValue>,
    ctx: &FunctionContext<'_>,
) -> Result<FluentValue, FormattingError> {
    let value = match &positional[0] {
        FluentValue::DateTime(value) => *value,
        FluentValue::String(text) => ctx
            .oracle
            .parse_datetime(ctx.locale, text)
            .map_err(|err| function_error("DATETIME", err.message))?,
        other => {
            return Err(function_error(
                "DATETIME",
                format!("DATETIME() takes a datetime value, got {other:?}"),
            ));
        }
    };

    let options = DateTimeOptions {
        date_style: style_option(named, "date_style")?,
        time_style: style_option(named, "time_style")?,
    };
    let formatted = ctx
        .oracle
        .format_datetime(ctx.locale, &value, &options)
        .map_err(|err| function_error("DATETIME", err.to_string()))?;
    Ok(FluentValue::String(formatted))
}

fn currency_fn(
    positional: &[FluentValue],
    named: &BTreeMap<String, FluentValue>,
    ctx: &FunctionContext<'_>,
) -> Result<FluentValue, FormattingError> {
    let value = decimal_arg("CURRENCY", &positional[0])?;
    let options = number_options("CURRENCY", named)?;

    let code = match named.get("currency") {
        Some(FluentValue::String(code)) => code.clone(),
        Some(other) => {
            return Err(function_error(
                "CURRENCY",
                format!("CURRENCY() option currency must be a string, got {other:?}"),
            ));
        }
        None => {
            let canonical = crate::locale::codes::validate_locale(ctx.locale)
                .map(|validated| validated.canonical)
                .map_err(|err| function_error("CURRENCY", err.to_string()))?;
            currency::default_currency_for(&canonical)
                .ok_or_else(|| {
                    function_error(
                        "CURRENCY",
                        format!("no default currency for locale {:?}", ctx.locale),
                    )
                })?
                .to_string()
        }
    };

    let formatted = ctx
        .oracle
        .format_currency(ctx.locale, &value, &code, &options)
        .map_err(|err| function_error("CURRENCY", err.to_string()))?;

    let digits = currency::currency_info(&code)
        .map(|info| info.decimal_digits)
        .unwrap_or(2);
    let precision = displayed_precision(&value, &options).unwrap_or(digits);
    Ok(FluentValue::Number(
        FluentNumber::new(value, formatted).with_precision(precision),
    ))
}
