//! Currency formatting and parsing
//!
//! Lookup is two-tier: a small fast table covers the common currencies,
//! and misses fall back to the full table behind a lazily-built map that
//! is cached across calls. Ambiguous symbols (`$`, `£`, `¥`, `kr`) resolve
//! through locale-aware maps with a defaults table; ISO 4217 codes are
//! validated against the full table.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::diagnostics::runtime::FormattingError;
use crate::locale::numbers;
use crate::locale::{codes, CurrencyParseOptions, LocaleError, NumberOptions, ParsedCurrency};

/// ISO 4217 metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub decimal_digits: u32,
}

/// Hot currencies checked with a linear scan before the full table
const FAST_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "EUR", symbol: "€", decimal_digits: 2 },
    CurrencyInfo { code: "GBP", symbol: "£", decimal_digits: 2 },
    CurrencyInfo { code: "JPY", symbol: "¥", decimal_digits: 0 },
    CurrencyInfo { code: "CNY", symbol: "¥", decimal_digits: 2 },
    CurrencyInfo { code: "CHF", symbol: "CHF", decimal_digits: 2 },
    CurrencyInfo { code: "CAD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "AUD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "SEK", symbol: "kr", decimal_digits: 2 },
    CurrencyInfo { code: "NOK", symbol: "kr", decimal_digits: 2 },
    CurrencyInfo { code: "DKK", symbol: "kr", decimal_digits: 2 },
    CurrencyInfo { code: "PLN", symbol: "zł", decimal_digits: 2 },
    CurrencyInfo { code: "RUB", symbol: "₽", decimal_digits: 2 },
    CurrencyInfo { code: "INR", symbol: "₹", decimal_digits: 2 },
    CurrencyInfo { code: "BRL", symbol: "R$", decimal_digits: 2 },
    CurrencyInfo { code: "MXN", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "KRW", symbol: "₩", decimal_digits: 0 },
    CurrencyInfo { code: "TRY", symbol: "₺", decimal_digits: 2 },
    CurrencyInfo { code: "EGP", symbol: "£", decimal_digits: 2 },
    CurrencyInfo { code: "ZAR", symbol: "R", decimal_digits: 2 },
];

/// The long tail behind the fast table
const EXTENDED_CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "NZD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "HKD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "SGD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "TWD", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "CZK", symbol: "Kč", decimal_digits: 2 },
    CurrencyInfo { code: "HUF", symbol: "Ft", decimal_digits: 2 },
    CurrencyInfo { code: "RON", symbol: "lei", decimal_digits: 2 },
    CurrencyInfo { code: "BGN", symbol: "лв", decimal_digits: 2 },
    CurrencyInfo { code: "HRK", symbol: "kn", decimal_digits: 2 },
    CurrencyInfo { code: "RSD", symbol: "дин", decimal_digits: 2 },
    CurrencyInfo { code: "UAH", symbol: "₴", decimal_digits: 2 },
    CurrencyInfo { code: "ILS", symbol: "₪", decimal_digits: 2 },
    CurrencyInfo { code: "AED", symbol: "د.إ", decimal_digits: 2 },
    CurrencyInfo { code: "SAR", symbol: "ر.س", decimal_digits: 2 },
    CurrencyInfo { code: "QAR", symbol: "ر.ق", decimal_digits: 2 },
    CurrencyInfo { code: "KWD", symbol: "د.ك", decimal_digits: 3 },
    CurrencyInfo { code: "BHD", symbol: ".د.ب", decimal_digits: 3 },
    CurrencyInfo { code: "OMR", symbol: "ر.ع.", decimal_digits: 3 },
    CurrencyInfo { code: "JOD", symbol: "د.ا", decimal_digits: 3 },
    CurrencyInfo { code: "TND", symbol: "د.ت", decimal_digits: 3 },
    CurrencyInfo { code: "THB", symbol: "฿", decimal_digits: 2 },
    CurrencyInfo { code: "VND", symbol: "₫", decimal_digits: 0 },
    CurrencyInfo { code: "IDR", symbol: "Rp", decimal_digits: 2 },
    CurrencyInfo { code: "MYR", symbol: "RM", decimal_digits: 2 },
    CurrencyInfo { code: "PHP", symbol: "₱", decimal_digits: 2 },
    CurrencyInfo { code: "ISK", symbol: "kr", decimal_digits: 0 },
    CurrencyInfo { code: "CLP", symbol: "$", decimal_digits: 0 },
    CurrencyInfo { code: "COP", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "ARS", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "PEN", symbol: "S/", decimal_digits: 2 },
    CurrencyInfo { code: "UYU", symbol: "$", decimal_digits: 2 },
    CurrencyInfo { code: "NGN", symbol: "₦", decimal_digits: 2 },
    CurrencyInfo { code: "KES", symbol: "KSh", decimal_digits: 2 },
    CurrencyInfo { code: "GHS", symbol: "₵", decimal_digits: 2 },
    CurrencyInfo { code: "MAD", symbol: "د.م.", decimal_digits: 2 },
    CurrencyInfo { code: "PKR", symbol: "₨", decimal_digits: 2 },
    CurrencyInfo { code: "BDT", symbol: "৳", decimal_digits: 2 },
    CurrencyInfo { code: "LKR", symbol: "₨", decimal_digits: 2 },
    CurrencyInfo { code: "NPR", symbol: "₨", decimal_digits: 2 },
];

/// Full table, indexed by code and built once on first miss
static FULL_TABLE: Lazy<HashMap<&'static str, &'static CurrencyInfo>> = Lazy::new(|| {
    FAST_CURRENCIES
        .iter()
        .chain(EXTENDED_CURRENCIES.iter())
        .map(|info| (info.code, info))
        .collect()
});

static ISO_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[A-Z]{3}\z").expect("currency code pattern"));

/// Two-tier lookup: fast list first, full table on miss
pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    FAST_CURRENCIES
        .iter()
        .find(|info| info.code == code)
        .or_else(|| FULL_TABLE.get(code).copied())
}

/// Shape plus table membership check
pub fn validate_currency_code(code: &str) -> Result<&'static CurrencyInfo, LocaleError> {
    if !ISO_CODE_RE.is_match(code) {
        return Err(LocaleError::InvalidCurrencyCode(code.to_string()));
    }
    currency_info(code).ok_or_else(|| LocaleError::InvalidCurrencyCode(code.to_string()))
}

/// Ambiguous symbols and their locale-aware resolutions; the first entry
/// with a matching language (or language_REGION) wins, the last row is
/// the default
const AMBIGUOUS_SYMBOLS: &[(&str, &[(&str, &str)], &str)] = &[
    (
        "$",
        &[
            ("en_CA", "CAD"),
            ("fr_CA", "CAD"),
            ("en_AU", "AUD"),
            ("en_NZ", "NZD"),
            ("es_MX", "MXN"),
            ("es_AR", "ARS"),
            ("es_CL", "CLP"),
            ("es_CO", "COP"),
        ],
        "USD",
    ),
    ("£", &[("ar", "EGP"), ("en", "GBP")], "GBP"),
    ("¥", &[("zh", "CNY"), ("ja", "JPY")], "JPY"),
    (
        "kr",
        &[
            ("sv", "SEK"),
            ("nb", "NOK"),
            ("no", "NOK"),
            ("da", "DKK"),
            ("is", "ISK"),
        ],
        "SEK",
    ),
];

/// Default currency per locale, used by `infer_from_locale`
const LOCALE_DEFAULT_CURRENCY: &[(&str, &str)] = &[
    ("en_US", "USD"),
    ("en_GB", "GBP"),
    ("en_CA", "CAD"),
    ("en_AU", "AUD"),
    ("en_NZ", "NZD"),
    ("en_IE", "EUR"),
    ("en", "USD"),
    ("de_CH", "CHF"),
    ("de", "EUR"),
    ("fr_CH", "CHF"),
    ("fr_CA", "CAD"),
    ("fr", "EUR"),
    ("es_MX", "MXN"),
    ("es_AR", "ARS"),
    ("es", "EUR"),
    ("it", "EUR"),
    ("nl", "EUR"),
    ("pt_BR", "BRL"),
    ("pt", "EUR"),
    ("fi", "EUR"),
    ("el", "EUR"),
    ("ga", "EUR"),
    ("et", "EUR"),
    ("lv", "EUR"),
    ("lt", "EUR"),
    ("sk", "EUR"),
    ("sv", "SEK"),
    ("nb", "NOK"),
    ("no", "NOK"),
    ("da", "DKK"),
    ("is", "ISK"),
    ("pl", "PLN"),
    ("cs", "CZK"),
    ("hu", "HUF"),
    ("ro", "RON"),
    ("bg", "BGN"),
    ("hr", "EUR"),
    ("sr", "RSD"),
    ("ru", "RUB"),
    ("uk", "UAH"),
    ("tr", "TRY"),
    ("ar_EG", "EGP"),
    ("ar_SA", "SAR"),
    ("ar_AE", "AED"),
    ("ar", "EGP"),
    ("he", "ILS"),
    ("ja", "JPY"),
    ("zh", "CNY"),
    ("ko", "KRW"),
    ("th", "THB"),
    ("vi", "VND"),
    ("id", "IDR"),
    ("in", "INR"),
    ("hi", "INR"),
    ("cy", "GBP"),
];

/// Resolve a currency symbol against a locale.
///
/// Ambiguous symbols consult the locale maps and fall back to the
/// defaults table; unambiguous symbols match the currency tables.
pub fn resolve_symbol(symbol: &str, canonical_locale: &str) -> Option<&'static str> {
    let language = codes::language(canonical_locale);
    let lang_region = codes::region(canonical_locale)
        .map(|region| format!("{language}_{region}"));

    for (candidate, by_locale, default) in AMBIGUOUS_SYMBOLS {
        if *candidate != symbol {
            continue;
        }
        for (locale_key, code) in by_locale.iter() {
            let matches = match &lang_region {
                Some(lr) if lr == locale_key => true,
                _ => *locale_key == language,
            };
            if matches {
                return Some(code);
            }
        }
        return Some(default);
    }

    // Unambiguous: first table entry carrying the symbol.
    FAST_CURRENCIES
        .iter()
        .chain(EXTENDED_CURRENCIES.iter())
        .find(|info| info.symbol == symbol)
        .map(|info| info.code)
}

/// Default currency for a locale (by region, then by language)
pub fn default_currency_for(canonical_locale: &str) -> Option<&'static str> {
    let language = codes::language(canonical_locale);
    let lang_region = codes::region(canonical_locale)
        .map(|region| format!("{language}_{region}"));
    if let Some(lang_region) = &lang_region {
        if let Some((_, code)) = LOCALE_DEFAULT_CURRENCY
            .iter()
            .find(|(key, _)| key == lang_region)
        {
            return Some(code);
        }
    }
    LOCALE_DEFAULT_CURRENCY
        .iter()
        .find(|(key, _)| *key == language)
        .map(|(_, code)| *code)
}

/// Whether the locale writes the symbol before the amount
fn symbol_prefixed(canonical_locale: &str) -> bool {
    matches!(
        codes::language(canonical_locale),
        "en" | "ja" | "zh" | "ko" | "th" | "he" | "ar" | "pt" | "cy" | "ga" | "id" | "vi"
    )
}

/// Format an amount in a currency using the locale's conventions
pub fn format_currency(
    locale: &str,
    value: &Decimal,
    currency: &str,
    options: &NumberOptions,
) -> Result<String, LocaleError> {
    let info = validate_currency_code(currency)?;
    let canonical = codes::validate_locale(locale)?.canonical;

    let mut effective = options.clone();
    if effective.maximum_fraction_digits.is_none() {
        effective.maximum_fraction_digits = Some(info.decimal_digits);
    }
    if effective.minimum_fraction_digits.is_none() {
        effective.minimum_fraction_digits = Some(info.decimal_digits);
    }
    let number = numbers::format_number(&canonical, value, &effective);

    if symbol_prefixed(&canonical) {
        Ok(format!("{}{}", info.symbol, number))
    } else {
        Ok(format!("{}\u{00A0}{}", number, info.symbol))
    }
}

/// All symbols we can recognize while scanning text, longest first so
/// multi-character symbols win over their prefixes
static KNOWN_SYMBOLS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut symbols: Vec<&'static str> = FAST_CURRENCIES
        .iter()
        .chain(EXTENDED_CURRENCIES.iter())
        .map(|info| info.symbol)
        .collect();
    symbols.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    symbols.dedup();
    symbols
});

/// Split leading/trailing currency tokens (symbol or ISO code) from text
fn extract_currency_token(text: &str) -> (Option<String>, String) {
    let trimmed = text.trim();

    // ISO code at either end, set off by the end of string or a space.
    if trimmed.len() > 3 {
        let head: String = trimmed.chars().take(3).collect();
        if ISO_CODE_RE.is_match(&head) {
            let rest = trimmed[head.len()..].trim_start();
            return (Some(head), rest.to_string());
        }
        let tail: String = trimmed
            .chars()
            .rev()
            .take(3)
            .collect::<String>()
            .chars()
            .rev()
            .collect();
        if ISO_CODE_RE.is_match(&tail) {
            let rest = trimmed[..trimmed.len() - tail.len()].trim_end();
            return (Some(tail), rest.to_string());
        }
    }

    for symbol in KNOWN_SYMBOLS.iter() {
        if let Some(rest) = trimmed.strip_prefix(symbol) {
            return (Some(symbol.to_string()), rest.trim_start().to_string());
        }
        if let Some(rest) = trimmed.strip_suffix(symbol) {
            return (Some(symbol.to_string()), rest.trim_end().to_string());
        }
    }
    (None, trimmed.to_string())
}

/// Parse locale-formatted currency text into an amount and ISO code
pub fn parse_currency(
    locale: &str,
    text: &str,
    options: &CurrencyParseOptions,
) -> Result<ParsedCurrency, FormattingError> {
    let canonical = codes::validate_locale(locale)
        .map(|validated| validated.canonical)
        .map_err(|err| FormattingError::parse_failure("currency", text, err.to_string()))?;

    let (token, amount_text) = extract_currency_token(text);

    let currency = match token {
        Some(token) if ISO_CODE_RE.is_match(&token) => {
            let info = validate_currency_code(&token)
                .map_err(|err| FormattingError::parse_failure("currency", text, err.to_string()))?;
            info.code.to_string()
        }
        Some(token) => resolve_symbol(&token, &canonical)
            .ok_or_else(|| {
                FormattingError::parse_failure(
                    "currency",
                    text,
                    format!("unknown currency symbol {token:?}"),
                )
            })?
            .to_string(),
        None => match (&options.default_currency, options.infer_from_locale) {
            (Some(code), _) => {
                let info = validate_currency_code(code).map_err(|err| {
                    FormattingError::parse_failure("currency", text, err.to_string())
                })?;
                info.code.to_string()
            }
            (None, true) => default_currency_for(&canonical)
                .ok_or_else(|| {
                    FormattingError::parse_failure(
                        "currency",
                        text,
                        format!("no default currency for locale {locale:?}"),
                    )
                })?
                .to_string(),
            (None, false) => {
                return Err(FormattingError::parse_failure(
                    "currency",
                    text,
                    "no currency symbol or code in input",
                ));
            }
        },
    };

    let amount = numbers::parse_decimal(&canonical, &amount_text).map_err(|_| {
        FormattingError::parse_failure("currency", text, "no numeric amount in input")
    })?;
    Ok(ParsedCurrency { amount, currency })
}
