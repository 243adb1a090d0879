//! CLDR cardinal plural rules
//!
//! Rules are keyed by primary language subtag; unknown languages use the
//! root rule (always `other`). Rule functions work on the CLDR operands:
//!
//! - `n` - absolute value
//! - `i` - integer part
//! - `v` - count of visible fraction digits
//! - `f` - visible fraction digits as an integer
//!
//! A caller-supplied precision pins `v` (quantizing the value half-up
//! first), matching how a formatted number is actually displayed: `1` is
//! "one" in English but `1.0` shown with one fraction digit is "other".

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::locale::codes;
use crate::locale::{LocaleError, PluralCategory};

/// CLDR rule operands derived from a decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralOperands {
    pub i: u64,
    pub v: u32,
    pub f: u64,
}

impl PluralOperands {
    pub fn new(value: &Decimal, precision: Option<u32>) -> Self {
        let quantized = match precision {
            Some(p) => value.round_dp_with_strategy(p, RoundingStrategy::MidpointAwayFromZero),
            None => *value,
        };
        let n = quantized.abs();
        let v = precision.unwrap_or_else(|| n.scale());
        let i = n.trunc().to_u64().unwrap_or(u64::MAX);

        let fraction = n.fract();
        // Shift the fraction digits into an integer: 0.50 with v=2 → 50.
        let mut f = fraction;
        for _ in 0..v {
            f *= Decimal::from(10);
        }
        let f = f.trunc().to_u64().unwrap_or(u64::MAX);

        Self { i, v, f }
    }

    /// Whether the number is a whole integer as displayed
    fn integer(&self) -> bool {
        self.v == 0
    }

    /// `n` comparisons only matter for whole numbers in the rules below
    fn n_is(&self, value: u64) -> bool {
        self.integer() && self.i == value
    }
}

type Rule = fn(&PluralOperands) -> PluralCategory;

fn rule_root(_: &PluralOperands) -> PluralCategory {
    PluralCategory::Other
}

/// en, de, nl, sv, et, fi, it, el-style: one for integer 1
fn rule_one_i1(ops: &PluralOperands) -> PluralCategory {
    if ops.i == 1 && ops.integer() {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

/// tr, hu, bg, da, nb, es, el-style: one for n == 1
fn rule_one_n1(ops: &PluralOperands) -> PluralCategory {
    if ops.n_is(1) {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

/// fr, pt: one for integer part 0 or 1
fn rule_one_i01(ops: &PluralOperands) -> PluralCategory {
    if ops.i <= 1 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

/// ru, uk
fn rule_slavic_east(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if m10 == 1 && m100 != 11 {
        PluralCategory::One
    } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
        PluralCategory::Few
    } else {
        PluralCategory::Many
    }
}

/// pl
fn rule_polish(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if ops.i == 1 {
        PluralCategory::One
    } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
        PluralCategory::Few
    } else {
        PluralCategory::Many
    }
}

/// cs, sk
fn rule_czech(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Many;
    }
    match ops.i {
        1 => PluralCategory::One,
        2..=4 => PluralCategory::Few,
        _ => PluralCategory::Other,
    }
}

/// hr, sr, bs: east-Slavic shape without the many bucket
fn rule_slavic_south(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if m10 == 1 && m100 != 11 {
        PluralCategory::One
    } else if (2..=4).contains(&m10) && !(12..=14).contains(&m100) {
        PluralCategory::Few
    } else {
        PluralCategory::Other
    }
}

/// ar
fn rule_arabic(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    let m100 = ops.i % 100;
    match ops.i {
        0 => PluralCategory::Zero,
        1 => PluralCategory::One,
        2 => PluralCategory::Two,
        _ if (3..=10).contains(&m100) => PluralCategory::Few,
        _ if (11..=99).contains(&m100) => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

/// he
fn rule_hebrew(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    match ops.i {
        1 => PluralCategory::One,
        2 => PluralCategory::Two,
        i if i > 10 && i % 10 == 0 => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

/// ro
fn rule_romanian(ops: &PluralOperands) -> PluralCategory {
    if ops.i == 1 && ops.integer() {
        return PluralCategory::One;
    }
    let m100 = ops.i % 100;
    if !ops.integer() || ops.i == 0 || (ops.i != 1 && (1..=19).contains(&m100)) {
        PluralCategory::Few
    } else {
        PluralCategory::Other
    }
}

/// lt
fn rule_lithuanian(ops: &PluralOperands) -> PluralCategory {
    if ops.f != 0 {
        return PluralCategory::Many;
    }
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if m10 == 1 && !(11..=19).contains(&m100) {
        PluralCategory::One
    } else if (2..=9).contains(&m10) && !(11..=19).contains(&m100) {
        PluralCategory::Few
    } else {
        PluralCategory::Other
    }
}

/// lv
fn rule_latvian(ops: &PluralOperands) -> PluralCategory {
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if ops.integer() && (m10 == 0 || (11..=19).contains(&m100)) {
        PluralCategory::Zero
    } else if ops.integer() && m10 == 1 && m100 != 11 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

/// ga
fn rule_irish(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    match ops.i {
        1 => PluralCategory::One,
        2 => PluralCategory::Two,
        3..=6 => PluralCategory::Few,
        7..=10 => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

/// cy
fn rule_welsh(ops: &PluralOperands) -> PluralCategory {
    if !ops.integer() {
        return PluralCategory::Other;
    }
    match ops.i {
        0 => PluralCategory::Zero,
        1 => PluralCategory::One,
        2 => PluralCategory::Two,
        3 => PluralCategory::Few,
        6 => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}

/// is
fn rule_icelandic(ops: &PluralOperands) -> PluralCategory {
    let m10 = ops.i % 10;
    let m100 = ops.i % 100;
    if ops.integer() && m10 == 1 && m100 != 11 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

fn rule_for_language(language: &str) -> Rule {
    match language {
        "en" | "de" | "nl" | "sv" | "et" | "fi" | "it" | "ca" => rule_one_i1,
        "tr" | "hu" | "bg" | "da" | "nb" | "no" | "es" | "el" => rule_one_n1,
        "fr" | "pt" => rule_one_i01,
        "ru" | "uk" => rule_slavic_east,
        "pl" => rule_polish,
        "cs" | "sk" => rule_czech,
        "hr" | "sr" | "bs" => rule_slavic_south,
        "ar" => rule_arabic,
        "he" => rule_hebrew,
        "ro" => rule_romanian,
        "lt" => rule_lithuanian,
        "lv" => rule_latvian,
        "ga" => rule_irish,
        "cy" => rule_welsh,
        "is" => rule_icelandic,
        "ja" | "zh" | "ko" | "th" | "vi" | "id" => rule_root,
        _ => rule_root,
    }
}

/// Category for a number under a locale's cardinal rules.
///
/// Unknown locales use the root rule rather than failing; a malformed
/// locale code is still an error.
pub fn plural_category(
    locale: &str,
    value: &Decimal,
    precision: Option<u32>,
) -> Result<PluralCategory, LocaleError> {
    let validated = codes::validate_locale(locale)?;
    let rule = rule_for_language(codes::language(&validated.canonical));
    let operands = PluralOperands::new(value, precision);
    Ok(rule(&operands))
}
