//! Locale code validation and canonicalization
//!
//! Codes are ASCII, BCP-47-shaped: alphanumeric subtags joined by `-` or
//! `_`. Standard codes stop at 35 characters; longer codes are accepted up
//! to 1000 characters (flagged as extended) so a hostile code cannot force
//! unbounded work, and anything past that is rejected outright.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::locale::LocaleError;

/// Length ceiling for standard BCP-47 codes
pub const MAX_STANDARD_LENGTH: usize = 35;

/// Absolute ceiling; longer codes are rejected
pub const MAX_EXTENDED_LENGTH: usize = 1_000;

static LOCALE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[a-zA-Z0-9]+([_-][a-zA-Z0-9]+)*\z").expect("locale pattern"));

/// A validated, canonicalized locale code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLocale {
    /// Canonical form: `_`-joined, language lowercased, region uppercased,
    /// script title-cased (e.g. `sr_Latn_RS`)
    pub canonical: String,
    /// True for codes longer than the standard 35-character ceiling
    pub extended: bool,
}

/// Validate shape and length, and canonicalize subtag casing
pub fn validate_locale(code: &str) -> Result<ValidatedLocale, LocaleError> {
    if code.is_empty() {
        return Err(LocaleError::InvalidCode {
            code: code.to_string(),
            reason: "empty code".to_string(),
        });
    }
    if code.len() > MAX_EXTENDED_LENGTH {
        return Err(LocaleError::CodeTooLong {
            length: code.len(),
            max: MAX_EXTENDED_LENGTH,
        });
    }
    if !LOCALE_CODE_RE.is_match(code) {
        return Err(LocaleError::InvalidCode {
            code: code.to_string(),
            reason: "expected alphanumeric subtags joined by '-' or '_'".to_string(),
        });
    }

    let canonical = code
        .split(['-', '_'])
        .enumerate()
        .map(|(index, subtag)| {
            if index == 0 {
                subtag.to_ascii_lowercase()
            } else if subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                subtag.to_ascii_uppercase()
            } else if subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = subtag.chars();
                let first = chars.next().expect("four chars").to_ascii_uppercase();
                let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
                format!("{first}{rest}")
            } else {
                subtag.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("_");

    Ok(ValidatedLocale {
        canonical,
        extended: code.len() > MAX_STANDARD_LENGTH,
    })
}

/// The primary language subtag of an already-canonical code
pub fn language(canonical: &str) -> &str {
    canonical.split('_').next().unwrap_or(canonical)
}

/// The region subtag, when present
pub fn region(canonical: &str) -> Option<&str> {
    canonical
        .split('_')
        .skip(1)
        .find(|subtag| subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_uppercase()))
}

/// Fallback chain from most to least specific: `fr_FR` → `fr`
pub fn lookup_chain(canonical: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let subtags: Vec<&str> = canonical.split('_').collect();
    for end in (1..=subtags.len()).rev() {
        chain.push(subtags[..end].join("_"));
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", "en")]
    #[case("en-US", "en_US")]
    #[case("EN_us", "en_US")]
    #[case("sr-latn-rs", "sr_Latn_RS")]
    #[case("zh-Hans-CN", "zh_Hans_CN")]
    #[case("x0", "x0")]
    fn canonicalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_locale(input).unwrap().canonical, expected);
    }

    #[rstest]
    #[case("")]
    #[case("en--US")]
    #[case("_en")]
    #[case("en_")]
    #[case("en US")]
    #[case("fr@latin")]
    fn malformed_codes_are_rejected(#[case] input: &str) {
        assert!(matches!(
            validate_locale(input),
            Err(LocaleError::InvalidCode { .. })
        ));
    }

    #[test]
    fn trailing_garbage_is_not_accepted() {
        // The anchor must bind to the true end of the string.
        assert!(validate_locale("en_US\nevil").is_err());
    }

    #[test]
    fn long_codes_warn_but_pass_until_the_hard_ceiling() {
        let long = format!("en{}", "_x".repeat(30));
        assert!(long.len() > MAX_STANDARD_LENGTH);
        let validated = validate_locale(&long).unwrap();
        assert!(validated.extended);

        let huge = format!("en{}", "_x".repeat(600));
        assert!(matches!(
            validate_locale(&huge),
            Err(LocaleError::CodeTooLong { .. })
        ));
    }

    #[test]
    fn fallback_chain_strips_subtags_right_to_left() {
        assert_eq!(lookup_chain("sr_Latn_RS"), vec!["sr_Latn_RS", "sr_Latn", "sr"]);
    }

    #[test]
    fn language_and_region_extraction() {
        assert_eq!(language("fr_FR"), "fr");
        assert_eq!(region("fr_FR"), Some("FR"));
        assert_eq!(region("fr"), None);
    }
}
