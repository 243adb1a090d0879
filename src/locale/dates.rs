//! Date and datetime formatting and parsing
//!
//! Per-locale CLDR-style patterns are converted to chrono format strings.
//! Timezone tokens (`z`, `v`, `V`) are dropped during conversion, so
//! inputs must be pre-stripped of timezone names; era tokens are removed
//! from input text using the locale's era names before pattern matching.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::diagnostics::runtime::FormattingError;
use crate::locale::codes;
use crate::locale::{DateTimeOptions, DateTimeStyle};

/// Date and time patterns for one locale, CLDR token syntax
#[derive(Debug, Clone, Copy)]
struct DatePatterns {
    short: &'static str,
    medium: &'static str,
    long: &'static str,
    time_short: &'static str,
    time_medium: &'static str,
    /// Era names stripped from input before parsing
    eras: &'static [&'static str],
}

const ROOT_PATTERNS: DatePatterns = DatePatterns {
    short: "y-MM-dd",
    medium: "y-MM-dd",
    long: "y-MM-dd",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["CE", "BCE"],
};

const EN_PATTERNS: DatePatterns = DatePatterns {
    short: "M/d/y",
    medium: "MMM d, y",
    long: "MMMM d, y",
    time_short: "h:mm a",
    time_medium: "h:mm:ss a",
    eras: &["AD", "BC", "CE", "BCE"],
};

const EN_GB_PATTERNS: DatePatterns = DatePatterns {
    short: "dd/MM/y",
    medium: "d MMM y",
    long: "d MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["AD", "BC", "CE", "BCE"],
};

const DE_PATTERNS: DatePatterns = DatePatterns {
    short: "dd.MM.y",
    medium: "dd.MM.y",
    long: "dd.MM.y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["n. Chr.", "v. Chr."],
};

const FR_PATTERNS: DatePatterns = DatePatterns {
    short: "dd/MM/y",
    medium: "dd/MM/y",
    long: "dd/MM/y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["ap. J.-C.", "av. J.-C."],
};

const SLASH_DMY_PATTERNS: DatePatterns = DatePatterns {
    short: "dd/MM/y",
    medium: "dd/MM/y",
    long: "dd/MM/y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["CE", "BCE"],
};

const DOT_DMY_PATTERNS: DatePatterns = DatePatterns {
    short: "dd.MM.y",
    medium: "dd.MM.y",
    long: "dd.MM.y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["CE", "BCE"],
};

const ISO_PATTERNS: DatePatterns = DatePatterns {
    short: "y-MM-dd",
    medium: "y-MM-dd",
    long: "y-MM-dd",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["CE", "BCE"],
};

const JA_PATTERNS: DatePatterns = DatePatterns {
    short: "y/MM/dd",
    medium: "y/MM/dd",
    long: "y/MM/dd",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    eras: &["西暦", "紀元前"],
};

fn patterns_for(canonical: &str) -> DatePatterns {
    if canonical.starts_with("en_US") || canonical == "en" {
        return EN_PATTERNS;
    }
    if canonical.starts_with("en_") {
        return EN_GB_PATTERNS;
    }
    match codes::language(canonical) {
        "de" => DE_PATTERNS,
        "ru" | "uk" | "pl" | "cs" | "sk" | "fi" | "et" | "lv" | "lt" | "nb" | "no" | "is"
        | "ro" | "bg" | "sr" | "hr" | "bs" | "tr" => DOT_DMY_PATTERNS,
        "fr" => FR_PATTERNS,
        "es" | "it" | "pt" | "nl" | "el" | "da" | "id" | "vi" | "th" | "he" | "ar" | "ga"
        | "cy" => SLASH_DMY_PATTERNS,
        "sv" | "hu" | "zh" | "ko" => ISO_PATTERNS,
        "ja" => JA_PATTERNS,
        _ => ROOT_PATTERNS,
    }
}

/// Convert a CLDR pattern to a chrono format string.
///
/// Timezone-name tokens are skipped entirely; literal text passes
/// through, with `%` escaped for chrono.
fn cldr_to_chrono(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let chars: Vec<char> = pattern.chars().collect();
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        let run = chars[index..].iter().take_while(|c| **c == ch).count();
        match ch {
            'y' => out.push_str("%Y"),
            'M' => out.push_str(if run >= 4 {
                "%B"
            } else if run == 3 {
                "%b"
            } else {
                "%m"
            }),
            'd' => out.push_str("%d"),
            'H' => out.push_str("%H"),
            'h' => out.push_str("%I"),
            'm' => out.push_str("%M"),
            's' => out.push_str("%S"),
            'a' => out.push_str("%p"),
            // Timezone names are not representable in naive datetimes.
            'z' | 'v' | 'V' | 'Z' | 'G' => {}
            '%' => out.push_str("%%"),
            other => {
                for _ in 0..run {
                    out.push(other);
                }
            }
        }
        index += run;
    }
    out
}

fn style_pattern(patterns: &DatePatterns, style: DateTimeStyle) -> &'static str {
    match style {
        DateTimeStyle::Short => patterns.short,
        DateTimeStyle::Medium => patterns.medium,
        DateTimeStyle::Long | DateTimeStyle::Full => patterns.long,
    }
}

fn time_pattern(patterns: &DatePatterns, style: DateTimeStyle) -> &'static str {
    match style {
        DateTimeStyle::Short => patterns.time_short,
        _ => patterns.time_medium,
    }
}

/// Format a datetime; the time part is included only when a time style is
/// requested
pub fn format_datetime(locale: &str, value: &NaiveDateTime, options: &DateTimeOptions) -> String {
    let canonical = codes::validate_locale(locale)
        .map(|validated| validated.canonical)
        .unwrap_or_else(|_| "root".to_string());
    let patterns = patterns_for(&canonical);

    let date_style = options.date_style.unwrap_or_default();
    let date_format = cldr_to_chrono(style_pattern(&patterns, date_style));
    let mut rendered = value.format(&date_format).to_string();

    if let Some(time_style) = options.time_style {
        let time_format = cldr_to_chrono(time_pattern(&patterns, time_style));
        rendered.push(' ');
        rendered.push_str(&value.format(&time_format).to_string());
    }
    rendered
}

/// Strip the locale's era names and collapse leftover whitespace
fn strip_eras(text: &str, patterns: &DatePatterns) -> String {
    let mut cleaned = text.to_string();
    for era in patterns.eras {
        cleaned = cleaned.replace(era, "");
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn date_formats(patterns: &DatePatterns) -> Vec<String> {
    let mut formats = vec![
        cldr_to_chrono(patterns.short),
        cldr_to_chrono(patterns.medium),
        cldr_to_chrono(patterns.long),
        "%Y-%m-%d".to_string(),
    ];
    formats.dedup();
    formats
}

/// Parse locale-formatted date text
pub fn parse_date(locale: &str, text: &str) -> Result<NaiveDate, FormattingError> {
    let canonical = codes::validate_locale(locale)
        .map(|validated| validated.canonical)
        .map_err(|err| FormattingError::parse_failure("date", text, err.to_string()))?;
    let patterns = patterns_for(&canonical);
    let cleaned = strip_eras(text, &patterns);

    for format in date_formats(&patterns) {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, &format) {
            return Ok(date);
        }
    }
    Err(FormattingError::parse_failure(
        "date",
        text,
        format!("no date pattern for locale {locale:?} matched"),
    ))
}

/// Parse locale-formatted datetime text; date-only input yields midnight
pub fn parse_datetime(locale: &str, text: &str) -> Result<NaiveDateTime, FormattingError> {
    let canonical = codes::validate_locale(locale)
        .map(|validated| validated.canonical)
        .map_err(|err| FormattingError::parse_failure("datetime", text, err.to_string()))?;
    let patterns = patterns_for(&canonical);
    let cleaned = strip_eras(text, &patterns);

    let time_formats = [
        cldr_to_chrono(patterns.time_medium),
        cldr_to_chrono(patterns.time_short),
    ];
    for date_format in date_formats(&patterns) {
        for time_format in &time_formats {
            let combined = format!("{date_format} {time_format}");
            if let Ok(datetime) = NaiveDateTime::parse_from_str(&cleaned, &combined) {
                return Ok(datetime);
            }
        }
    }
    for iso in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(&cleaned, iso) {
            return Ok(datetime);
        }
    }

    match parse_date(locale, text) {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN)),
        Err(_) => Err(FormattingError::parse_failure(
            "datetime",
            text,
            format!("no datetime pattern for locale {locale:?} matched"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cldr_conversion_handles_runs_and_literals() {
        assert_eq!(cldr_to_chrono("dd.MM.y"), "%d.%m.%Y");
        assert_eq!(cldr_to_chrono("MMM d, y"), "%b %d, %Y");
        assert_eq!(cldr_to_chrono("h:mm a"), "%I:%M %p");
        assert_eq!(cldr_to_chrono("y-MM-dd zzzz"), "%Y-%m-%d ");
    }

    #[rstest]
    #[case("en_US", "7/4/2026", 2026, 7, 4)]
    #[case("en_US", "Jul 4, 2026", 2026, 7, 4)]
    #[case("de_DE", "04.07.2026", 2026, 7, 4)]
    #[case("fr_FR", "04/07/2026", 2026, 7, 4)]
    #[case("sv_SE", "2026-07-04", 2026, 7, 4)]
    #[case("tlh", "2026-07-04", 2026, 7, 4)]
    fn date_parsing(
        #[case] locale: &str,
        #[case] text: &str,
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
    ) {
        assert_eq!(parse_date(locale, text).unwrap(), date(y, m, d));
    }

    #[test]
    fn era_names_are_stripped_before_matching() {
        assert_eq!(parse_date("en_US", "7/4/2026 AD").unwrap(), date(2026, 7, 4));
    }

    #[test]
    fn datetime_parsing_accepts_date_only() {
        let parsed = parse_datetime("en_US", "7/4/2026").unwrap();
        assert_eq!(parsed.date(), date(2026, 7, 4));
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn datetime_parsing_with_time() {
        let parsed = parse_datetime("de_DE", "04.07.2026 13:45:10").unwrap();
        assert_eq!(parsed.hour(), 13);
        assert_eq!(parsed.minute(), 45);
    }

    #[test]
    fn unparseable_date_reports_input() {
        let err = parse_date("en_US", "yesterday").unwrap_err();
        assert_eq!(err.parse_type.as_deref(), Some("date"));
        assert_eq!(err.input_value.as_deref(), Some("yesterday"));
    }

    #[test]
    fn formatting_follows_locale_patterns() {
        let value = date(2026, 7, 4).and_hms_opt(13, 45, 0).unwrap();
        assert_eq!(
            format_datetime("de_DE", &value, &DateTimeOptions::default()),
            "04.07.2026"
        );
        let with_time = DateTimeOptions {
            time_style: Some(DateTimeStyle::Short),
            ..DateTimeOptions::default()
        };
        assert_eq!(
            format_datetime("de_DE", &value, &with_time),
            "04.07.2026 13:45"
        );
        assert_eq!(
            format_datetime("en_US", &value, &DateTimeOptions::default()),
            "Jul 04, 2026"
        );
    }
}
