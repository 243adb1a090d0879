//! Runtime error taxonomy
//!
//! Resolution never panics on bad input: every failure is recorded as a
//! [`FormattingError`] carrying the fallback string that was (or would be)
//! substituted into the output. Strict mode converts accumulated errors into
//! an [`IntegrityError`] at the `format_pattern` boundary only.

use serde::{Deserialize, Serialize};

/// Closed taxonomy of runtime resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormattingErrorKind {
    ReferenceNotFound,
    VariableNotFound,
    TermNotFound,
    FunctionNotFound,
    FunctionArity,
    CyclicReference,
    MaxDepthExceeded,
    PluralSupportUnavailable,
    FormattingError,
}

impl FormattingErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormattingErrorKind::ReferenceNotFound => "REFERENCE_NOT_FOUND",
            FormattingErrorKind::VariableNotFound => "VARIABLE_NOT_FOUND",
            FormattingErrorKind::TermNotFound => "TERM_NOT_FOUND",
            FormattingErrorKind::FunctionNotFound => "FUNCTION_NOT_FOUND",
            FormattingErrorKind::FunctionArity => "FUNCTION_ARITY",
            FormattingErrorKind::CyclicReference => "CYCLIC_REFERENCE",
            FormattingErrorKind::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
            FormattingErrorKind::PluralSupportUnavailable => "PLURAL_SUPPORT_UNAVAILABLE",
            FormattingErrorKind::FormattingError => "FORMATTING_ERROR",
        }
    }
}

/// A runtime resolution or formatting failure
///
/// Carries the fallback string substituted into the output, and, for the
/// inverse-parsing helpers (`parse_decimal` and friends), the kind of value
/// being parsed plus the offending input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingError {
    pub kind: FormattingErrorKind,
    pub message: String,
    /// The string substituted into the formatted output in place of the value
    pub fallback_value: Option<String>,
    /// For inverse parsing: "decimal", "number", "currency", "date", "datetime"
    pub parse_type: Option<String>,
    /// For inverse parsing: the input text that failed to parse
    pub input_value: Option<String>,
}

impl FormattingError {
    pub fn new(kind: FormattingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fallback_value: None,
            parse_type: None,
            input_value: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_value = Some(fallback.into());
        self
    }

    /// Build a parse failure for the inverse-parsing surface
    pub fn parse_failure(
        parse_type: &str,
        input_value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: FormattingErrorKind::FormattingError,
            message: message.into(),
            fallback_value: None,
            parse_type: Some(parse_type.to_string()),
            input_value: Some(input_value.into()),
        }
    }
}

impl std::fmt::Display for FormattingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for FormattingError {}

/// Strict-mode integrity failures raised at the `format_pattern` boundary
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityError {
    /// The bundle holds unparseable source regions (Junk entries)
    Syntax {
        /// Raw content of the junk regions that poisoned the bundle
        junk: Vec<String>,
    },
    /// Resolution accumulated errors; `fallback` is the string non-strict
    /// mode would have returned
    Formatting {
        fallback: String,
        errors: Vec<FormattingError>,
    },
}

impl std::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityError::Syntax { junk } => {
                write!(f, "resource contains {} unparseable region(s)", junk.len())
            }
            IntegrityError::Formatting { fallback, errors } => write!(
                f,
                "formatting produced {} error(s); fallback value: {:?}",
                errors.len(),
                fallback
            ),
        }
    }
}

impl std::error::Error for IntegrityError {}
