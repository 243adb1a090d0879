//! Diagnostics - Error Taxonomy and Reporting
//!
//! Validation produces [`Diagnostic`] records (data, never panics) with a
//! closed code taxonomy and a severity level. Runtime formatting errors live
//! in [`runtime`]; position lookup in [`line_offsets`]; human-readable
//! rendering in [`formatter`].

pub mod formatter;
pub mod line_offsets;
pub mod runtime;

use serde::{Deserialize, Serialize};

use crate::syntax::span::Span;

/// Severity of a validation diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Closed taxonomy of validation diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    ParseError,
    CriticalParseError,
    DuplicateId,
    NoValueOrAttrs,
    UndefinedReference,
    CircularReference,
    ChainDepthExceeded,
    DuplicateAttribute,
    ShadowWarning,
    SelectNoDefault,
    SelectNoVariants,
    VariantDuplicate,
    NamedArgDuplicate,
    TermNoValue,
    TermPositionalArgsIgnored,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "PARSE_ERROR",
            DiagnosticCode::CriticalParseError => "CRITICAL_PARSE_ERROR",
            DiagnosticCode::DuplicateId => "DUPLICATE_ID",
            DiagnosticCode::NoValueOrAttrs => "NO_VALUE_OR_ATTRS",
            DiagnosticCode::UndefinedReference => "UNDEFINED_REFERENCE",
            DiagnosticCode::CircularReference => "CIRCULAR_REFERENCE",
            DiagnosticCode::ChainDepthExceeded => "CHAIN_DEPTH_EXCEEDED",
            DiagnosticCode::DuplicateAttribute => "DUPLICATE_ATTRIBUTE",
            DiagnosticCode::ShadowWarning => "SHADOW_WARNING",
            DiagnosticCode::SelectNoDefault => "SELECT_NO_DEFAULT",
            DiagnosticCode::SelectNoVariants => "SELECT_NO_VARIANTS",
            DiagnosticCode::VariantDuplicate => "VARIANT_DUPLICATE",
            DiagnosticCode::NamedArgDuplicate => "NAMED_ARG_DUPLICATE",
            DiagnosticCode::TermNoValue => "TERM_NO_VALUE",
            DiagnosticCode::TermPositionalArgsIgnored => "TERM_POSITIONAL_ARGS_IGNORED",
        }
    }

    /// Default severity for this code
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::CriticalParseError
            | DiagnosticCode::DuplicateId
            | DiagnosticCode::NoValueOrAttrs
            | DiagnosticCode::CircularReference
            | DiagnosticCode::ChainDepthExceeded
            | DiagnosticCode::SelectNoDefault
            | DiagnosticCode::SelectNoVariants
            | DiagnosticCode::VariantDuplicate
            | DiagnosticCode::NamedArgDuplicate
            | DiagnosticCode::TermNoValue => Severity::Critical,
            DiagnosticCode::ParseError
            | DiagnosticCode::UndefinedReference
            | DiagnosticCode::DuplicateAttribute
            | DiagnosticCode::ShadowWarning => Severity::Warning,
            DiagnosticCode::TermPositionalArgsIgnored => Severity::Info,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single position-annotated validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Character span into the normalized source, when known
    pub span: Option<Span>,
    /// 1-based line of the span start, when a source is available
    pub line: Option<usize>,
    /// 1-based column of the span start, when a source is available
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            span: None,
            line: None,
            column: None,
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach line/column resolved through a [`line_offsets::LineOffsetCache`]
    pub fn locate(mut self, cache: &line_offsets::LineOffsetCache) -> Self {
        if let Some(span) = &self.span {
            let (line, column) = cache.position(span.start);
            self.line = Some(line);
            self.column = Some(column);
        }
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(
                f,
                "{}:{}: [{}] {}: {}",
                line,
                column,
                self.severity.as_str(),
                self.code.as_str(),
                self.message
            ),
            _ => write!(
                f,
                "[{}] {}: {}",
                self.severity.as_str(),
                self.code.as_str(),
                self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_strings_are_screaming_snake() {
        assert_eq!(DiagnosticCode::DuplicateId.as_str(), "DUPLICATE_ID");
        assert_eq!(
            DiagnosticCode::ChainDepthExceeded.as_str(),
            "CHAIN_DEPTH_EXCEEDED"
        );
    }

    #[test]
    fn display_includes_position_when_located() {
        let cache = line_offsets::LineOffsetCache::new("abc\ndef");
        let diag = Diagnostic::new(DiagnosticCode::ParseError, "unexpected token")
            .with_span(Some(Span::new(4, 5)))
            .locate(&cache);
        let rendered = diag.to_string();
        assert!(rendered.starts_with("2:1:"), "got {rendered}");
    }

    #[test]
    fn severity_ordering_puts_critical_last() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }
}
