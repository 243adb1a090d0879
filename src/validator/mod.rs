//! Resource Validation - Six-Pass Analysis
//!
//! Validates a parsed resource, optionally against knowledge from a
//! surrounding bundle (already-registered entries and their dependency
//! sets). Passes run in order:
//!
//! 1. Syntax - junk entries become parse-error diagnostics
//! 2. Structural - duplicate ids, missing values, duplicate attributes,
//!    shadowing of known entries
//! 3. References - unresolved message/term/variable references
//! 4. Cycles - circular reference detection over the unified graph
//! 5. Chain depth - longest resolution chains against the runtime limit
//! 6. Semantic - select-expression and call-argument rules
//!
//! All findings are [`Diagnostic`] data; validation never fails. Positions
//! are resolved through one [`LineOffsetCache`] shared by every pass.

mod cycles;
pub mod references;
mod semantic;
mod structural;

use std::collections::{HashMap, HashSet};

use crate::diagnostics::line_offsets::LineOffsetCache;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Severity};
use crate::syntax::ast::{Entry, Resource};

/// Knowledge injected from a surrounding bundle plus analysis limits
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Message ids already registered elsewhere
    pub known_messages: HashSet<String>,
    /// Term ids already registered elsewhere
    pub known_terms: HashSet<String>,
    /// Argument names the caller promises to provide; `None` disables the
    /// variable-reference check
    pub known_variables: Option<HashSet<String>>,
    /// Prefixed dependency sets (`"msg:id"` / `"term:id"` on both sides)
    /// of entries registered elsewhere
    pub known_dependencies: HashMap<String, HashSet<String>>,
    /// Longest tolerated resolution chain; zero means the default
    pub max_chain_depth: usize,
}

impl ValidationOptions {
    pub(crate) fn chain_depth_limit(&self) -> usize {
        if self.max_chain_depth == 0 {
            crate::parser::DEFAULT_MAX_NESTING_DEPTH
        } else {
            self.max_chain_depth
        }
    }
}

/// The outcome of validating one resource
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// No critical findings
    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Critical)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Render the findings as plain text, one per line
    pub fn format_report(&self) -> String {
        crate::diagnostics::formatter::render_plain(&self.diagnostics)
    }
}

/// Configured validator
#[derive(Debug, Clone, Default)]
pub struct ResourceValidator {
    options: ValidationOptions,
}

impl ResourceValidator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Run all six passes. `source` enables line/column annotation and
    /// should be the same normalized text the resource was parsed from.
    pub fn validate(&self, resource: &Resource, source: Option<&str>) -> ValidationResult {
        let offsets = source.map(LineOffsetCache::new);
        let mut diagnostics = Vec::new();

        self.syntax_pass(resource, &mut diagnostics);
        structural::run(resource, &self.options, &mut diagnostics);
        references::run(resource, &self.options, &mut diagnostics);
        cycles::run(resource, &self.options, &mut diagnostics);
        semantic::run(resource, &mut diagnostics);

        if let Some(offsets) = &offsets {
            diagnostics = diagnostics
                .into_iter()
                .map(|diagnostic| diagnostic.locate(offsets))
                .collect();
        }
        ValidationResult { diagnostics }
    }

    /// Pass 1: junk entries carry their parser annotations forward
    fn syntax_pass(&self, resource: &Resource, diagnostics: &mut Vec<Diagnostic>) {
        for entry in &resource.entries {
            let Entry::Junk(junk) = entry else { continue };
            if junk.annotations.is_empty() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::CriticalParseError,
                        format!(
                            "unparseable region with no recovery information ({} chars)",
                            junk.content.chars().count()
                        ),
                    )
                    .with_span(junk.span),
                );
                continue;
            }
            for annotation in &junk.annotations {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::ParseError,
                        format!("{}: {}", annotation.code, annotation.message),
                    )
                    .with_span(annotation.span.or(junk.span)),
                );
            }
        }
    }
}

/// Validate with default options
pub fn validate_resource(resource: &Resource, source: Option<&str>) -> ValidationResult {
    ResourceValidator::default().validate(resource, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn codes(result: &ValidationResult) -> Vec<DiagnosticCode> {
        result.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_resource_validates() {
        let source = "msg = hello\nother = { msg }\n";
        let resource = parse(source).unwrap();
        let result = validate_resource(&resource, Some(source));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert!(result.is_valid());
    }

    #[test]
    fn junk_produces_located_parse_errors() {
        let source = "=== bad ===\nok = v\n";
        let resource = parse(source).unwrap();
        let result = validate_resource(&resource, Some(source));
        assert_eq!(codes(&result), vec![DiagnosticCode::ParseError]);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.line, Some(1));
        assert!(result.is_valid(), "parse errors alone are not critical");
    }

    #[test]
    fn report_renders_one_line_per_finding() {
        let source = "m = x\nm = y\n";
        let resource = parse(source).unwrap();
        let result = validate_resource(&resource, Some(source));
        let report = result.format_report();
        assert!(report.contains("DUPLICATE_ID"));
    }
}
