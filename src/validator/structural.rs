//! Pass 2: structural checks
//!
//! Messages and terms occupy separate namespaces; duplicates are detected
//! within each. Entries shadowing already-known bundle entries warn, and
//! entries with neither value nor attributes are flagged.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::ast::{Attribute, Entry, Resource};
use crate::syntax::span::Span;
use crate::validator::ValidationOptions;

pub(crate) fn run(
    resource: &Resource,
    options: &ValidationOptions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen_messages: HashMap<&str, Option<Span>> = HashMap::new();
    let mut seen_terms: HashMap<&str, Option<Span>> = HashMap::new();

    for entry in &resource.entries {
        match entry {
            Entry::Message(message) => {
                if seen_messages.insert(&message.id.name, message.span).is_some() {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateId,
                            format!("duplicate message id \"{}\"", message.id.name),
                        )
                        .with_span(message.span),
                    );
                }
                if options.known_messages.contains(&message.id.name) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::ShadowWarning,
                            format!(
                                "message \"{}\" shadows an already-registered message",
                                message.id.name
                            ),
                        )
                        .with_span(message.span),
                    );
                }
                if message.value.is_none() && message.attributes.is_empty() {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::NoValueOrAttrs,
                            format!(
                                "message \"{}\" has neither a value nor attributes",
                                message.id.name
                            ),
                        )
                        .with_span(message.span),
                    );
                }
                check_duplicate_attributes(&message.id.name, &message.attributes, diagnostics);
            }
            Entry::Term(term) => {
                if seen_terms.insert(&term.id.name, term.span).is_some() {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateId,
                            format!("duplicate term id \"-{}\"", term.id.name),
                        )
                        .with_span(term.span),
                    );
                }
                if options.known_terms.contains(&term.id.name) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::ShadowWarning,
                            format!(
                                "term \"-{}\" shadows an already-registered term",
                                term.id.name
                            ),
                        )
                        .with_span(term.span),
                    );
                }
                check_duplicate_attributes(&term.id.name, &term.attributes, diagnostics);
            }
            Entry::Comment(_) | Entry::Junk(_) => {}
        }
    }
}

fn check_duplicate_attributes(
    entry_id: &str,
    attributes: &[Attribute],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for attribute in attributes {
        let count = seen.entry(&attribute.id.name).or_insert(0);
        *count += 1;
        if *count == 2 {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DuplicateAttribute,
                    format!(
                        "attribute \"{}\" appears more than once on \"{}\"; the last one wins",
                        attribute.id.name, entry_id
                    ),
                )
                .with_span(attribute.span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::DiagnosticCode;
    use crate::parser::parse;
    use crate::validator::{ResourceValidator, ValidationOptions};

    fn codes(source: &str, options: ValidationOptions) -> Vec<DiagnosticCode> {
        let resource = parse(source).unwrap();
        ResourceValidator::new(options)
            .validate(&resource, Some(source))
            .diagnostics
            .iter()
            .map(|d| d.code)
            .collect()
    }

    #[test]
    fn duplicate_message_ids_are_critical() {
        let found = codes("m = x\nm = y\n", ValidationOptions::default());
        assert_eq!(found, vec![DiagnosticCode::DuplicateId]);
    }

    #[test]
    fn messages_and_terms_are_separate_namespaces() {
        let found = codes("same = x\n-same = y\n", ValidationOptions::default());
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn duplicate_attribute_warns_once() {
        let found = codes(
            "-b = X\n    .legal = Old\n    .legal = New\n    .legal = Newest\n",
            ValidationOptions::default(),
        );
        assert_eq!(found, vec![DiagnosticCode::DuplicateAttribute]);
    }

    #[test]
    fn shadowing_known_entries_warns() {
        let mut options = ValidationOptions::default();
        options.known_messages.insert("m".to_string());
        let found = codes("m = x\n", options);
        assert_eq!(found, vec![DiagnosticCode::ShadowWarning]);
    }
}
