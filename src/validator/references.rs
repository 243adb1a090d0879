//! Pass 3: reference resolution checks, plus the shared reference collector
//!
//! The collector walks one entry and records everything it points at:
//! variables, messages, terms, and functions. The cycle and chain-depth
//! passes and bundle introspection reuse it.

use std::collections::BTreeSet;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::ast::{
    Entry, FunctionReference, MessageReference, Resource, SelectExpression, TermReference,
    VariableReference,
};
use crate::syntax::depth::{DepthExceeded, DepthGuard};
use crate::syntax::visit::{self, AstVisitor};
use crate::validator::ValidationOptions;

/// Everything a single entry references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    pub variables: BTreeSet<String>,
    /// Referenced message ids, without attribute qualifiers
    pub messages: BTreeSet<String>,
    /// Referenced term ids, without attribute qualifiers
    pub terms: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub has_selectors: bool,
}

impl ReferenceSet {
    /// Dependency set keyed the way the reference graph expects:
    /// `"msg:{id}"` and `"term:{id}"` on both sides of every edge
    pub fn prefixed_dependencies(&self) -> BTreeSet<String> {
        self.messages
            .iter()
            .map(|id| format!("msg:{id}"))
            .chain(self.terms.iter().map(|id| format!("term:{id}")))
            .collect()
    }
}

/// Visitor accumulating a [`ReferenceSet`]
pub struct ReferenceCollector {
    guard: DepthGuard,
    set: ReferenceSet,
}

impl ReferenceCollector {
    pub fn new(max_depth: usize) -> Self {
        Self {
            guard: DepthGuard::new(max_depth),
            set: ReferenceSet::default(),
        }
    }

    pub fn into_set(self) -> ReferenceSet {
        self.set
    }

    /// Collect references from one entry; depth overflow yields the
    /// partial set gathered so far.
    pub fn collect(entry: &Entry, max_depth: usize) -> ReferenceSet {
        let mut collector = Self::new(max_depth);
        let _ = collector.visit_entry(entry);
        collector.into_set()
    }
}

impl AstVisitor for ReferenceCollector {
    fn guard(&self) -> &DepthGuard {
        &self.guard
    }

    fn visit_variable_reference(&mut self, node: &VariableReference) -> Result<(), DepthExceeded> {
        self.set.variables.insert(node.id.name.clone());
        Ok(())
    }

    fn visit_message_reference(&mut self, node: &MessageReference) -> Result<(), DepthExceeded> {
        self.set.messages.insert(node.id.name.clone());
        Ok(())
    }

    fn visit_term_reference(&mut self, node: &TermReference) -> Result<(), DepthExceeded> {
        self.set.terms.insert(node.id.name.clone());
        visit::walk_term_reference(self, node)
    }

    fn visit_function_reference(&mut self, node: &FunctionReference) -> Result<(), DepthExceeded> {
        self.set.functions.insert(node.id.name.clone());
        visit::walk_function_reference(self, node)
    }

    fn visit_select_expression(&mut self, node: &SelectExpression) -> Result<(), DepthExceeded> {
        self.set.has_selectors = true;
        visit::walk_select_expression(self, node)
    }
}

pub(crate) fn run(
    resource: &Resource,
    options: &ValidationOptions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Ids defined in this resource resolve alongside the bundle's.
    let mut local_messages = BTreeSet::new();
    let mut local_terms = BTreeSet::new();
    for entry in &resource.entries {
        match entry {
            Entry::Message(message) => {
                local_messages.insert(message.id.name.clone());
            }
            Entry::Term(term) => {
                local_terms.insert(term.id.name.clone());
            }
            _ => {}
        }
    }

    for entry in &resource.entries {
        let (id, span, kind) = match entry {
            Entry::Message(message) => (&message.id.name, message.span, "message"),
            Entry::Term(term) => (&term.id.name, term.span, "term"),
            _ => continue,
        };
        let set = ReferenceCollector::collect(entry, options.chain_depth_limit());

        for target in &set.messages {
            if !local_messages.contains(target) && !options.known_messages.contains(target) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::UndefinedReference,
                        format!("{kind} \"{id}\" references unknown message \"{target}\""),
                    )
                    .with_span(span),
                );
            }
        }
        for target in &set.terms {
            if !local_terms.contains(target) && !options.known_terms.contains(target) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::UndefinedReference,
                        format!("{kind} \"{id}\" references unknown term \"-{target}\""),
                    )
                    .with_span(span),
                );
            }
        }
        if let Some(known_variables) = &options.known_variables {
            for variable in &set.variables {
                if !known_variables.contains(variable) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::UndefinedReference,
                            format!("{kind} \"{id}\" uses unprovided variable \"${variable}\""),
                        )
                        .with_span(span),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::validator::{ResourceValidator, ValidationOptions};

    #[test]
    fn collector_gathers_every_reference_kind() {
        let source = "m = { $n ->\n    [one] { -brand } and { other.title }\n   *[other] { NUMBER($n) }\n}\n";
        let resource = parse(source).unwrap();
        let set = ReferenceCollector::collect(&resource.entries[0], 100);
        assert!(set.variables.contains("n"));
        assert!(set.terms.contains("brand"));
        assert!(set.messages.contains("other"));
        assert!(set.functions.contains("NUMBER"));
        assert!(set.has_selectors);
        assert_eq!(
            set.prefixed_dependencies(),
            ["msg:other", "term:brand"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        );
    }

    #[test]
    fn unresolved_references_are_reported() {
        let source = "m = { missing } { -gone }\n";
        let resource = parse(source).unwrap();
        let result = ResourceValidator::default().validate(&resource, Some(source));
        let unresolved: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code == crate::diagnostics::DiagnosticCode::UndefinedReference)
            .collect();
        assert_eq!(unresolved.len(), 2);
    }

    #[test]
    fn known_entries_resolve_references() {
        let source = "m = { known }\n";
        let resource = parse(source).unwrap();
        let mut options = ValidationOptions::default();
        options.known_messages.insert("known".to_string());
        let result = ResourceValidator::new(options).validate(&resource, Some(source));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn variable_check_runs_only_with_known_args() {
        let source = "m = { $name }\n";
        let resource = parse(source).unwrap();

        let silent = ResourceValidator::default().validate(&resource, Some(source));
        assert!(silent.diagnostics.is_empty());

        let mut options = ValidationOptions::default();
        options.known_variables = Some(std::collections::HashSet::new());
        let result = ResourceValidator::new(options).validate(&resource, Some(source));
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("$name"));
    }
}
