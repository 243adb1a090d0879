//! Pass 6: Fluent-specific semantic rules
//!
//! Select expressions need variants and exactly one default; variant keys
//! must be unique with numeric keys compared by decimal value (the raw
//! source form preserves precision, and `Decimal` never renders in
//! scientific notation); terms need a non-empty value; positional
//! arguments on term references are ignored at runtime and advised
//! against; named arguments must be unique per call.

use std::collections::HashSet;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::ast::{
    CallArguments, Entry, Resource, SelectExpression, TermReference, VariantKey,
};
use crate::syntax::depth::{DepthExceeded, DepthGuard, HOST_STACK_BUDGET};
use crate::syntax::visit::{self, AstVisitor};

pub(crate) fn run(resource: &Resource, diagnostics: &mut Vec<Diagnostic>) {
    for entry in &resource.entries {
        if let Entry::Term(term) = entry {
            if term.value.elements.is_empty() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::TermNoValue,
                        format!("term \"-{}\" has an empty value", term.id.name),
                    )
                    .with_span(term.span),
                );
            }
        }
    }

    let mut checker = SemanticChecker {
        guard: DepthGuard::new(HOST_STACK_BUDGET),
        diagnostics: Vec::new(),
    };
    let _ = checker.visit_resource(resource);
    diagnostics.append(&mut checker.diagnostics);
}

struct SemanticChecker {
    guard: DepthGuard,
    diagnostics: Vec<Diagnostic>,
}

impl AstVisitor for SemanticChecker {
    fn guard(&self) -> &DepthGuard {
        &self.guard
    }

    fn visit_select_expression(&mut self, node: &SelectExpression) -> Result<(), DepthExceeded> {
        if node.variants.is_empty() {
            self.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::SelectNoVariants,
                    "select expression has no variants",
                )
                .with_span(node.span),
            );
        } else {
            let defaults = node.variants.iter().filter(|v| v.is_default).count();
            if defaults != 1 {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::SelectNoDefault,
                        format!(
                            "select expression must have exactly one default variant, found {defaults}"
                        ),
                    )
                    .with_span(node.span),
                );
            }
        }

        let mut seen = HashSet::new();
        for variant in &node.variants {
            if !seen.insert(variant.key.canonical()) {
                let rendered = match &variant.key {
                    VariantKey::Identifier(id) => id.name.clone(),
                    VariantKey::Number(num) => num.raw.clone(),
                };
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::VariantDuplicate,
                        format!("duplicate variant key [{rendered}]"),
                    )
                    .with_span(variant.span),
                );
            }
        }

        visit::walk_select_expression(self, node)
    }

    fn visit_term_reference(&mut self, node: &TermReference) -> Result<(), DepthExceeded> {
        if let Some(arguments) = &node.arguments {
            if !arguments.positional.is_empty() {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::TermPositionalArgsIgnored,
                        format!(
                            "positional arguments on \"-{}\" are ignored; terms only accept named arguments",
                            node.id.name
                        ),
                    )
                    .with_span(node.span),
                );
            }
        }
        visit::walk_term_reference(self, node)
    }

    fn visit_call_arguments(&mut self, node: &CallArguments) -> Result<(), DepthExceeded> {
        let mut seen = HashSet::new();
        for named in &node.named {
            if !seen.insert(named.name.name.as_str()) {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::NamedArgDuplicate,
                        format!("named argument \"{}\" appears twice", named.name.name),
                    )
                    .with_span(named.span),
                );
            }
        }
        visit::walk_call_arguments(self, node)
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::DiagnosticCode;
    use crate::parser::parse;
    use crate::syntax::ast::*;
    use crate::validator::validate_resource;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn positional_term_arguments_are_advisory() {
        let source = "-brand = X\nm = { -brand($x, case: \"upper\") }\n";
        let resource = parse(source).unwrap();
        let result = validate_resource(&resource, Some(source));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].code,
            DiagnosticCode::TermPositionalArgsIgnored
        );
        assert!(result.is_valid());
    }

    fn select_resource(variants: Vec<Variant>, default_index: usize) -> Resource {
        Resource::new(vec![Entry::Message(Message::new(
            Identifier::new("m"),
            Some(Pattern::new(vec![PatternElement::Placeable(
                Placeable::new(Expression::Select(SelectExpression {
                    selector: Box::new(Expression::VariableReference(VariableReference {
                        id: Identifier::new("n"),
                        span: None,
                    })),
                    variants,
                    default_index,
                    span: None,
                })),
            )])),
            vec![],
        ))])
    }

    fn variant(key: VariantKey, is_default: bool) -> Variant {
        Variant {
            key,
            value: Pattern::new(vec![PatternElement::Text(TextElement::new("x"))]),
            is_default,
            span: None,
        }
    }

    #[test]
    fn select_without_variants_is_critical() {
        let resource = select_resource(vec![], 0);
        let result = validate_resource(&resource, None);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::SelectNoVariants));
        assert!(!result.is_valid());
    }

    #[test]
    fn numeric_keys_collide_by_value() {
        let resource = select_resource(
            vec![
                variant(
                    VariantKey::Number(NumberLiteral::new(Decimal::from_str("1").unwrap(), "1")),
                    false,
                ),
                variant(
                    VariantKey::Number(NumberLiteral::new(
                        Decimal::from_str("1.0").unwrap(),
                        "1.0",
                    )),
                    true,
                ),
            ],
            1,
        );
        let result = validate_resource(&resource, None);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::VariantDuplicate));
    }

    #[test]
    fn empty_term_value_is_flagged() {
        let resource = Resource::new(vec![Entry::Term(Term::new(
            Identifier::new("empty"),
            Pattern::new(vec![]),
            vec![],
        ))]);
        let result = validate_resource(&resource, None);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::TermNoValue));
    }

    #[test]
    fn message_without_value_or_attributes_is_flagged() {
        let resource = Resource::new(vec![Entry::Message(Message::new(
            Identifier::new("hollow"),
            None,
            vec![],
        ))]);
        let result = validate_resource(&resource, None);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::NoValueOrAttrs));
    }
}
