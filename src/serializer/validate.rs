//! Structural validation before emission
//!
//! Serializing with `validate` enabled refuses ASTs the parser could never
//! have produced: malformed identifier names, select expressions without
//! exactly one default, and variant keys that collide once numeric keys
//! are compared by decimal value.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::syntax::ast::{
    Attribute, Message, NamedArgument, SelectExpression, Term, VariableReference, VariantKey,
};
use crate::syntax::depth::{DepthExceeded, DepthGuard};
use crate::syntax::visit::{self, AstVisitor};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("identifier pattern compiles"));

/// Visitor collecting structural problems
pub(crate) struct StructureValidator {
    guard: DepthGuard,
    errors: Vec<String>,
}

impl StructureValidator {
    pub(crate) fn new(guard: DepthGuard) -> Self {
        Self {
            guard,
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn check_identifier(&mut self, name: &str, context: &str) {
        if !IDENTIFIER_RE.is_match(name) {
            self.errors
                .push(format!("invalid {context} identifier: {name:?}"));
        }
    }
}

impl AstVisitor for StructureValidator {
    fn guard(&self) -> &DepthGuard {
        &self.guard
    }

    fn visit_message(&mut self, node: &Message) -> Result<(), DepthExceeded> {
        self.check_identifier(&node.id.name, "message");
        visit::walk_message(self, node)
    }

    fn visit_term(&mut self, node: &Term) -> Result<(), DepthExceeded> {
        self.check_identifier(&node.id.name, "term");
        visit::walk_term(self, node)
    }

    fn visit_attribute(&mut self, node: &Attribute) -> Result<(), DepthExceeded> {
        self.check_identifier(&node.id.name, "attribute");
        visit::walk_attribute(self, node)
    }

    fn visit_variable_reference(&mut self, node: &VariableReference) -> Result<(), DepthExceeded> {
        self.check_identifier(&node.id.name, "variable");
        Ok(())
    }

    fn visit_named_argument(&mut self, node: &NamedArgument) -> Result<(), DepthExceeded> {
        self.check_identifier(&node.name.name, "argument");
        visit::walk_named_argument(self, node)
    }

    fn visit_select_expression(&mut self, node: &SelectExpression) -> Result<(), DepthExceeded> {
        if node.variants.is_empty() {
            self.errors
                .push("select expression has no variants".to_string());
        }

        let default_count = node.variants.iter().filter(|v| v.is_default).count();
        let index_marks_default = node
            .variants
            .get(node.default_index)
            .map(|v| v.is_default)
            .unwrap_or(false);
        if default_count != 1 || !index_marks_default {
            self.errors.push(format!(
                "select expression must have exactly one default variant, found {default_count}"
            ));
        }

        let mut seen = HashSet::new();
        for variant in &node.variants {
            if let VariantKey::Identifier(id) = &variant.key {
                self.check_identifier(&id.name, "variant key");
            }
            if !seen.insert(variant.key.canonical()) {
                self.errors.push(format!(
                    "duplicate variant key: {}",
                    match &variant.key {
                        VariantKey::Identifier(id) => id.name.clone(),
                        VariantKey::Number(num) => num.raw.clone(),
                    }
                ));
            }
        }

        visit::walk_select_expression(self, node)
    }
}
