//! Entry introspection
//!
//! Walks an entry's AST through the depth-guarded reference collector and
//! reports what a caller must supply: variable names, referenced messages
//! and terms, function names, and whether any pattern selects. Results
//! are memoized per bundle; the memo is read-mostly and a lost race costs
//! a redundant computation, never corruption.

use serde::Serialize;

use crate::validator::references::ReferenceCollector;

/// What one message or term needs and touches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryIntrospection {
    /// Variables the entry expects from the caller
    pub variables: Vec<String>,
    /// Messages the entry references
    pub message_references: Vec<String>,
    /// Terms the entry references
    pub term_references: Vec<String>,
    /// Functions the entry calls
    pub functions: Vec<String>,
    /// Whether any pattern contains a select expression
    pub has_selectors: bool,
    /// Attribute names in declaration order
    pub attributes: Vec<String>,
}

fn from_set(
    set: crate::validator::references::ReferenceSet,
    attributes: Vec<String>,
) -> EntryIntrospection {
    EntryIntrospection {
        variables: set.variables.iter().cloned().collect(),
        message_references: set.messages.iter().cloned().collect(),
        term_references: set.terms.iter().cloned().collect(),
        functions: set.functions.iter().cloned().collect(),
        has_selectors: set.has_selectors,
        attributes,
    }
}

pub(crate) fn introspect_message(
    message: &crate::syntax::ast::Message,
    max_depth: usize,
) -> EntryIntrospection {
    use crate::syntax::visit::AstVisitor;
    let mut collector = ReferenceCollector::new(max_depth);
    let _ = collector.visit_message(message);
    let attributes = message
        .attributes
        .iter()
        .map(|attribute| attribute.id.name.clone())
        .collect();
    from_set(collector.into_set(), attributes)
}

pub(crate) fn introspect_term(
    term: &crate::syntax::ast::Term,
    max_depth: usize,
) -> EntryIntrospection {
    use crate::syntax::visit::AstVisitor;
    let mut collector = ReferenceCollector::new(max_depth);
    let _ = collector.visit_term(term);
    let attributes = term
        .attributes
        .iter()
        .map(|attribute| attribute.id.name.clone())
        .collect();
    from_set(collector.into_set(), attributes)
}
