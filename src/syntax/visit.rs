//! Visitor and transformer protocol over the AST
//!
//! [`AstVisitor`] dispatches by node type with default methods that walk
//! statically known child fields. Depth is claimed by the walk functions,
//! not by individual visitor methods, so custom `visit_*` overrides that
//! delegate back to `walk_*` cannot bypass the guard. [`AstTransformer`]
//! follows the same shape but rebuilds nodes, returning modified copies.

use crate::syntax::ast::*;
use crate::syntax::depth::{DepthExceeded, DepthGuard};
use crate::syntax::span::Span;

/// Read-only visitor with depth-guarded traversal
pub trait AstVisitor {
    /// The recursion budget used by the walk functions
    fn guard(&self) -> &DepthGuard;

    fn visit_resource(&mut self, node: &Resource) -> Result<(), DepthExceeded> {
        walk_resource(self, node)
    }

    fn visit_entry(&mut self, node: &Entry) -> Result<(), DepthExceeded> {
        walk_entry(self, node)
    }

    fn visit_message(&mut self, node: &Message) -> Result<(), DepthExceeded> {
        walk_message(self, node)
    }

    fn visit_term(&mut self, node: &Term) -> Result<(), DepthExceeded> {
        walk_term(self, node)
    }

    fn visit_attribute(&mut self, node: &Attribute) -> Result<(), DepthExceeded> {
        walk_attribute(self, node)
    }

    fn visit_comment(&mut self, _node: &Comment) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_junk(&mut self, _node: &Junk) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_pattern(&mut self, node: &Pattern) -> Result<(), DepthExceeded> {
        walk_pattern(self, node)
    }

    fn visit_text_element(&mut self, _node: &TextElement) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_placeable(&mut self, node: &Placeable) -> Result<(), DepthExceeded> {
        walk_placeable(self, node)
    }

    fn visit_expression(&mut self, node: &Expression) -> Result<(), DepthExceeded> {
        walk_expression(self, node)
    }

    fn visit_string_literal(&mut self, _node: &StringLiteral) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_number_literal(&mut self, _node: &NumberLiteral) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_variable_reference(&mut self, _node: &VariableReference) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_message_reference(&mut self, _node: &MessageReference) -> Result<(), DepthExceeded> {
        Ok(())
    }

    fn visit_term_reference(&mut self, node: &TermReference) -> Result<(), DepthExceeded> {
        walk_term_reference(self, node)
    }

    fn visit_function_reference(&mut self, node: &FunctionReference) -> Result<(), DepthExceeded> {
        walk_function_reference(self, node)
    }

    fn visit_select_expression(&mut self, node: &SelectExpression) -> Result<(), DepthExceeded> {
        walk_select_expression(self, node)
    }

    fn visit_variant(&mut self, node: &Variant) -> Result<(), DepthExceeded> {
        walk_variant(self, node)
    }

    fn visit_call_arguments(&mut self, node: &CallArguments) -> Result<(), DepthExceeded> {
        walk_call_arguments(self, node)
    }

    fn visit_named_argument(&mut self, node: &NamedArgument) -> Result<(), DepthExceeded> {
        walk_named_argument(self, node)
    }
}

pub fn walk_resource<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Resource,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    for entry in &node.entries {
        visitor.visit_entry(entry)?;
    }
    Ok(())
}

pub fn walk_entry<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Entry,
) -> Result<(), DepthExceeded> {
    match node {
        Entry::Message(message) => visitor.visit_message(message),
        Entry::Term(term) => visitor.visit_term(term),
        Entry::Comment(comment) => visitor.visit_comment(comment),
        Entry::Junk(junk) => visitor.visit_junk(junk),
    }
}

pub fn walk_message<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Message,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    if let Some(value) = &node.value {
        visitor.visit_pattern(value)?;
    }
    for attribute in &node.attributes {
        visitor.visit_attribute(attribute)?;
    }
    Ok(())
}

pub fn walk_term<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Term,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_pattern(&node.value)?;
    for attribute in &node.attributes {
        visitor.visit_attribute(attribute)?;
    }
    Ok(())
}

pub fn walk_attribute<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Attribute,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_pattern(&node.value)
}

pub fn walk_pattern<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Pattern,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    for element in &node.elements {
        match element {
            PatternElement::Text(text) => visitor.visit_text_element(text)?,
            PatternElement::Placeable(placeable) => visitor.visit_placeable(placeable)?,
        }
    }
    Ok(())
}

pub fn walk_placeable<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Placeable,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_expression(&node.expression)
}

pub fn walk_expression<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Expression,
) -> Result<(), DepthExceeded> {
    match node {
        Expression::StringLiteral(lit) => visitor.visit_string_literal(lit),
        Expression::NumberLiteral(lit) => visitor.visit_number_literal(lit),
        Expression::VariableReference(var) => visitor.visit_variable_reference(var),
        Expression::MessageReference(msg) => visitor.visit_message_reference(msg),
        Expression::TermReference(term) => visitor.visit_term_reference(term),
        Expression::FunctionReference(func) => visitor.visit_function_reference(func),
        Expression::Select(select) => visitor.visit_select_expression(select),
        Expression::Placeable(placeable) => visitor.visit_placeable(placeable),
    }
}

pub fn walk_term_reference<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &TermReference,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    if let Some(arguments) = &node.arguments {
        visitor.visit_call_arguments(arguments)?;
    }
    Ok(())
}

pub fn walk_function_reference<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &FunctionReference,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_call_arguments(&node.arguments)
}

pub fn walk_select_expression<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &SelectExpression,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_expression(&node.selector)?;
    for variant in &node.variants {
        visitor.visit_variant(variant)?;
    }
    Ok(())
}

pub fn walk_variant<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &Variant,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    if let VariantKey::Number(num) = &node.key {
        visitor.visit_number_literal(num)?;
    }
    visitor.visit_pattern(&node.value)
}

pub fn walk_call_arguments<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &CallArguments,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    for expression in &node.positional {
        visitor.visit_expression(expression)?;
    }
    for named in &node.named {
        visitor.visit_named_argument(named)?;
    }
    Ok(())
}

pub fn walk_named_argument<V: AstVisitor + ?Sized>(
    visitor: &mut V,
    node: &NamedArgument,
) -> Result<(), DepthExceeded> {
    let _frame = visitor.guard().enter()?;
    visitor.visit_expression(&node.value)
}

/// Copy-returning transformer with depth-guarded traversal
///
/// Defaults rebuild every node from transformed children and route every
/// span through [`AstTransformer::transform_span`]; override the methods
/// for the node kinds being rewritten. Input nodes are consumed, never
/// mutated in place.
pub trait AstTransformer {
    fn guard(&self) -> &DepthGuard;

    /// Span hook applied to every rebuilt node
    fn transform_span(&mut self, span: Option<Span>) -> Option<Span> {
        span
    }

    fn transform_resource(&mut self, node: Resource) -> Result<Resource, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let entries = node
            .entries
            .into_iter()
            .map(|entry| self.transform_entry(entry))
            .collect::<Result<Vec<_>, _>>()?;
        let span = self.transform_span(node.span);
        Ok(Resource { entries, span })
    }

    fn transform_entry(&mut self, node: Entry) -> Result<Entry, DepthExceeded> {
        Ok(match node {
            Entry::Message(message) => Entry::Message(self.transform_message(message)?),
            Entry::Term(term) => Entry::Term(self.transform_term(term)?),
            Entry::Comment(comment) => Entry::Comment(self.transform_comment(comment)?),
            Entry::Junk(junk) => Entry::Junk(self.transform_junk(junk)?),
        })
    }

    fn transform_message(&mut self, node: Message) -> Result<Message, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let value = match node.value {
            Some(pattern) => Some(self.transform_pattern(pattern)?),
            None => None,
        };
        let attributes = node
            .attributes
            .into_iter()
            .map(|attribute| self.transform_attribute(attribute))
            .collect::<Result<Vec<_>, _>>()?;
        let comment = match node.comment {
            Some(comment) => Some(self.transform_comment(comment)?),
            None => None,
        };
        let span = self.transform_span(node.span);
        Ok(Message {
            id: self.transform_identifier(node.id)?,
            value,
            attributes,
            comment,
            span,
        })
    }

    fn transform_term(&mut self, node: Term) -> Result<Term, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let value = self.transform_pattern(node.value)?;
        let attributes = node
            .attributes
            .into_iter()
            .map(|attribute| self.transform_attribute(attribute))
            .collect::<Result<Vec<_>, _>>()?;
        let comment = match node.comment {
            Some(comment) => Some(self.transform_comment(comment)?),
            None => None,
        };
        let span = self.transform_span(node.span);
        Ok(Term {
            id: self.transform_identifier(node.id)?,
            value,
            attributes,
            comment,
            span,
        })
    }

    fn transform_attribute(&mut self, node: Attribute) -> Result<Attribute, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let span = self.transform_span(node.span);
        Ok(Attribute {
            id: self.transform_identifier(node.id)?,
            value: self.transform_pattern(node.value)?,
            span,
        })
    }

    fn transform_comment(&mut self, mut node: Comment) -> Result<Comment, DepthExceeded> {
        node.span = self.transform_span(node.span);
        Ok(node)
    }

    fn transform_junk(&mut self, mut node: Junk) -> Result<Junk, DepthExceeded> {
        node.span = self.transform_span(node.span);
        for annotation in &mut node.annotations {
            annotation.span = self.transform_span(annotation.span);
        }
        Ok(node)
    }

    fn transform_identifier(&mut self, mut node: Identifier) -> Result<Identifier, DepthExceeded> {
        node.span = self.transform_span(node.span);
        Ok(node)
    }

    fn transform_pattern(&mut self, node: Pattern) -> Result<Pattern, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let elements = node
            .elements
            .into_iter()
            .map(|element| match element {
                PatternElement::Text(text) => {
                    Ok(PatternElement::Text(self.transform_text_element(text)?))
                }
                PatternElement::Placeable(placeable) => Ok(PatternElement::Placeable(
                    self.transform_placeable(placeable)?,
                )),
            })
            .collect::<Result<Vec<_>, DepthExceeded>>()?;
        let span = self.transform_span(node.span);
        Ok(Pattern { elements, span })
    }

    fn transform_text_element(
        &mut self,
        mut node: TextElement,
    ) -> Result<TextElement, DepthExceeded> {
        node.span = self.transform_span(node.span);
        Ok(node)
    }

    fn transform_placeable(&mut self, node: Placeable) -> Result<Placeable, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let span = self.transform_span(node.span);
        Ok(Placeable {
            expression: self.transform_expression(node.expression)?,
            span,
        })
    }

    fn transform_expression(&mut self, node: Expression) -> Result<Expression, DepthExceeded> {
        let _frame = self.guard().enter()?;
        Ok(match node {
            Expression::StringLiteral(mut lit) => {
                lit.span = self.transform_span(lit.span);
                Expression::StringLiteral(lit)
            }
            Expression::NumberLiteral(mut lit) => {
                lit.span = self.transform_span(lit.span);
                Expression::NumberLiteral(lit)
            }
            Expression::VariableReference(var) => {
                let span = self.transform_span(var.span);
                Expression::VariableReference(VariableReference {
                    id: self.transform_identifier(var.id)?,
                    span,
                })
            }
            Expression::MessageReference(msg) => {
                let span = self.transform_span(msg.span);
                Expression::MessageReference(MessageReference {
                    id: self.transform_identifier(msg.id)?,
                    attribute: msg
                        .attribute
                        .map(|attr| self.transform_identifier(attr))
                        .transpose()?,
                    span,
                })
            }
            Expression::TermReference(term) => {
                let span = self.transform_span(term.span);
                Expression::TermReference(TermReference {
                    id: self.transform_identifier(term.id)?,
                    attribute: term
                        .attribute
                        .map(|attr| self.transform_identifier(attr))
                        .transpose()?,
                    arguments: term
                        .arguments
                        .map(|arguments| self.transform_call_arguments(arguments))
                        .transpose()?,
                    span,
                })
            }
            Expression::FunctionReference(func) => {
                let span = self.transform_span(func.span);
                Expression::FunctionReference(FunctionReference {
                    id: self.transform_identifier(func.id)?,
                    arguments: self.transform_call_arguments(func.arguments)?,
                    span,
                })
            }
            Expression::Select(select) => {
                let selector = Box::new(self.transform_expression(*select.selector)?);
                let variants = select
                    .variants
                    .into_iter()
                    .map(|variant| self.transform_variant(variant))
                    .collect::<Result<Vec<_>, _>>()?;
                let span = self.transform_span(select.span);
                Expression::Select(SelectExpression {
                    selector,
                    variants,
                    default_index: select.default_index,
                    span,
                })
            }
            Expression::Placeable(placeable) => {
                Expression::Placeable(Box::new(self.transform_placeable(*placeable)?))
            }
        })
    }

    fn transform_variant(&mut self, node: Variant) -> Result<Variant, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let key = match node.key {
            VariantKey::Identifier(id) => VariantKey::Identifier(self.transform_identifier(id)?),
            VariantKey::Number(mut num) => {
                num.span = self.transform_span(num.span);
                VariantKey::Number(num)
            }
        };
        let span = self.transform_span(node.span);
        Ok(Variant {
            key,
            value: self.transform_pattern(node.value)?,
            is_default: node.is_default,
            span,
        })
    }

    fn transform_call_arguments(
        &mut self,
        node: CallArguments,
    ) -> Result<CallArguments, DepthExceeded> {
        let _frame = self.guard().enter()?;
        let positional = node
            .positional
            .into_iter()
            .map(|expression| self.transform_expression(expression))
            .collect::<Result<Vec<_>, _>>()?;
        let named = node
            .named
            .into_iter()
            .map(|named| {
                let span = self.transform_span(named.span);
                Ok(NamedArgument {
                    name: self.transform_identifier(named.name)?,
                    value: self.transform_expression(named.value)?,
                    span,
                })
            })
            .collect::<Result<Vec<_>, DepthExceeded>>()?;
        let span = self.transform_span(node.span);
        Ok(CallArguments {
            positional,
            named,
            span,
        })
    }
}

/// Transformer clearing every span, for span-insensitive AST comparison
struct SpanStripper {
    guard: DepthGuard,
}

impl AstTransformer for SpanStripper {
    fn guard(&self) -> &DepthGuard {
        &self.guard
    }

    fn transform_span(&mut self, _span: Option<Span>) -> Option<Span> {
        None
    }
}

/// Return a copy of the resource with every span cleared.
///
/// Round-trip comparisons are span-insensitive: serialization shifts
/// offsets without changing structure.
pub fn strip_spans(resource: &Resource) -> Resource {
    let mut stripper = SpanStripper {
        guard: DepthGuard::new(crate::syntax::depth::HOST_STACK_BUDGET),
    };
    stripper
        .transform_resource(resource.clone())
        .expect("span stripping stays within the host depth budget")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    struct VariableCollector {
        guard: DepthGuard,
        names: Vec<String>,
    }

    impl AstVisitor for VariableCollector {
        fn guard(&self) -> &DepthGuard {
            &self.guard
        }

        fn visit_variable_reference(
            &mut self,
            node: &VariableReference,
        ) -> Result<(), DepthExceeded> {
            self.names.push(node.id.name.clone());
            Ok(())
        }
    }

    fn sample_resource() -> Resource {
        let select = SelectExpression {
            selector: Box::new(Expression::VariableReference(VariableReference {
                id: Identifier::new("count"),
                span: Some(Span::new(1, 6)),
            })),
            variants: vec![Variant {
                key: VariantKey::Number(NumberLiteral::new(Decimal::from_str("1").unwrap(), "1")),
                value: Pattern::new(vec![PatternElement::Text(TextElement::new("one"))]),
                is_default: true,
                span: None,
            }],
            default_index: 0,
            span: None,
        };
        Resource::new(vec![Entry::Message(Message::new(
            Identifier::new("m"),
            Some(Pattern::new(vec![PatternElement::Placeable(
                Placeable::new(Expression::Select(select)),
            )])),
            vec![],
        ))])
    }

    #[test]
    fn visitor_reaches_nested_variables() {
        let mut collector = VariableCollector {
            guard: DepthGuard::new(100),
            names: Vec::new(),
        };
        collector.visit_resource(&sample_resource()).unwrap();
        assert_eq!(collector.names, vec!["count"]);
    }

    #[test]
    fn exhausted_guard_stops_traversal_with_typed_error() {
        let mut collector = VariableCollector {
            guard: DepthGuard::new(2),
            names: Vec::new(),
        };
        let err = collector.visit_resource(&sample_resource()).unwrap_err();
        assert_eq!(err.max_depth, 2);
    }

    #[test]
    fn strip_spans_clears_every_span() {
        let stripped = strip_spans(&sample_resource());
        match &stripped.entries[0] {
            Entry::Message(message) => {
                let pattern = message.value.as_ref().unwrap();
                match &pattern.elements[0] {
                    PatternElement::Placeable(placeable) => match &placeable.expression {
                        Expression::Select(select) => match select.selector.as_ref() {
                            Expression::VariableReference(var) => assert!(var.span.is_none()),
                            other => panic!("unexpected selector {other:?}"),
                        },
                        other => panic!("unexpected expression {other:?}"),
                    },
                    other => panic!("unexpected element {other:?}"),
                }
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }
}
