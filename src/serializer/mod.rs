//! FTL Serializer - Resource to Source Text
//!
//! Emits canonical FTL from an AST such that parsing the output yields the
//! same resource (modulo spans), and serializing again is a fixed point.
//! Separator policy keeps re-parsing faithful: standalone comments gain a
//! blank line before a same-kind comment (no merging) and before a
//! following message or term (no attaching); junk is emitted verbatim.
//!
//! With `validate` enabled (the default) a structural pass runs first and
//! refuses ASTs the parser could never produce. Both the validation pass
//! and emission share one depth guard.

pub mod escape;
mod validate;

use crate::syntax::ast::{
    CallArguments, Comment, Entry, Expression, Junk, Message, Pattern, PatternElement, Placeable,
    Resource, Term, VariantKey,
};
use crate::syntax::depth::{DepthExceeded, DepthGuard};
use crate::syntax::visit::AstVisitor;

/// Serializer options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Run the structural validation pass before emitting
    pub validate: bool,
    /// Depth budget shared by validation and emission
    pub max_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            validate: true,
            max_depth: crate::parser::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Serialization failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// The AST failed the structural validation pass
    Validation(Vec<String>),
    /// The depth budget was exhausted during validation or emission
    DepthExceeded { max: usize },
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::Validation(errors) => {
                write!(f, "resource failed validation: {}", errors.join("; "))
            }
            SerializeError::DepthExceeded { max } => {
                write!(f, "nesting depth limit of {max} exceeded while serializing")
            }
        }
    }
}

impl std::error::Error for SerializeError {}

impl From<DepthExceeded> for SerializeError {
    fn from(err: DepthExceeded) -> Self {
        SerializeError::DepthExceeded { max: err.max_depth }
    }
}

/// Configured FTL serializer
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn serialize(&self, resource: &Resource) -> Result<String, SerializeError> {
        let guard = DepthGuard::new(self.options.max_depth);

        if self.options.validate {
            let mut validator = validate::StructureValidator::new(guard.clone());
            validator.visit_resource(resource)?;
            let errors = validator.into_errors();
            if !errors.is_empty() {
                return Err(SerializeError::Validation(errors));
            }
        }

        let mut out = String::new();
        let mut previous: Option<&Entry> = None;
        for entry in &resource.entries {
            if needs_blank_line(previous, entry) {
                out.push('\n');
            }
            if !out.is_empty() && !out.ends_with('\n') {
                // A junk region without a trailing newline must not glue
                // onto the next entry.
                out.push('\n');
            }
            match entry {
                Entry::Message(message) => out.push_str(&serialize_message(message, &guard)?),
                Entry::Term(term) => out.push_str(&serialize_term(term, &guard)?),
                Entry::Comment(comment) => {
                    out.push_str(&serialize_comment(comment));
                }
                Entry::Junk(junk) => out.push_str(&serialize_junk(junk)),
            }
            previous = Some(entry);
        }
        Ok(out)
    }
}

/// Serialize with default options
pub fn serialize(resource: &Resource) -> Result<String, SerializeError> {
    Serializer::default().serialize(resource)
}

/// Blank-line separator policy between consecutive entries
fn needs_blank_line(previous: Option<&Entry>, current: &Entry) -> bool {
    let Some(Entry::Comment(prev)) = previous else {
        return false;
    };
    match current {
        // Re-parsing would merge adjacent same-kind comments.
        Entry::Comment(next) => next.kind == prev.kind,
        // Re-parsing would attach a single comment to the entry.
        Entry::Message(_) | Entry::Term(_) => true,
        Entry::Junk(junk) => {
            // Verbatim junk that already leads with whitespace keeps it.
            !junk.content.starts_with([' ', '\n'])
        }
    }
}

fn serialize_comment(comment: &Comment) -> String {
    let sigil = comment.kind.sigil();
    let mut out = String::new();
    for line in comment.content.split('\n') {
        if line.is_empty() {
            out.push_str(sigil);
        } else {
            out.push_str(sigil);
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn serialize_junk(junk: &Junk) -> String {
    junk.content.clone()
}

fn serialize_message(message: &Message, guard: &DepthGuard) -> Result<String, SerializeError> {
    let mut out = String::new();
    if let Some(comment) = &message.comment {
        out.push_str(&serialize_comment(comment));
    }
    out.push_str(&message.id.name);
    out.push_str(" =");
    if let Some(value) = &message.value {
        out.push_str(&serialize_pattern(value, guard)?);
    }
    for attribute in &message.attributes {
        out.push_str(&serialize_attribute(attribute, guard)?);
    }
    out.push('\n');
    Ok(out)
}

fn serialize_term(term: &Term, guard: &DepthGuard) -> Result<String, SerializeError> {
    let mut out = String::new();
    if let Some(comment) = &term.comment {
        out.push_str(&serialize_comment(comment));
    }
    out.push('-');
    out.push_str(&term.id.name);
    out.push_str(" =");
    out.push_str(&serialize_pattern(&term.value, guard)?);
    for attribute in &term.attributes {
        out.push_str(&serialize_attribute(attribute, guard)?);
    }
    out.push('\n');
    Ok(out)
}

fn serialize_attribute(
    attribute: &crate::syntax::ast::Attribute,
    guard: &DepthGuard,
) -> Result<String, SerializeError> {
    Ok(format!(
        "\n    .{} ={}",
        attribute.id.name,
        indent_continuations(&serialize_pattern(&attribute.value, guard)?)
    ))
}

/// Add 4-space indentation after newlines that are not already followed by
/// at least four spaces; existing indented continuations are left intact.
fn indent_continuations(content: &str) -> String {
    let mut lines = content.split('\n');
    let mut out = String::with_capacity(content.len());
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        if !line.starts_with("    ") {
            out.push_str("    ");
        }
        out.push_str(line);
    }
    out
}

/// Multiline values and values whose text could be mistaken for an
/// attribute or variant line start on a fresh line.
fn should_start_on_new_line(pattern: &Pattern) -> bool {
    let is_multiline = pattern.elements.iter().any(|element| match element {
        PatternElement::Placeable(placeable) => {
            matches!(placeable.expression, Expression::Select(_))
        }
        PatternElement::Text(text) => text.value.contains('\n'),
    });
    if is_multiline {
        return true;
    }
    if let Some(PatternElement::Text(text)) = pattern.elements.first() {
        if let Some(first) = text.value.chars().next() {
            return matches!(first, '[' | '.' | '*');
        }
    }
    false
}

fn serialize_pattern(pattern: &Pattern, guard: &DepthGuard) -> Result<String, SerializeError> {
    let _frame = guard.enter()?;
    let mut content = String::new();
    for element in &pattern.elements {
        match element {
            PatternElement::Text(text) => content.push_str(&serialize_text(&text.value)),
            PatternElement::Placeable(placeable) => {
                content.push_str(&serialize_placeable(placeable, guard)?);
            }
        }
    }
    if should_start_on_new_line(pattern) {
        Ok(format!("\n    {}", indent_continuations(&content)))
    } else {
        Ok(format!(" {content}"))
    }
}

/// Literal braces in text are not representable as text; emit them as
/// string-literal placeables.
fn serialize_text(value: &str) -> String {
    if !value.contains(['{', '}']) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '{' => out.push_str("{\"{\"}"),
            '}' => out.push_str("{\"}\"}"),
            c => out.push(c),
        }
    }
    out
}

fn serialize_placeable(placeable: &Placeable, guard: &DepthGuard) -> Result<String, SerializeError> {
    let _frame = guard.enter()?;
    match &placeable.expression {
        Expression::Placeable(inner) => Ok(format!("{{{}}}", serialize_placeable(inner, guard)?)),
        Expression::Select(select) => {
            let mut out = String::new();
            out.push_str("{ ");
            out.push_str(&serialize_expression(select.selector.as_ref(), guard)?);
            out.push_str(" ->");
            for variant in &select.variants {
                let marker = if variant.is_default { "   *" } else { "    " };
                out.push('\n');
                out.push_str(marker);
                out.push('[');
                out.push_str(&serialize_variant_key(&variant.key));
                out.push(']');
                out.push_str(&indent_continuations(&serialize_pattern(
                    &variant.value,
                    guard,
                )?));
            }
            out.push_str("\n}");
            Ok(out)
        }
        expression => Ok(format!("{{ {} }}", serialize_expression(expression, guard)?)),
    }
}

fn serialize_variant_key(key: &VariantKey) -> String {
    match key {
        VariantKey::Identifier(id) => id.name.clone(),
        VariantKey::Number(num) => num.raw.clone(),
    }
}

fn serialize_expression(
    expression: &Expression,
    guard: &DepthGuard,
) -> Result<String, SerializeError> {
    let _frame = guard.enter()?;
    Ok(match expression {
        Expression::StringLiteral(lit) => format!("\"{}\"", lit.raw),
        Expression::NumberLiteral(num) => num.raw.clone(),
        Expression::VariableReference(var) => format!("${}", var.id.name),
        Expression::MessageReference(msg) => match &msg.attribute {
            Some(attr) => format!("{}.{}", msg.id.name, attr.name),
            None => msg.id.name.clone(),
        },
        Expression::TermReference(term) => {
            let mut out = format!("-{}", term.id.name);
            if let Some(attr) = &term.attribute {
                out.push('.');
                out.push_str(&attr.name);
            }
            if let Some(arguments) = &term.arguments {
                out.push_str(&serialize_call_arguments(arguments, guard)?);
            }
            out
        }
        Expression::FunctionReference(func) => format!(
            "{}{}",
            func.id.name,
            serialize_call_arguments(&func.arguments, guard)?
        ),
        Expression::Select(_) | Expression::Placeable(_) => {
            // Reached only through serialize_placeable, which handles both.
            serialize_placeable(
                &Placeable {
                    expression: expression.clone(),
                    span: None,
                },
                guard,
            )?
        }
    })
}

fn serialize_call_arguments(
    arguments: &CallArguments,
    guard: &DepthGuard,
) -> Result<String, SerializeError> {
    let _frame = guard.enter()?;
    let mut parts: Vec<String> = Vec::new();
    for expression in &arguments.positional {
        parts.push(serialize_expression(expression, guard)?);
    }
    for named in &arguments.named {
        parts.push(format!(
            "{}: {}",
            named.name.name,
            serialize_expression(&named.value, guard)?
        ));
    }
    Ok(format!("({})", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::ast::{Identifier, TextElement};
    use crate::syntax::visit::strip_spans;

    fn roundtrip(source: &str) -> String {
        let resource = parse(source).unwrap();
        serialize(&resource).unwrap()
    }

    #[test]
    fn simple_messages_stay_adjacent() {
        assert_eq!(roundtrip("msg1 = A\nmsg2 = B"), "msg1 = A\nmsg2 = B\n");
    }

    #[test]
    fn block_value_normalizes_to_four_space_indent() {
        assert_eq!(roundtrip("msg =\n\n      value"), "msg = value\n");
    }

    #[test]
    fn multiline_value_starts_on_a_new_line() {
        assert_eq!(
            roundtrip("msg =\n    one\n    two"),
            "msg =\n    one\n    two\n"
        );
    }

    #[test]
    fn select_expression_layout() {
        let source = "items = { $n ->\n    [one] one item\n   *[other] { $n } items\n}\n";
        let expected =
            "items =\n    { $n ->\n    [one] one item\n       *[other] { $n } items\n    }\n";
        assert_eq!(roundtrip(source), expected);
    }

    #[test]
    fn standalone_comment_keeps_distance_from_message() {
        assert_eq!(
            roundtrip("# standalone\n\nmsg = v"),
            "# standalone\n\nmsg = v\n"
        );
    }

    #[test]
    fn attached_comment_stays_attached() {
        assert_eq!(roundtrip("# attached\nmsg = v"), "# attached\nmsg = v\n");
    }

    #[test]
    fn same_kind_comments_keep_a_separator() {
        assert_eq!(roundtrip("# one\n\n# two"), "# one\n\n# two\n");
    }

    #[test]
    fn junk_serializes_verbatim() {
        let source = "=== broken ===\nok = v\n";
        let resource = parse(source).unwrap();
        let output = serialize(&resource).unwrap();
        assert!(output.contains("=== broken ===\n"));
        assert!(output.contains("ok = v\n"));
    }

    #[test]
    fn literal_braces_become_string_placeables() {
        let resource = crate::syntax::ast::Resource::new(vec![crate::syntax::ast::Entry::Message(
            crate::syntax::ast::Message::new(
                Identifier::new("m"),
                Some(crate::syntax::ast::Pattern::new(vec![
                    crate::syntax::ast::PatternElement::Text(TextElement::new("a { b } c")),
                ])),
                vec![],
            ),
        )]);
        let output = serialize(&resource).unwrap();
        assert_eq!(output, "m = a {\"{\"} b {\"}\"} c\n");
    }

    #[test]
    fn reparsing_the_output_is_a_fixed_point() {
        let sources = [
            "msg = hello",
            "msg =\n    one\n    two\n\n    three",
            "# c\nmsg = v\n\n## group\n\nother = w",
            "items = { $n ->\n    [one] one\n   *[other] { NUMBER($n) } items\n}",
            "-brand = X\n    .legal = Old\n    .legal = New",
            "m = { \"esc \\\" \\\\ \\u0041\" }",
        ];
        for source in sources {
            let first = parse(source).unwrap();
            let text1 = serialize(&first).unwrap();
            let second = parse(&text1).unwrap();
            assert_eq!(
                strip_spans(&first),
                strip_spans(&second),
                "AST changed for {source:?}"
            );
            let text2 = serialize(&second).unwrap();
            assert_eq!(text1, text2, "serialization not a fixed point for {source:?}");
        }
    }

    #[test]
    fn invalid_identifier_fails_validation() {
        let resource = crate::syntax::ast::Resource::new(vec![crate::syntax::ast::Entry::Message(
            crate::syntax::ast::Message::new(
                Identifier::new("not ok"),
                Some(crate::syntax::ast::Pattern::new(vec![
                    crate::syntax::ast::PatternElement::Text(TextElement::new("v")),
                ])),
                vec![],
            ),
        )]);
        assert!(matches!(
            serialize(&resource),
            Err(SerializeError::Validation(_))
        ));
    }

    #[test]
    fn validation_can_be_disabled() {
        let resource = crate::syntax::ast::Resource::new(vec![crate::syntax::ast::Entry::Message(
            crate::syntax::ast::Message::new(
                Identifier::new("not ok"),
                Some(crate::syntax::ast::Pattern::new(vec![
                    crate::syntax::ast::PatternElement::Text(TextElement::new("v")),
                ])),
                vec![],
            ),
        )]);
        let serializer = Serializer::new(SerializeOptions {
            validate: false,
            ..SerializeOptions::default()
        });
        assert!(serializer.serialize(&resource).is_ok());
    }
}
