//! FTL AST node types
//!
//! Nodes are plain owned data, immutable by convention: nothing in the crate
//! mutates a node after construction, and the transformer in
//! [`crate::syntax::visit`] returns modified copies. Every node carries an
//! optional [`Span`]; nodes built programmatically leave it `None`.
//!
//! Semantic links between entries (a message referencing another message)
//! are id-keyed, never pointers: the tree itself is always a DAG of owning
//! parent→child edges, and reference resolution happens against the bundle's
//! maps at runtime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::syntax::span::Span;

/// An ordered sequence of top-level entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub entries: Vec<Entry>,
    pub span: Option<Span>,
}

impl Resource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            span: None,
        }
    }

    /// Junk entries captured during parsing, in source order
    pub fn junk(&self) -> Vec<&Junk> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Junk(junk) => Some(junk),
                _ => None,
            })
            .collect()
    }
}

/// A top-level entry in a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Message(Message),
    Term(Term),
    Comment(Comment),
    Junk(Junk),
}

/// ASCII identifier (`[A-Za-z][A-Za-z0-9_-]*`)
///
/// A term's identifier holds the bare name; the leading `-` is source
/// syntax only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Option<Span>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: None,
        }
    }
}

/// A translation unit addressed by identifier
///
/// At least one of `value` or a non-empty `attributes` must be present;
/// validation flags entries that satisfy neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Identifier,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    pub span: Option<Span>,
}

impl Message {
    pub fn new(id: Identifier, value: Option<Pattern>, attributes: Vec<Attribute>) -> Self {
        Self {
            id,
            value,
            attributes,
            comment: None,
            span: None,
        }
    }

    /// Attribute lookup with last-wins semantics for duplicate ids
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().rev().find(|a| a.id.name == name)
    }
}

/// A private translation unit; value is mandatory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: Identifier,
    pub value: Pattern,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
    pub span: Option<Span>,
}

impl Term {
    pub fn new(id: Identifier, value: Pattern, attributes: Vec<Attribute>) -> Self {
        Self {
            id,
            value,
            attributes,
            comment: None,
            span: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().rev().find(|a| a.id.name == name)
    }
}

/// A named sub-pattern of a message or term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Identifier,
    pub value: Pattern,
    pub span: Option<Span>,
}

impl Attribute {
    pub fn new(id: Identifier, value: Pattern) -> Self {
        Self {
            id,
            value,
            span: None,
        }
    }
}

/// Comment sigil level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    /// `#` - may attach to the following message or term
    Single,
    /// `##` - group header, always standalone
    Group,
    /// `###` - resource header, always standalone
    Resource,
}

impl CommentKind {
    pub fn sigil(&self) -> &'static str {
        match self {
            CommentKind::Single => "#",
            CommentKind::Group => "##",
            CommentKind::Resource => "###",
        }
    }
}

/// A comment entry; adjacent same-kind comments are merged by the parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub content: String,
    pub span: Option<Span>,
}

impl Comment {
    pub fn new(kind: CommentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            span: None,
        }
    }
}

/// An unparseable source region, preserved verbatim with its diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
    pub span: Option<Span>,
}

/// Parser diagnostic attached to a junk region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub code: String,
    pub message: String,
    pub span: Option<Span>,
}

/// Non-empty ordered sequence of text and placeables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
    pub span: Option<Span>,
}

impl Pattern {
    pub fn new(elements: Vec<PatternElement>) -> Self {
        Self {
            elements,
            span: None,
        }
    }
}

/// One element of a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternElement {
    Text(TextElement),
    Placeable(Placeable),
}

/// Literal text inside a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub value: String,
    pub span: Option<Span>,
}

impl TextElement {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            span: None,
        }
    }
}

/// A `{ … }` expression embedded in a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeable {
    pub expression: Expression,
    pub span: Option<Span>,
}

impl Placeable {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            span: None,
        }
    }
}

/// Expression variants legal inside a placeable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    StringLiteral(StringLiteral),
    NumberLiteral(NumberLiteral),
    VariableReference(VariableReference),
    MessageReference(MessageReference),
    TermReference(TermReference),
    FunctionReference(FunctionReference),
    Select(SelectExpression),
    /// Nested placeable, e.g. `{ { $x } }`
    Placeable(Box<Placeable>),
}

/// A quoted string literal
///
/// `value` holds the unescaped text; `raw` preserves the exact source bytes
/// between the quotes so variant matching and serialization stay faithful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub raw: String,
    pub span: Option<Span>,
}

impl StringLiteral {
    /// Build from an unescaped value, computing the canonical raw form.
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let raw = crate::serializer::escape::escape_string_literal(&value);
        Self {
            value,
            raw,
            span: None,
        }
    }
}

/// A number literal
///
/// `raw` is authoritative for variant-key comparison; `value` is the parsed
/// decimal used for exact selector matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: Decimal,
    pub raw: String,
    pub span: Option<Span>,
}

impl NumberLiteral {
    pub fn new(value: Decimal, raw: impl Into<String>) -> Self {
        Self {
            value,
            raw: raw.into(),
            span: None,
        }
    }

    /// Number of fraction digits in the raw form (the CLDR `v` operand)
    pub fn fraction_digits(&self) -> u32 {
        match self.raw.split_once('.') {
            Some((_, frac)) => frac.len() as u32,
            None => 0,
        }
    }
}

/// `$name` - an argument supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableReference {
    pub id: Identifier,
    pub span: Option<Span>,
}

/// `name` or `name.attr` - a reference to another message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageReference {
    pub id: Identifier,
    pub attribute: Option<Identifier>,
    pub span: Option<Span>,
}

/// `-name`, `-name.attr`, `-name(...)` - a reference to a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReference {
    pub id: Identifier,
    pub attribute: Option<Identifier>,
    pub arguments: Option<CallArguments>,
    pub span: Option<Span>,
}

/// `NAME(...)` - a function call; names are any identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReference {
    pub id: Identifier,
    pub arguments: CallArguments,
    pub span: Option<Span>,
}

/// Positional and named arguments of a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallArguments {
    pub positional: Vec<Expression>,
    pub named: Vec<NamedArgument>,
    pub span: Option<Span>,
}

impl CallArguments {
    pub fn empty() -> Self {
        Self {
            positional: Vec::new(),
            named: Vec::new(),
            span: None,
        }
    }
}

/// `name: literal` inside call arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArgument {
    pub name: Identifier,
    pub value: Expression,
    pub span: Option<Span>,
}

/// `selector -> variants` expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpression {
    pub selector: Box<Expression>,
    pub variants: Vec<Variant>,
    /// Index into `variants` of the single `*`-marked default
    pub default_index: usize,
    pub span: Option<Span>,
}

impl SelectExpression {
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.get(self.default_index)
    }
}

/// One case of a select expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub is_default: bool,
    pub span: Option<Span>,
}

/// Variant label: identifier or number literal
///
/// Numeric keys compare by decimal value, not textual form: `[1]` and
/// `[1.0]` are the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariantKey {
    Identifier(Identifier),
    Number(NumberLiteral),
}

impl VariantKey {
    /// Stable key for duplicate detection; numeric keys normalize to the
    /// decimal value so textual variations collide.
    pub fn canonical(&self) -> String {
        match self {
            VariantKey::Identifier(id) => format!("id:{}", id.name),
            VariantKey::Number(num) => format!("num:{}", num.value.normalize()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn numeric_variant_keys_compare_by_value() {
        let one = VariantKey::Number(NumberLiteral::new(Decimal::from_str("1").unwrap(), "1"));
        let one_point_zero =
            VariantKey::Number(NumberLiteral::new(Decimal::from_str("1.0").unwrap(), "1.0"));
        assert_eq!(one.canonical(), one_point_zero.canonical());
    }

    #[test]
    fn identifier_and_number_keys_never_collide() {
        let ident = VariantKey::Identifier(Identifier::new("1"));
        let num = VariantKey::Number(NumberLiteral::new(Decimal::from_str("1").unwrap(), "1"));
        assert_ne!(ident.canonical(), num.canonical());
    }

    #[test]
    fn attribute_lookup_is_last_wins() {
        let message = Message::new(
            Identifier::new("brand"),
            None,
            vec![
                Attribute::new(
                    Identifier::new("legal"),
                    Pattern::new(vec![PatternElement::Text(TextElement::new("Old"))]),
                ),
                Attribute::new(
                    Identifier::new("legal"),
                    Pattern::new(vec![PatternElement::Text(TextElement::new("New"))]),
                ),
            ],
        );
        let attr = message.attribute("legal").unwrap();
        assert_eq!(
            attr.value.elements,
            vec![PatternElement::Text(TextElement::new("New"))]
        );
    }

    #[test]
    fn fraction_digits_follow_the_raw_form() {
        let n = NumberLiteral::new(Decimal::from_str("1.50").unwrap(), "1.50");
        assert_eq!(n.fraction_digits(), 2);
        let n = NumberLiteral::new(Decimal::from_str("3").unwrap(), "3");
        assert_eq!(n.fraction_digits(), 0);
    }
}
