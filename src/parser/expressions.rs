//! Placeables, references, calls, and select expressions

use crate::parser::{ParseResult, ParserRun, SyntaxIssue};
use crate::syntax::ast::{
    CallArguments, Expression, FunctionReference, MessageReference, NamedArgument, Placeable,
    SelectExpression, TermReference, VariableReference, Variant, VariantKey,
};
use crate::syntax::span::Span;

impl ParserRun {
    /// `{ … }`; whitespace of any kind is allowed around the expression,
    /// and placeables nest
    pub(crate) fn get_placeable(&mut self) -> ParseResult<Placeable> {
        let start = self.cursor.index();
        let _frame = self.depth.enter()?;
        self.expect_char('{')?;
        self.cursor.skip_blank();
        let expression = self.get_expression()?;
        self.expect_char('}')?;
        Ok(Placeable {
            expression,
            span: Some(Span::new(start, self.cursor.index())),
        })
    }

    pub(crate) fn get_expression(&mut self) -> ParseResult<Expression> {
        let expression_start = self.cursor.index();
        let selector = self.get_inline_expression()?;
        self.cursor.skip_blank();

        if self.cursor.current_char() == Some('-') {
            if self.cursor.lookahead(1) != Some('>') {
                return Err(SyntaxIssue::new(
                    "E0003",
                    "Expected token: \"}\"",
                    self.cursor.index(),
                )
                .into());
            }

            // Selector restrictions: message values and attributes never
            // select; term values never select; term attributes do.
            match &selector {
                Expression::MessageReference(msg) if msg.attribute.is_none() => {
                    return Err(SyntaxIssue::new(
                        "E0016",
                        "Message references cannot be used as selectors",
                        expression_start,
                    )
                    .into());
                }
                Expression::MessageReference(_) => {
                    return Err(SyntaxIssue::new(
                        "E0018",
                        "Attributes of messages cannot be used as selectors",
                        expression_start,
                    )
                    .into());
                }
                Expression::TermReference(term) if term.attribute.is_none() => {
                    return Err(SyntaxIssue::new(
                        "E0017",
                        "Terms cannot be used as selectors",
                        expression_start,
                    )
                    .into());
                }
                _ => {}
            }

            self.cursor.next();
            self.cursor.next();
            self.cursor.skip_blank_inline();
            self.expect_line_end()?;

            let (variants, default_index) = self.get_variants()?;
            return Ok(Expression::Select(SelectExpression {
                selector: Box::new(selector),
                variants,
                default_index,
                span: Some(Span::new(expression_start, self.cursor.index())),
            }));
        }

        // Outside select expressions a term attribute is not a value.
        if let Expression::TermReference(term) = &selector {
            if term.attribute.is_some() {
                return Err(SyntaxIssue::new(
                    "E0019",
                    "Attributes of terms cannot be used as placeables",
                    expression_start,
                )
                .into());
            }
        }
        Ok(selector)
    }

    pub(crate) fn get_inline_expression(&mut self) -> ParseResult<Expression> {
        match self.cursor.current_char() {
            Some('{') => Ok(Expression::Placeable(Box::new(self.get_placeable()?))),
            Some('"') => Ok(Expression::StringLiteral(self.get_string_literal()?)),
            Some(c) if c.is_ascii_digit() => {
                Ok(Expression::NumberLiteral(self.get_number_literal()?))
            }
            Some('-') => match self.cursor.lookahead(1) {
                Some(c) if c.is_ascii_digit() => {
                    Ok(Expression::NumberLiteral(self.get_number_literal()?))
                }
                Some(c) if c.is_ascii_alphabetic() => self.get_term_reference(),
                _ => Err(SyntaxIssue::new(
                    "E0028",
                    "Expected an inline expression",
                    self.cursor.index(),
                )
                .into()),
            },
            Some('$') => {
                let start = self.cursor.index();
                self.cursor.next();
                let id = self.get_identifier()?;
                Ok(Expression::VariableReference(VariableReference {
                    id,
                    span: Some(Span::new(start, self.cursor.index())),
                }))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.cursor.index();
                let id = self.get_identifier()?;
                if self.cursor.current_char() == Some('(') {
                    // Function names are any identifier.
                    let arguments = self.get_call_arguments()?;
                    return Ok(Expression::FunctionReference(FunctionReference {
                        id,
                        arguments,
                        span: Some(Span::new(start, self.cursor.index())),
                    }));
                }
                let attribute = self.maybe_get_attribute_accessor()?;
                Ok(Expression::MessageReference(MessageReference {
                    id,
                    attribute,
                    span: Some(Span::new(start, self.cursor.index())),
                }))
            }
            _ => Err(SyntaxIssue::new(
                "E0028",
                "Expected an inline expression",
                self.cursor.index(),
            )
            .into()),
        }
    }

    /// `-id`, optionally `.attr`, optionally `(args)`
    fn get_term_reference(&mut self) -> ParseResult<Expression> {
        let start = self.cursor.index();
        self.expect_char('-')?;
        let id = self.get_identifier()?;
        let attribute = self.maybe_get_attribute_accessor()?;
        let arguments = if self.cursor.current_char() == Some('(') {
            Some(self.get_call_arguments()?)
        } else {
            None
        };
        Ok(Expression::TermReference(TermReference {
            id,
            attribute,
            arguments,
            span: Some(Span::new(start, self.cursor.index())),
        }))
    }

    fn maybe_get_attribute_accessor(
        &mut self,
    ) -> ParseResult<Option<crate::syntax::ast::Identifier>> {
        if self.cursor.current_char() == Some('.') {
            self.cursor.next();
            Ok(Some(self.get_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// `( positional, …, name: literal, … )`
    ///
    /// Parameterized calls count against the nesting budget, so chains
    /// like `F(G(H(…)))` cannot recurse unboundedly.
    pub(crate) fn get_call_arguments(&mut self) -> ParseResult<CallArguments> {
        let start = self.cursor.index();
        let _frame = self.depth.enter()?;
        self.expect_char('(')?;
        self.cursor.skip_blank();

        let mut positional = Vec::new();
        let mut named: Vec<NamedArgument> = Vec::new();

        loop {
            match self.cursor.current_char() {
                Some(')') => break,
                None => {
                    return Err(SyntaxIssue::new(
                        "E0003",
                        "Expected token: \")\"",
                        self.cursor.index(),
                    )
                    .into());
                }
                _ => {}
            }

            match self.get_call_argument()? {
                CallArgument::Named(argument) => {
                    if named.iter().any(|n| n.name.name == argument.name.name) {
                        return Err(SyntaxIssue::new(
                            "E0022",
                            format!("The \"{}\" argument appears twice", argument.name.name),
                            self.cursor.index(),
                        )
                        .into());
                    }
                    named.push(argument);
                }
                CallArgument::Positional(expression) => {
                    if !named.is_empty() {
                        return Err(SyntaxIssue::new(
                            "E0021",
                            "Positional arguments must not follow named arguments",
                            self.cursor.index(),
                        )
                        .into());
                    }
                    positional.push(expression);
                }
            }

            self.cursor.skip_blank();
            if self.cursor.current_char() == Some(',') {
                self.cursor.next();
                self.cursor.skip_blank();
            } else {
                break;
            }
        }

        self.expect_char(')')?;
        Ok(CallArguments {
            positional,
            named,
            span: Some(Span::new(start, self.cursor.index())),
        })
    }

    fn get_call_argument(&mut self) -> ParseResult<CallArgument> {
        let expression = self.get_inline_expression()?;
        self.cursor.skip_blank();

        if self.cursor.current_char() != Some(':') {
            return Ok(CallArgument::Positional(expression));
        }

        // A named argument: the expression so far must be a bare name.
        let name = match expression {
            Expression::MessageReference(MessageReference {
                id,
                attribute: None,
                ..
            }) => id,
            _ => {
                return Err(SyntaxIssue::new(
                    "E0009",
                    "The argument name has to be a simple identifier",
                    self.cursor.index(),
                )
                .into());
            }
        };
        let start = name.span.map(|s| s.start).unwrap_or(self.cursor.index());
        self.cursor.next();
        self.cursor.skip_blank();
        let value = self.get_argument_value()?;
        Ok(CallArgument::Named(NamedArgument {
            name,
            value,
            span: Some(Span::new(start, self.cursor.index())),
        }))
    }

    /// Named-argument values: literals, or a variable forwarded from the
    /// caller's scope (`x: $x`)
    fn get_argument_value(&mut self) -> ParseResult<Expression> {
        match self.cursor.current_char() {
            Some('"') => Ok(Expression::StringLiteral(self.get_string_literal()?)),
            Some(c) if c.is_ascii_digit() => {
                Ok(Expression::NumberLiteral(self.get_number_literal()?))
            }
            Some('-') if matches!(self.cursor.lookahead(1), Some(c) if c.is_ascii_digit()) => {
                Ok(Expression::NumberLiteral(self.get_number_literal()?))
            }
            Some('$') => {
                let start = self.cursor.index();
                self.cursor.next();
                let id = self.get_identifier()?;
                Ok(Expression::VariableReference(VariableReference {
                    id,
                    span: Some(Span::new(start, self.cursor.index())),
                }))
            }
            _ => Err(SyntaxIssue::new(
                "E0014",
                "Expected a literal or a variable reference",
                self.cursor.index(),
            )
            .into()),
        }
    }

    /// Variant list after `->`; exactly one default required
    fn get_variants(&mut self) -> ParseResult<(Vec<Variant>, usize)> {
        let mut variants = Vec::new();
        let mut default_index: Option<usize> = None;

        loop {
            self.cursor.skip_blank();
            if !matches!(self.cursor.current_char(), Some('*') | Some('[')) {
                break;
            }

            let start = self.cursor.index();
            let is_default = self.cursor.current_char() == Some('*');
            if is_default {
                self.cursor.next();
            }
            self.expect_char('[')?;
            self.cursor.skip_blank();
            let key = self.get_variant_key()?;
            self.cursor.skip_blank();
            self.expect_char(']')?;

            let value = match self.maybe_get_pattern()? {
                Some(pattern) => pattern,
                None => {
                    return Err(SyntaxIssue::new(
                        "E0012",
                        "Expected a variant value",
                        self.cursor.index(),
                    )
                    .into());
                }
            };

            if is_default {
                if default_index.is_some() {
                    return Err(SyntaxIssue::new(
                        "E0015",
                        "Only one variant can be marked as default (*)",
                        start,
                    )
                    .into());
                }
                default_index = Some(variants.len());
            }
            variants.push(Variant {
                key,
                value,
                is_default,
                span: Some(Span::new(start, self.cursor.index())),
            });
        }

        if variants.is_empty() {
            return Err(SyntaxIssue::new(
                "E0011",
                "Expected at least one variant after \"->\"",
                self.cursor.index(),
            )
            .into());
        }
        match default_index {
            Some(index) => Ok((variants, index)),
            None => Err(SyntaxIssue::new(
                "E0010",
                "Expected one of the variants to be marked as default (*)",
                self.cursor.index(),
            )
            .into()),
        }
    }

    fn get_variant_key(&mut self) -> ParseResult<VariantKey> {
        match self.cursor.current_char() {
            Some(c) if c.is_ascii_digit() || c == '-' => {
                Ok(VariantKey::Number(self.get_number_literal()?))
            }
            _ => Ok(VariantKey::Identifier(self.get_identifier()?)),
        }
    }
}

enum CallArgument {
    Positional(Expression),
    Named(NamedArgument),
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, Parser, ParserConfig};
    use crate::syntax::ast::{Entry, Expression, PatternElement, VariantKey};

    fn first_expression(source: &str) -> Expression {
        let resource = parse(source).unwrap();
        match &resource.entries[0] {
            Entry::Message(message) => {
                let pattern = message.value.as_ref().unwrap();
                match &pattern.elements[0] {
                    PatternElement::Placeable(placeable) => placeable.expression.clone(),
                    other => panic!("unexpected element {other:?}"),
                }
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn variable_reference() {
        match first_expression("m = { $count }") {
            Expression::VariableReference(var) => assert_eq!(var.id.name, "count"),
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn message_reference_with_attribute() {
        match first_expression("m = { other.title }") {
            Expression::MessageReference(msg) => {
                assert_eq!(msg.id.name, "other");
                assert_eq!(msg.attribute.as_ref().unwrap().name, "title");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn parameterized_term_reference() {
        match first_expression("m = { -brand(case: \"genitive\") }") {
            Expression::TermReference(term) => {
                assert_eq!(term.id.name, "brand");
                let arguments = term.arguments.as_ref().unwrap();
                assert_eq!(arguments.named.len(), 1);
                assert_eq!(arguments.named[0].name.name, "case");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn lowercase_function_names_are_accepted() {
        match first_expression("m = { number($n, minimumFractionDigits: 2) }") {
            Expression::FunctionReference(func) => {
                assert_eq!(func.id.name, "number");
                assert_eq!(func.arguments.positional.len(), 1);
                assert_eq!(func.arguments.named.len(), 1);
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn nested_placeables_are_legal() {
        match first_expression("m = { { \"inner\" } }") {
            Expression::Placeable(inner) => match &inner.expression {
                Expression::StringLiteral(lit) => assert_eq!(lit.value, "inner"),
                other => panic!("unexpected inner expression {other:?}"),
            },
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn nested_calls_consume_the_depth_budget() {
        let parser = Parser::new(ParserConfig {
            max_nesting_depth: 5,
            ..ParserConfig::default()
        })
        .unwrap();
        let source = "m = { F(G(H(I(J(1))))) }";
        let err = parser.parse(source).unwrap_err();
        assert!(matches!(
            err,
            crate::parser::ParseError::DepthExceeded { .. }
        ));
    }

    #[test]
    fn select_expression_with_newlines_in_variant_brackets() {
        match first_expression("m = { $n ->\n    [\n  one\n ] single\n   *[other] more\n }") {
            Expression::Select(select) => {
                assert_eq!(select.variants.len(), 2);
                match &select.variants[0].key {
                    VariantKey::Identifier(id) => assert_eq!(id.name, "one"),
                    other => panic!("unexpected key {other:?}"),
                }
                assert_eq!(select.default_index, 1);
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn select_without_default_is_junk() {
        let resource = parse("m = { $n ->\n    [one] x\n }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => {
                assert_eq!(junk.annotations[0].code, "E0010");
            }
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn two_defaults_are_junk() {
        let resource = parse("m = { $n ->\n   *[one] x\n   *[two] y\n }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => assert_eq!(junk.annotations[0].code, "E0015"),
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn message_selector_is_rejected() {
        let resource = parse("m = { other ->\n   *[a] x\n }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => assert_eq!(junk.annotations[0].code, "E0016"),
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn term_attribute_selector_is_allowed() {
        let source = "m = { -brand.gender ->\n    [masculine] his\n   *[other] its\n }";
        match first_expression(source) {
            Expression::Select(select) => match select.selector.as_ref() {
                Expression::TermReference(term) => {
                    assert_eq!(term.attribute.as_ref().unwrap().name, "gender");
                }
                other => panic!("unexpected selector {other:?}"),
            },
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn term_attribute_placeable_is_rejected() {
        let resource = parse("m = { -brand.gender }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => assert_eq!(junk.annotations[0].code, "E0019"),
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_named_arguments_are_junk() {
        let resource = parse("m = { F(a: 1, a: 2) }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => assert_eq!(junk.annotations[0].code, "E0022"),
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn positional_after_named_is_junk() {
        let resource = parse("m = { F(a: 1, $x) }\nok = v").unwrap();
        match &resource.entries[0] {
            Entry::Junk(junk) => assert_eq!(junk.annotations[0].code, "E0021"),
            other => panic!("expected junk, got {other:?}"),
        }
    }

    #[test]
    fn negative_number_variant_key() {
        match first_expression("m = { $n ->\n    [-1] below\n   *[other] above\n }") {
            Expression::Select(select) => match &select.variants[0].key {
                VariantKey::Number(num) => assert_eq!(num.raw, "-1"),
                other => panic!("unexpected key {other:?}"),
            },
            other => panic!("unexpected expression {other:?}"),
        }
    }
}
