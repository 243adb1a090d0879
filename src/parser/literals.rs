//! Token primitives: identifiers, number and string literals, expectations

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::parser::{
    ParseError, ParseResult, ParserIssue, ParserRun, SyntaxIssue, MAX_IDENTIFIER_LENGTH,
    MAX_NUMBER_LENGTH, MAX_STRING_LENGTH,
};
use crate::syntax::ast::{Identifier, NumberLiteral, StringLiteral};
use crate::syntax::span::Span;

impl ParserRun {
    pub(crate) fn expect_char(&mut self, expected: char) -> ParseResult<()> {
        if self.cursor.current_char() == Some(expected) {
            self.cursor.next();
            Ok(())
        } else {
            Err(SyntaxIssue::new(
                "E0003",
                format!("Expected token: \"{expected}\""),
                self.cursor.index(),
            )
            .into())
        }
    }

    /// Expect a line feed or end of input
    pub(crate) fn expect_line_end(&mut self) -> ParseResult<()> {
        match self.cursor.current_char() {
            Some('\n') => {
                self.cursor.next();
                Ok(())
            }
            None => Ok(()),
            Some(_) => Err(SyntaxIssue::new(
                "E0003",
                "Expected token: line end",
                self.cursor.index(),
            )
            .into()),
        }
    }

    /// `[A-Za-z][A-Za-z0-9_-]*`, at most 256 characters
    pub(crate) fn get_identifier(&mut self) -> ParseResult<Identifier> {
        let start = self.cursor.index();
        match self.cursor.current_char() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.cursor.next();
            }
            _ => {
                return Err(SyntaxIssue::new(
                    "E0004",
                    "Expected a character from the range: a-zA-Z",
                    self.cursor.index(),
                )
                .into());
            }
        }
        while let Some(c) = self.cursor.current_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                self.cursor.next();
            } else {
                break;
            }
        }
        let end = self.cursor.index();
        if end - start > MAX_IDENTIFIER_LENGTH {
            return Err(ParserIssue::Fatal(ParseError::TokenTooLong {
                token: "identifier",
                max: MAX_IDENTIFIER_LENGTH,
            }));
        }
        Ok(Identifier {
            name: self.cursor.slice(start, end),
            span: Some(Span::new(start, end)),
        })
    }

    /// `-?[0-9]+(.[0-9]+)?`; raw text capped at 1000 characters
    pub(crate) fn get_number_literal(&mut self) -> ParseResult<NumberLiteral> {
        let start = self.cursor.index();
        if self.cursor.current_char() == Some('-') {
            self.cursor.next();
        }
        self.get_digits()?;
        if self.cursor.current_char() == Some('.') {
            self.cursor.next();
            self.get_digits()?;
        }
        let end = self.cursor.index();
        if end - start > MAX_NUMBER_LENGTH {
            return Err(ParserIssue::Fatal(ParseError::TokenTooLong {
                token: "number literal",
                max: MAX_NUMBER_LENGTH,
            }));
        }
        let raw = self.cursor.slice(start, end);
        let value = Decimal::from_str(&raw).map_err(|_| {
            SyntaxIssue::new(
                "E0030",
                format!("Number literal is out of range: \"{raw}\""),
                start,
            )
        })?;
        Ok(NumberLiteral {
            value,
            raw,
            span: Some(Span::new(start, end)),
        })
    }

    fn get_digits(&mut self) -> ParseResult<()> {
        let mut seen = false;
        while let Some(c) = self.cursor.current_char() {
            if c.is_ascii_digit() {
                seen = true;
                self.cursor.next();
            } else {
                break;
            }
        }
        if seen {
            Ok(())
        } else {
            Err(SyntaxIssue::new(
                "E0004",
                "Expected a character from the range: 0-9",
                self.cursor.index(),
            )
            .into())
        }
    }

    /// Double-quoted string literal with `\\ \" \{ \uHHHH \UHHHHHH` escapes
    pub(crate) fn get_string_literal(&mut self) -> ParseResult<StringLiteral> {
        let literal_start = self.cursor.index();
        self.expect_char('"')?;
        let raw_start = self.cursor.index();
        let mut value: Vec<char> = Vec::new();
        loop {
            match self.cursor.current_char() {
                Some('"') => break,
                Some('\n') | None => {
                    return Err(SyntaxIssue::new(
                        "E0020",
                        "Unterminated string literal",
                        self.cursor.index(),
                    )
                    .into());
                }
                Some('\\') => {
                    value.push(self.get_escape_sequence()?);
                }
                Some(ch) => {
                    value.push(ch);
                    self.cursor.next();
                }
            }
            if value.len() > MAX_STRING_LENGTH {
                return Err(ParserIssue::Fatal(ParseError::TokenTooLong {
                    token: "string literal",
                    max: MAX_STRING_LENGTH,
                }));
            }
        }
        let raw_end = self.cursor.index();
        self.expect_char('"')?;
        Ok(StringLiteral {
            value: value.into_iter().collect(),
            raw: self.cursor.slice(raw_start, raw_end),
            span: Some(Span::new(literal_start, self.cursor.index())),
        })
    }

    fn get_escape_sequence(&mut self) -> ParseResult<char> {
        let escape_start = self.cursor.index();
        self.cursor.next(); // the backslash
        match self.cursor.current_char() {
            Some('\\') => {
                self.cursor.next();
                Ok('\\')
            }
            Some('"') => {
                self.cursor.next();
                Ok('"')
            }
            Some('{') => {
                self.cursor.next();
                Ok('{')
            }
            Some('u') => {
                self.cursor.next();
                self.get_unicode_escape(4, escape_start)
            }
            Some('U') => {
                self.cursor.next();
                self.get_unicode_escape(6, escape_start)
            }
            _ => Err(SyntaxIssue::new(
                "E0025",
                "Unknown escape sequence",
                escape_start,
            )
            .into()),
        }
    }

    /// Exactly `digits` hex digits; surrogate code points are rejected in
    /// both the `\u` and `\U` forms
    fn get_unicode_escape(&mut self, digits: usize, escape_start: usize) -> ParseResult<char> {
        let mut code_point: u32 = 0;
        for _ in 0..digits {
            match self.cursor.current_char().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code_point = code_point * 16 + digit;
                    self.cursor.next();
                }
                None => {
                    return Err(SyntaxIssue::new(
                        "E0026",
                        "Invalid Unicode escape sequence",
                        escape_start,
                    )
                    .into());
                }
            }
        }
        if (0xD800..=0xDFFF).contains(&code_point) {
            return Err(SyntaxIssue::new(
                "E0026",
                format!("Surrogate code point U+{code_point:04X} is not allowed"),
                escape_start,
            )
            .into());
        }
        char::from_u32(code_point).ok_or_else(|| {
            SyntaxIssue::new(
                "E0026",
                format!("Invalid code point U+{code_point:04X}"),
                escape_start,
            )
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::ast::{Entry, Expression, PatternElement};

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
    fn string_literal_keeps_raw_and_unescaped_value() {
        match first_expression(r#"m = { "aéb" }"#) {
            Expression::StringLiteral(lit) => {
                assert_eq!(lit.value, "aéb");
                assert_eq!(lit.raw, r"aéb");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn escaped_backslash_quote_and_brace() {
        match first_expression(r#"m = { "\\ \" \{" }"#) {
            Expression::StringLiteral(lit) => {
                assert_eq!(lit.value, "\\ \" {");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn six_digit_escape_reaches_astral_planes() {
        match first_expression(r#"m = { "\U01F602" }"#) {
            Expression::StringLiteral(lit) => assert_eq!(lit.value, "😂"),
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn surrogate_escapes_are_rejected() {
        for source in [r#"m = { "\uD800" }"#, r#"m = { "\U00DFFF" }"#] {
            let resource = parse(source).unwrap();
            assert!(
                matches!(&resource.entries[0], Entry::Junk(_)),
                "expected junk for {source}"
            );
        }
    }

    #[test]
    fn unterminated_string_is_junk() {
        let resource = parse("m = { \"open }\nnext = ok").unwrap();
        assert!(matches!(&resource.entries[0], Entry::Junk(_)));
    }

    #[test]
    fn number_literal_preserves_raw_form() {
        match first_expression("m = { -3.50 }") {
            Expression::NumberLiteral(num) => {
                assert_eq!(num.raw, "-3.50");
                assert_eq!(num.value.to_string(), "-3.50");
            }
            other => panic!("unexpected expression {other:?}"),
        }
    }

    #[test]
    fn bare_dot_number_is_junk() {
        let resource = parse("m = { 1. }\nnext = ok").unwrap();
        assert!(matches!(&resource.entries[0], Entry::Junk(_)));
    }

    #[test]
    fn identifier_with_underscore_and_dash() {
        let resource = parse("msg_one-two = v").unwrap();
        match &resource.entries[0] {
            Entry::Message(message) => assert_eq!(message.id.name, "msg_one-two"),
            other => panic!("unexpected entry {other:?}"),
        }
    }
}
