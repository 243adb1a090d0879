//! Pattern bodies and multiline dedent handling
//!
//! Block patterns collect raw parts first (text, placeables, and indent
//! runs), measuring the common indent across continuation lines, then a
//! single dedent pass strips the shared prefix, merges adjacent text, and
//! trims the trailing blank. Fragments accumulate in a vector and join
//! once.

use crate::parser::{ParseResult, ParserRun};
use crate::syntax::ast::{Pattern, PatternElement, Placeable, TextElement};
use crate::syntax::span::Span;

/// Characters that terminate a block pattern when they start a
/// continuation line: attributes, variant keys, and closing braces.
fn is_pattern_continuation_char(ch: char) -> bool {
    !matches!(ch, '}' | '.' | '[' | '*')
}

/// Raw pattern parts before dedenting
enum RawPart {
    Text {
        value: String,
        start: usize,
        end: usize,
    },
    Placeable(Placeable),
    /// Continuation newlines plus the line's leading spaces; the spaces
    /// sit at the end of `value` so the common indent strips off the tail
    Indent {
        value: String,
        start: usize,
        end: usize,
    },
}

impl ParserRun {
    /// Parse an inline or block pattern, or return `None` when the entry
    /// has no value.
    ///
    /// Inline patterns start on the `=` line; block patterns start on a
    /// following line and their first line's indent participates in the
    /// common-indent measurement. Blank lines between `=` and the first
    /// content line are skipped entirely.
    pub(crate) fn maybe_get_pattern(&mut self) -> ParseResult<Option<Pattern>> {
        self.cursor.peek_blank_inline();
        if self.is_value_start() {
            self.cursor.skip_to_peek();
            return Ok(Some(self.get_pattern(false)?));
        }

        self.cursor.peek_blank_block();
        if self.is_value_continuation() {
            self.cursor.skip_to_peek();
            return Ok(Some(self.get_pattern(true)?));
        }

        self.cursor.reset_peek(0);
        Ok(None)
    }

    /// Anything but a line end after inline blank starts an inline value
    fn is_value_start(&mut self) -> bool {
        !matches!(self.cursor.current_peek(), Some('\n') | None)
    }

    /// Check whether the line at the peek position continues a pattern:
    /// a placeable at any column, or indented content that is not an
    /// attribute, variant, or closing brace. Resets the peek to the line
    /// start on success.
    fn is_value_continuation(&mut self) -> bool {
        let line_start = self.cursor.peek_offset();
        self.cursor.peek_blank_inline();

        if self.cursor.current_peek() == Some('{') {
            self.cursor.reset_peek(line_start);
            return true;
        }

        if self.cursor.peek_offset() == line_start {
            return false;
        }

        match self.cursor.current_peek() {
            Some(ch) if is_pattern_continuation_char(ch) => {
                self.cursor.reset_peek(line_start);
                true
            }
            _ => false,
        }
    }

    fn get_pattern(&mut self, is_block: bool) -> ParseResult<Pattern> {
        let pattern_start = self.cursor.index();
        let mut parts: Vec<RawPart> = Vec::new();
        let mut common_indent = usize::MAX;

        if is_block {
            // The first line's indent participates in the measurement.
            let indent_start = self.cursor.index();
            let indent = self.cursor.skip_blank_inline();
            common_indent = indent;
            parts.push(RawPart::Indent {
                value: " ".repeat(indent),
                start: indent_start,
                end: self.cursor.index(),
            });
        }

        loop {
            match self.cursor.current_char() {
                None => break,
                Some('\n') => {
                    let blank_start = self.cursor.index();
                    let blank = self.cursor.peek_blank_block();
                    if !self.is_value_continuation() {
                        self.cursor.reset_peek(0);
                        break;
                    }
                    self.cursor.skip_to_peek();
                    let indent = self.cursor.skip_blank_inline();
                    common_indent = common_indent.min(indent);
                    let mut value = blank;
                    value.push_str(&" ".repeat(indent));
                    parts.push(RawPart::Indent {
                        value,
                        start: blank_start,
                        end: self.cursor.index(),
                    });
                }
                Some('{') => {
                    parts.push(RawPart::Placeable(self.get_placeable()?));
                }
                Some('}') => {
                    return Err(crate::parser::SyntaxIssue::new(
                        "E0027",
                        "Unbalanced closing brace",
                        self.cursor.index(),
                    )
                    .into());
                }
                Some(_) => {
                    parts.push(self.get_text_part());
                }
            }
        }

        let common_indent = if common_indent == usize::MAX {
            0
        } else {
            common_indent
        };
        let elements = dedent(parts, common_indent);
        Ok(Pattern {
            elements,
            span: Some(Span::new(pattern_start, self.cursor.index())),
        })
    }

    /// Literal text up to the next placeable, brace, or line end
    fn get_text_part(&mut self) -> RawPart {
        let start = self.cursor.index();
        let mut fragments: Vec<char> = Vec::new();
        while let Some(ch) = self.cursor.current_char() {
            if matches!(ch, '{' | '}' | '\n') {
                break;
            }
            fragments.push(ch);
            self.cursor.next();
        }
        RawPart::Text {
            value: fragments.into_iter().collect(),
            start,
            end: self.cursor.index(),
        }
    }
}

/// Strip the common indent, merge adjacent text, trim the trailing blank
fn dedent(parts: Vec<RawPart>, common_indent: usize) -> Vec<PatternElement> {
    let mut elements: Vec<PatternElement> = Vec::new();

    for part in parts {
        let (value, start, end) = match part {
            RawPart::Placeable(placeable) => {
                elements.push(PatternElement::Placeable(placeable));
                continue;
            }
            RawPart::Indent { mut value, start, end } => {
                // Indent spaces sit at the tail; keep the newlines plus
                // any spaces beyond the shared prefix.
                value.truncate(value.len() - common_indent);
                if value.is_empty() {
                    continue;
                }
                (value, start, end)
            }
            RawPart::Text { value, start, end } => (value, start, end),
        };

        match elements.last_mut() {
            Some(PatternElement::Text(prev)) => {
                prev.value.push_str(&value);
                prev.span = match prev.span {
                    Some(span) => Some(Span::new(span.start, end)),
                    None => Some(Span::new(start, end)),
                };
            }
            _ => elements.push(PatternElement::Text(TextElement {
                value,
                span: Some(Span::new(start, end)),
            })),
        }
    }

    // Trailing spaces and newlines do not belong to the value.
    if let Some(PatternElement::Text(last)) = elements.last_mut() {
        let trimmed = last.value.trim_end_matches([' ', '\n']).len();
        if trimmed == 0 {
            elements.pop();
        } else {
            last.value.truncate(trimmed);
        }
    }

    elements
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::ast::{Entry, PatternElement};

    fn message_text(source: &str) -> String {
        let resource = parse(source).unwrap();
        match &resource.entries[0] {
            Entry::Message(message) => {
                let pattern = message.value.as_ref().unwrap();
                pattern
                    .elements
                    .iter()
                    .map(|element| match element {
                        PatternElement::Text(text) => text.value.clone(),
                        PatternElement::Placeable(_) => "{…}".to_string(),
                    })
                    .collect()
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn blank_lines_before_block_value_are_skipped() {
        assert_eq!(message_text("msg =\n\n    value"), "value");
    }

    #[test]
    fn common_indent_is_stripped_from_continuations() {
        assert_eq!(
            message_text("msg =\n    first\n    second"),
            "first\nsecond"
        );
    }

    #[test]
    fn excess_indent_becomes_leading_text() {
        assert_eq!(
            message_text("msg =\n    first\n        deep"),
            "first\n    deep"
        );
    }

    #[test]
    fn uneven_indent_measures_the_minimum() {
        assert_eq!(
            message_text("msg =\n        first\n    second"),
            "    first\nsecond"
        );
    }

    #[test]
    fn inline_value_with_continuation() {
        assert_eq!(message_text("msg = one\n    two"), "one\ntwo");
    }

    #[test]
    fn interior_blank_lines_are_preserved() {
        assert_eq!(
            message_text("msg =\n    one\n\n    two"),
            "one\n\ntwo"
        );
    }

    #[test]
    fn trailing_blank_lines_are_trimmed() {
        assert_eq!(message_text("msg = value\n\n\n"), "value");
    }

    #[test]
    fn attribute_line_terminates_the_pattern() {
        let resource = parse("msg = value\n    .attr = other").unwrap();
        match &resource.entries[0] {
            Entry::Message(message) => {
                assert_eq!(message.attributes.len(), 1);
                let pattern = message.value.as_ref().unwrap();
                match &pattern.elements[0] {
                    PatternElement::Text(text) => assert_eq!(text.value, "value"),
                    other => panic!("unexpected element {other:?}"),
                }
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn placeable_at_column_one_continues_the_pattern() {
        let resource = parse("msg = one\n{ \"two\" }").unwrap();
        match &resource.entries[0] {
            Entry::Message(message) => {
                let pattern = message.value.as_ref().unwrap();
                assert_eq!(pattern.elements.len(), 2);
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn tab_after_equals_is_content() {
        // Tabs are not syntax whitespace; an inline value may begin with one.
        assert_eq!(message_text("msg = \tvalue"), "\tvalue");
    }
}
