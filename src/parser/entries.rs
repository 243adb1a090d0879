//! Top-level entry rules: messages, terms, comments, attributes

use crate::parser::{ParseResult, ParserRun, SyntaxIssue};
use crate::syntax::ast::{Attribute, Comment, CommentKind, Entry, Message, Term};
use crate::syntax::span::Span;

impl ParserRun {
    /// Dispatch on the first character of an entry.
    ///
    /// Entries must begin at column 1; the resource loop only calls this at
    /// a line start, so anything else (including indentation) is a syntax
    /// issue that the caller demotes to junk.
    pub(crate) fn get_entry(&mut self) -> ParseResult<Entry> {
        match self.cursor.current_char() {
            Some('#') => Ok(Entry::Comment(self.get_comment()?)),
            Some('-') => Ok(Entry::Term(self.get_term()?)),
            Some(c) if c.is_ascii_alphabetic() => Ok(Entry::Message(self.get_message()?)),
            _ => Err(SyntaxIssue::new(
                "E0002",
                "Expected an entry start",
                self.cursor.index(),
            )
            .into()),
        }
    }

    /// Parse a comment entry, merging directly adjacent same-level lines.
    ///
    /// Each comment line's trailing newline is consumed, so two mergeable
    /// comment lines are separated by nothing at all when the second one is
    /// inspected.
    pub(crate) fn get_comment(&mut self) -> ParseResult<Comment> {
        let start = self.cursor.index();
        let level = self.get_comment_sigil()?;
        let mut content = self.get_comment_line()?;

        loop {
            match self.peek_comment_sigil() {
                Some(next_level) if next_level == level => {
                    self.cursor.skip_to_peek();
                    content.push('\n');
                    content.push_str(&self.get_comment_line()?);
                }
                _ => {
                    self.cursor.reset_peek(0);
                    break;
                }
            }
        }

        let kind = match level {
            1 => CommentKind::Single,
            2 => CommentKind::Group,
            _ => CommentKind::Resource,
        };
        Ok(Comment {
            kind,
            content,
            span: Some(Span::new(start, self.cursor.index())),
        })
    }

    /// Consume `#`, `##`, or `###`; a fourth `#` is malformed
    fn get_comment_sigil(&mut self) -> ParseResult<usize> {
        let mut level = 0;
        while level < 3 && self.cursor.current_char() == Some('#') {
            self.cursor.next();
            level += 1;
        }
        if self.cursor.current_char() == Some('#') {
            return Err(SyntaxIssue::new(
                "E0003",
                "Expected a comment sigil of at most three #",
                self.cursor.index(),
            )
            .into());
        }
        Ok(level)
    }

    /// Peek a comment sigil at the current position without committing
    fn peek_comment_sigil(&mut self) -> Option<usize> {
        let mut level = 0;
        while level < 3 && self.cursor.current_peek() == Some('#') {
            self.cursor.peek();
            level += 1;
        }
        if level == 0 {
            return None;
        }
        match self.cursor.current_peek() {
            Some(' ') | Some('\n') | None => Some(level),
            _ => None,
        }
    }

    /// Read one comment line's content, consuming the trailing newline
    fn get_comment_line(&mut self) -> ParseResult<String> {
        match self.cursor.current_char() {
            Some(' ') => {
                self.cursor.next();
            }
            Some('\n') | None => {}
            Some(_) => {
                return Err(SyntaxIssue::new(
                    "E0003",
                    "Expected a space after the comment sigil",
                    self.cursor.index(),
                )
                .into());
            }
        }
        let mut fragments: Vec<char> = Vec::new();
        while let Some(ch) = self.cursor.current_char() {
            if ch == '\n' {
                break;
            }
            fragments.push(ch);
            self.cursor.next();
        }
        if self.cursor.current_char() == Some('\n') {
            self.cursor.next();
        }
        Ok(fragments.into_iter().collect())
    }

    pub(crate) fn get_message(&mut self) -> ParseResult<Message> {
        let start = self.cursor.index();
        let id = self.get_identifier()?;
        self.cursor.skip_blank_inline();
        self.expect_char('=')?;

        let value = self.maybe_get_pattern()?;
        let attributes = self.get_attributes()?;

        if value.is_none() && attributes.is_empty() {
            return Err(SyntaxIssue::new(
                "E0005",
                format!("Expected message \"{}\" to have a value or attributes", id.name),
                self.cursor.index(),
            )
            .into());
        }

        Ok(Message {
            id,
            value,
            attributes,
            comment: None,
            span: Some(Span::new(start, self.cursor.index())),
        })
    }

    pub(crate) fn get_term(&mut self) -> ParseResult<Term> {
        let start = self.cursor.index();
        self.expect_char('-')?;
        let id = self.get_identifier()?;
        self.cursor.skip_blank_inline();
        self.expect_char('=')?;

        let value = match self.maybe_get_pattern()? {
            Some(pattern) => pattern,
            None => {
                return Err(SyntaxIssue::new(
                    "E0006",
                    format!("Expected term \"-{}\" to have a value", id.name),
                    self.cursor.index(),
                )
                .into());
            }
        };
        let attributes = self.get_attributes()?;

        Ok(Term {
            id,
            value,
            attributes,
            comment: None,
            span: Some(Span::new(start, self.cursor.index())),
        })
    }

    /// Collect `.name = pattern` lines following an entry value
    fn get_attributes(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            self.cursor.peek_blank();
            if self.cursor.current_peek() != Some('.') {
                self.cursor.reset_peek(0);
                break;
            }
            self.cursor.skip_to_peek();
            attributes.push(self.get_attribute()?);
        }
        Ok(attributes)
    }

    fn get_attribute(&mut self) -> ParseResult<Attribute> {
        let start = self.cursor.index();
        self.expect_char('.')?;
        let id = self.get_identifier()?;
        self.cursor.skip_blank_inline();
        self.expect_char('=')?;

        match self.maybe_get_pattern()? {
            Some(value) => Ok(Attribute {
                id,
                value,
                span: Some(Span::new(start, self.cursor.index())),
            }),
            None => Err(SyntaxIssue::new(
                "E0012",
                "Expected an attribute value",
                self.cursor.index(),
            )
            .into()),
        }
    }
}
