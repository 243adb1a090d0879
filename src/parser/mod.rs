//! FTL Parser - Source Text to Resource
//!
//! Recursive-descent parser over the character cursor. The parser is a pure
//! function of source text and its own configuration: malformed entries are
//! isolated as [`Junk`] and parsing continues with the next entry, so
//! `parse` only fails on resource limits (source size, token length,
//! nesting depth) or invalid configuration.
//!
//! Grammar rules are split by concern, mirroring the AST layering:
//!
//! - [`entries`] - top-level entries, comments, attributes
//! - [`patterns`] - pattern bodies, multiline dedent handling
//! - [`expressions`] - placeables, references, calls, select expressions
//! - [`literals`] - identifiers, numbers, string escapes

mod entries;
mod expressions;
mod literals;
mod patterns;

use crate::syntax::ast::{Annotation, Entry, Junk, Resource};
use crate::syntax::cursor::{normalize_newlines, Cursor};
use crate::syntax::depth::{DepthExceeded, DepthGuard};
use crate::syntax::span::Span;

/// Default source size ceiling (10 MiB)
pub const DEFAULT_MAX_SOURCE_SIZE: usize = 10 * 1024 * 1024;

/// Default nesting depth budget
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Identifier length ceiling
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Number literal raw-text ceiling
pub const MAX_NUMBER_LENGTH: usize = 1_000;

/// String literal value ceiling
pub const MAX_STRING_LENGTH: usize = 1_000_000;

/// Parser limits and options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum accepted source length in bytes
    pub max_source_size: usize,
    /// Maximum nesting depth for placeables and call arguments
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_source_size: DEFAULT_MAX_SOURCE_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Reject configurations that cannot parse anything
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.max_nesting_depth == 0 {
            return Err(ParseError::InvalidConfig(
                "max_nesting_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fatal parse failures
///
/// Syntax problems never show up here; they become [`Junk`] entries in the
/// returned resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    SourceTooLarge { size: usize, max: usize },
    TokenTooLong { token: &'static str, max: usize },
    DepthExceeded { max: usize },
    InvalidConfig(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::SourceTooLarge { size, max } => {
                write!(f, "source is {size} bytes, limit is {max}")
            }
            ParseError::TokenTooLong { token, max } => {
                write!(f, "{token} exceeds the maximum length of {max}")
            }
            ParseError::DepthExceeded { max } => {
                write!(f, "nesting depth limit of {max} exceeded")
            }
            ParseError::InvalidConfig(msg) => write!(f, "invalid parser config: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Recoverable syntax problem; turned into a junk annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxIssue {
    pub code: &'static str,
    pub message: String,
    pub offset: usize,
}

impl SyntaxIssue {
    pub fn new(code: &'static str, message: impl Into<String>, offset: usize) -> Self {
        Self {
            code,
            message: message.into(),
            offset,
        }
    }
}

/// Either a recoverable syntax issue or a fatal limit violation
#[derive(Debug)]
pub(crate) enum ParserIssue {
    Syntax(SyntaxIssue),
    Fatal(ParseError),
}

impl From<SyntaxIssue> for ParserIssue {
    fn from(issue: SyntaxIssue) -> Self {
        ParserIssue::Syntax(issue)
    }
}

impl From<DepthExceeded> for ParserIssue {
    fn from(err: DepthExceeded) -> Self {
        ParserIssue::Fatal(ParseError::DepthExceeded {
            max: err.max_depth,
        })
    }
}

pub(crate) type ParseResult<T> = Result<T, ParserIssue>;

/// Configured FTL parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse FTL source into a resource.
    ///
    /// Newlines are normalized to LF before scanning; spans refer to the
    /// normalized text.
    pub fn parse(&self, source: &str) -> Result<Resource, ParseError> {
        self.config.validate()?;
        if source.len() > self.config.max_source_size {
            return Err(ParseError::SourceTooLarge {
                size: source.len(),
                max: self.config.max_source_size,
            });
        }
        let normalized = normalize_newlines(source);
        let mut run = ParserRun {
            cursor: Cursor::new(&normalized),
            depth: DepthGuard::new(self.config.max_nesting_depth),
        };
        run.parse_resource().map_err(|issue| match issue {
            // The resource rule converts syntax issues to junk; anything
            // escaping it is a limit violation.
            ParserIssue::Fatal(err) => err,
            ParserIssue::Syntax(issue) => {
                ParseError::InvalidConfig(format!("unhandled syntax issue: {}", issue.message))
            }
        })
    }
}

/// Parse with default limits
pub fn parse(source: &str) -> Result<Resource, ParseError> {
    Parser::default().parse(source)
}

/// Per-parse state shared by the grammar rules
pub(crate) struct ParserRun {
    pub(crate) cursor: Cursor,
    pub(crate) depth: DepthGuard,
}

impl ParserRun {
    fn parse_resource(&mut self) -> ParseResult<Resource> {
        let resource_start = self.cursor.index();
        let mut entries = Vec::new();
        // A parsed Single comment waiting to be attached to the next
        // message or term; the flag records whether blank lines followed.
        let mut pending_comment: Option<crate::syntax::ast::Comment> = None;
        let mut blanks_after_comment = 0;

        self.cursor.skip_blank_block();
        while !self.cursor.is_eof() {
            let parsed = self.entry_or_junk()?;
            match parsed {
                Entry::Comment(comment) => {
                    if let Some(stale) = pending_comment.take() {
                        entries.push(Entry::Comment(stale));
                    }
                    if comment.kind == crate::syntax::ast::CommentKind::Single {
                        pending_comment = Some(comment);
                    } else {
                        entries.push(Entry::Comment(comment));
                    }
                }
                Entry::Message(mut message) => {
                    if let Some(comment) = pending_comment.take() {
                        if blanks_after_comment == 0 {
                            message.comment = Some(comment);
                        } else {
                            entries.push(Entry::Comment(comment));
                        }
                    }
                    entries.push(Entry::Message(message));
                }
                Entry::Term(mut term) => {
                    if let Some(comment) = pending_comment.take() {
                        if blanks_after_comment == 0 {
                            term.comment = Some(comment);
                        } else {
                            entries.push(Entry::Comment(comment));
                        }
                    }
                    entries.push(Entry::Term(term));
                }
                Entry::Junk(junk) => {
                    if let Some(stale) = pending_comment.take() {
                        entries.push(Entry::Comment(stale));
                    }
                    entries.push(Entry::Junk(junk));
                }
            }
            blanks_after_comment = self.cursor.skip_blank_block();
        }
        if let Some(comment) = pending_comment.take() {
            entries.push(Entry::Comment(comment));
        }

        Ok(Resource {
            entries,
            span: Some(Span::new(resource_start, self.cursor.index())),
        })
    }

    /// Parse one entry, demoting recoverable syntax issues to junk
    fn entry_or_junk(&mut self) -> ParseResult<Entry> {
        let entry_start = self.cursor.index();
        match self.get_entry() {
            Ok(entry) => Ok(entry),
            Err(ParserIssue::Syntax(issue)) => {
                self.skip_to_next_entry_start(entry_start);
                let end = self.cursor.index();
                let content = self.cursor.slice(entry_start, end);
                Ok(Entry::Junk(Junk {
                    content,
                    annotations: vec![Annotation {
                        code: issue.code.to_string(),
                        message: issue.message,
                        span: Some(Span::new(issue.offset, issue.offset)),
                    }],
                    span: Some(Span::new(entry_start, end)),
                }))
            }
            Err(fatal) => Err(fatal),
        }
    }

    /// Advance past the failed region to the next line that could start an
    /// entry: column 1 with `#`, `-`, or an ASCII letter. Indented lines
    /// beginning with those characters stay inside the junk.
    fn skip_to_next_entry_start(&mut self, junk_start: usize) {
        // Rewind to the start of the line the error landed on, as long as
        // that does not move before the junk itself.
        let mut line_start = self.cursor.index();
        while line_start > junk_start {
            if self.cursor.char_at(line_start - 1) == Some('\n') {
                break;
            }
            line_start -= 1;
        }
        if line_start > junk_start {
            self.cursor.rewind(line_start);
        }

        while let Some(ch) = self.cursor.current_char() {
            if ch != '\n' {
                self.cursor.next();
                continue;
            }
            let next = self.cursor.next();
            match next {
                Some(c) if c.is_ascii_alphabetic() || c == '-' || c == '#' => break,
                Some(_) => continue,
                None => break,
            }
        }
    }
}
