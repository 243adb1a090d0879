//! FTL Engine: parser, validator, and runtime resolver for Fluent (FTL)
//!
//! This crate implements the core of a localization engine around the Fluent
//! message-format language:
//!
//! - **Syntax layer** ([`syntax`], [`parser`], [`serializer`]): a
//!   recursive-descent parser producing an immutable AST with error-recovery
//!   ("junk") semantics, and a serializer that round-trips valid resources.
//! - **Semantic layer** ([`validator`], [`diagnostics`]): structural and
//!   reference analysis over a parsed resource, including cycle and
//!   chain-depth detection across the message and term namespaces.
//! - **Runtime** ([`bundle`], [`resolver`], [`functions`], [`locale`]): a
//!   thread-safe bundle holding messages, terms and functions, an expression
//!   evaluator with depth guards, and locale-aware formatting and parsing of
//!   numbers, dates, and currencies.
//!
//! The [`api`] module exposes the pure top-level entry points;
//! [`bundle::Bundle`] is the stateful runtime container.
//!
//! # Error model
//!
//! Malformed source is never an `Err`: the parser isolates unparseable
//! regions as [`syntax::ast::Junk`] entries and continues. The resolver
//! returns `(String, Vec<FormattingError>)`, substituting documented fallback
//! strings for anything it could not resolve. Only resource limits (source
//! size, token length, nesting depth) and strict-mode integrity checks
//! surface as errors.
//!
//! ```rust
//! use ftl_engine::bundle::Bundle;
//!
//! let bundle = Bundle::new("en").unwrap();
//! bundle.add_resource("hello = Hello, world!").unwrap();
//! let (value, errors) = bundle.format_pattern("hello", None, None).unwrap();
//! assert_eq!(value, "Hello, world!");
//! assert!(errors.is_empty());
//! ```

pub mod api;
pub mod bundle;
pub mod diagnostics;
pub mod functions;
pub mod locale;
pub mod parser;
pub mod resolver;
pub mod serializer;
pub mod syntax;
pub mod validator;

pub use api::{
    parse, parse_currency, parse_date, parse_datetime, parse_decimal, parse_number, serialize,
    validate_resource,
};
pub use bundle::{Bundle, BundleConfig, CacheConfig};
pub use diagnostics::runtime::{FormattingError, FormattingErrorKind, IntegrityError};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use resolver::value::{FluentArgs, FluentNumber, FluentValue};
