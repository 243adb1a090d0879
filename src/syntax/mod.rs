//! Syntax layer - source scanning and the FTL AST
//!
//! - [`span`] - character spans into normalized source
//! - [`cursor`] - bounded character-level navigation with peek/backtrack
//! - [`depth`] - recursion budget shared by parser, serializer, and visitors
//! - [`ast`] - immutable node types for parsed resources
//! - [`visit`] - visitor and transformer protocol over the AST

pub mod ast;
pub mod cursor;
pub mod depth;
pub mod span;
pub mod visit;
