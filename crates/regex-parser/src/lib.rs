//! Pattern parser.
//!
//! Turns a pattern string into a [`regex_ast::Node`] tree via a single
//! recursive-descent pass; normalization (collapsing single-child
//! sequences, fusing adjacent literals) lives in `regex-ast` and is run
//! separately by the caller.

mod error;
mod parser;

pub use error::ParseError;
pub use parser::parse;
