//! SDL Core - Language engine for SDL (Simple Declarative Language)
//!
//! This crate provides:
//! - Lexer: Tokenization of SDL source text
//! - AST: The tag/value/attribute document model
//! - Parser: Error-recovering document construction
//! - Diagnostic: Source-annotated error reports
//! - Formatter: Canonical source formatting

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - tokenization of SDL source
pub mod lexer;

/// Document model - parsed representation of SDL source
pub mod ast;

/// Parser module - converts tokens into a document
pub mod parser;

/// Rendering of errors and warnings against source
pub mod diagnostic;

/// Source formatter
pub mod formatter;

pub use ast::{Attribute, Comment, CommentKind, Document, Ident, Literal, Tag, Value};
pub use diagnostic::{Diagnostic, Severity};
pub use formatter::{FormatConfig, Formatter};
pub use lexer::{Lexer, Span};
pub use parser::{ParseError, ParseErrorKind, Parser};

/// Parse SDL source, collecting every error
///
/// # Errors
///
/// Returns all lexical and syntax errors found in `source`.
pub fn parse(source: &str) -> Result<Document, Vec<ParseError>> {
    Parser::parse_document(source)
}

/// Parse and reformat SDL source
///
/// # Errors
///
/// Returns the parse errors when `source` is not valid SDL.
pub fn format_source(source: &str, config: FormatConfig) -> Result<String, Vec<ParseError>> {
    let document = Parser::parse_document(source)?;
    Ok(Formatter::with_config(config).format(&document))
}
