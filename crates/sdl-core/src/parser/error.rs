//! Parser error types

use crate::lexer::{LexError, Span, SpannedError, TokenKind};
use thiserror::Error;

/// A parse error with its location
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Optional hint for fixing the error
    pub hint: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<&SpannedError> for ParseError {
    fn from(err: &SpannedError) -> Self {
        let error = Self::new(ParseErrorKind::Lex(err.error.clone()), err.span);
        match err.error {
            LexError::UnterminatedString => {
                error.with_hint("strings cannot span lines; use a `backtick` string instead")
            }
            LexError::InvalidEscape(_) => {
                error.with_hint(r#"supported escapes are \n \t \r \\ \" and \0"#)
            }
            LexError::UnterminatedBlockComment => error.with_hint("close the comment with `*/`"),
            LexError::UnexpectedChar => error,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(LexError),

    #[error("expected identifier, found {0}")]
    ExpectedIdentifier(TokenKind),

    #[error("expected literal value or attribute")]
    ExpectedValueOrAttribute,

    #[error("expected literal after '='")]
    ExpectedLiteral,

    #[error("expected '{expected}' after {context}")]
    ExpectedAfter {
        expected: &'static str,
        context: &'static str,
    },

    #[error("expected ';' or '{{', found {0}")]
    ExpectedTerminator(TokenKind),

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("tags nested more than {0} levels deep")]
    NestingTooDeep(usize),
}
