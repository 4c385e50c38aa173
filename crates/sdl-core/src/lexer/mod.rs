//! Lexer for SDL documents
//!
//! Converts source text into a flat token stream. Comments are kept as tokens so
//! the parser can attach them to tags, and newlines are kept because they
//! terminate tags. Invalid input produces [`TokenKind::Error`] tokens plus a
//! recorded [`SpannedError`]; lexing always runs to the end of the input.

#![allow(clippy::cast_possible_truncation)] // Spans are u32; documents over 4GB are unsupported

mod span;
mod token;

pub use span::{LineIndex, Location, Span};
pub use token::TokenKind;

use logos::Logos;
use thiserror::Error;

/// A token with its kind, span, and source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// The exact source text of the token
    pub lexeme: String,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
        }
    }

    /// Decoded contents of a string token, `None` for any other kind
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        match self.kind {
            TokenKind::String => Some(decode_escapes(strip_delimiters(&self.lexeme)).0),
            TokenKind::RawString => Some(strip_delimiters(&self.lexeme).to_string()),
            _ => None,
        }
    }
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character")]
    UnexpectedChar,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("invalid escape sequence: \\{0}")]
    InvalidEscape(char),
}

/// A lexer error with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedError {
    pub error: LexError,
    pub span: Span,
}

impl SpannedError {
    #[must_use]
    pub fn new(error: LexError, span: Span) -> Self {
        Self { error, span }
    }
}

impl std::fmt::Display for SpannedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.error, self.span)
    }
}

impl std::error::Error for SpannedError {}

/// The SDL lexer
pub struct Lexer<'source> {
    source: &'source str,
    inner: logos::Lexer<'source, TokenKind>,
    errors: Vec<SpannedError>,
    finished: bool,
}

impl<'source> Lexer<'source> {
    #[must_use]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Tokenize the entire source. The returned stream always ends with [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<SpannedError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }
        (tokens, lexer.errors)
    }

    /// Next token, `None` once the `Eof` token has been produced
    pub fn next_token(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let Some(result) = self.inner.next() else {
            self.finished = true;
            let end = self.source.len() as u32;
            return Some(Token::new(TokenKind::Eof, Span::point(end), ""));
        };

        let span = Span::from_range(self.inner.span());
        let lexeme = self.inner.slice();

        let token = match result {
            Ok(TokenKind::UnterminatedString) => {
                self.errors
                    .push(SpannedError::new(LexError::UnterminatedString, span));
                Token::new(TokenKind::Error, span, lexeme)
            }
            Ok(TokenKind::String) => {
                self.check_escapes(lexeme, span.start);
                Token::new(TokenKind::String, span, lexeme)
            }
            Ok(kind) => Token::new(kind, span, lexeme),
            Err(()) if lexeme.starts_with("/*") => {
                self.errors
                    .push(SpannedError::new(LexError::UnterminatedBlockComment, span));
                Token::new(TokenKind::Error, span, lexeme)
            }
            Err(()) => {
                self.errors
                    .push(SpannedError::new(LexError::UnexpectedChar, span));
                Token::new(TokenKind::Error, span, lexeme)
            }
        };
        Some(token)
    }

    /// Record an error for every unknown escape in a string lexeme starting at `start`
    fn check_escapes(&mut self, lexeme: &str, start: u32) {
        let (_, invalid) = decode_escapes(strip_delimiters(lexeme));
        for (offset, ch) in invalid {
            // +1 for the opening quote
            let at = start + 1 + offset as u32;
            self.errors.push(SpannedError::new(
                LexError::InvalidEscape(ch),
                Span::new(at, at + 1 + ch.len_utf8() as u32),
            ));
        }
    }

    /// Errors collected so far
    #[must_use]
    pub fn errors(&self) -> &[SpannedError] {
        &self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

fn strip_delimiters(lexeme: &str) -> &str {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Decode backslash escapes. Unknown escapes keep the escaped character and are
/// reported as `(byte offset of the backslash, character)`.
fn decode_escapes(body: &str) -> (String, Vec<(usize, char)>) {
    let mut out = String::with_capacity(body.len());
    let mut invalid = Vec::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            out.push('\\');
            break;
        };
        let decoded = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' => '\\',
            '"' => '"',
            '0' => '\0',
            other => {
                invalid.push((i, other));
                other
            }
        };
        out.push(decoded);
    }

    (out, invalid)
}

/// Whether `text` lexes as exactly one identifier, so it can be written as a bare tag name
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut inner = TokenKind::lexer(text);
    matches!(inner.next(), Some(Ok(TokenKind::Identifier)))
        && inner.span() == (0..text.len())
        && inner.next().is_none()
}

/// Escape a string for output between double quotes
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::tokenize(source).0
    }

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_tag() {
        assert_eq!(
            lex_kinds(r#"name "react-flip";"#),
            vec![
                TokenKind::Identifier,
                TokenKind::String,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_namespaced_and_dotted_identifiers() {
        let tokens = lex("lint:fix build.prod peer-dependencies");
        assert_eq!(tokens[0].lexeme, "lint:fix");
        assert_eq!(tokens[1].lexeme, "build.prod");
        assert_eq!(tokens[2].lexeme, "peer-dependencies");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn lex_numbers() {
        let tokens = lex("42 -7 3.14 -0.5 1e6 2.5E-3");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Integer,
                TokenKind::Integer,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[1].lexeme, "-7");
        assert_eq!(tokens[5].lexeme, "2.5E-3");
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(
            lex_kinds("true false null truthy"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_attribute() {
        assert_eq!(
            lex_kinds("prettier=true"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::True,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn newlines_are_tokens_and_continuations_are_skipped() {
        assert_eq!(
            lex_kinds("a 1\nb \\\n 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_comments() {
        assert_eq!(
            lex_kinds("// one\n# two\n/* three\n*/ a 1"),
            vec![
                TokenKind::LineComment,
                TokenKind::Newline,
                TokenKind::LineComment,
                TokenKind::Newline,
                TokenKind::BlockComment,
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn block_comment_with_stars() {
        let tokens = lex("/** doc **/ a");
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
        assert_eq!(tokens[0].lexeme, "/** doc **/");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn block_comments_between_items() {
        assert_eq!(
            lex_kinds("a 1 /* x */ ;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Integer,
                TokenKind::BlockComment,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
        let tokens = lex("a 1 /**/ ;");
        assert_eq!(tokens[2].lexeme, "/**/");
        let (tokens, errors) = Lexer::tokenize("/* manifest */\nname 1");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].lexeme, "/* manifest */");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
    }

    #[test]
    fn block_comment_spans_lines() {
        let tokens = lex("/* one\n * two\n */ a 1");
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
        assert_eq!(tokens[0].span, Span::new(0, 17));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let (tokens, errors) = Lexer::tokenize("a 1 /* never closed\nb 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, LexError::UnterminatedBlockComment);
        assert_eq!(errors[0].span, Span::new(4, 23));
        assert_eq!(tokens[2].kind, TokenKind::Error);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let tokens = lex(r#""tab\there \"quoted\"""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(
            tokens[0].string_value().as_deref(),
            Some("tab\there \"quoted\"")
        );
    }

    #[test]
    fn raw_strings_span_lines() {
        let tokens = lex("`line one\nline \\two`");
        assert_eq!(tokens[0].kind, TokenKind::RawString);
        assert_eq!(
            tokens[0].string_value().as_deref(),
            Some("line one\nline \\two")
        );
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn invalid_escape_is_reported() {
        let (tokens, errors) = Lexer::tokenize(r#""a\qb""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].string_value().as_deref(), Some("aqb"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, LexError::InvalidEscape('q'));
        assert_eq!(errors[0].span, Span::new(2, 4));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let (tokens, errors) = Lexer::tokenize("name \"oops\nversion \"1\"");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(errors[0].error, LexError::UnterminatedString);
        // lexing resumes on the next line
        assert!(tokens.iter().any(|t| t.lexeme == "version"));
    }

    #[test]
    fn error_recovery_continues() {
        let (tokens, errors) = Lexer::tokenize("a @ 1");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error, LexError::UnexpectedChar);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Error,
                TokenKind::Integer,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = lex("license \"MIT\";");
        assert_eq!(tokens[0].span, Span::new(0, 7));
        assert_eq!(tokens[1].span, Span::new(8, 13));
        assert_eq!(tokens[2].span, Span::new(13, 14));
        assert_eq!(tokens[3].span, Span::point(14));
    }

    #[test]
    fn escape_string_round_trips_through_decoder() {
        let original = "say \"hi\"\n\\ok";
        let escaped = escape_string(original);
        assert_eq!(decode_escapes(&escaped).0, original);
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("eslint-plugin-react"));
        assert!(is_identifier("lint:fix"));
        assert!(!is_identifier("@babel/core"));
        assert!(!is_identifier("true"));
        assert!(!is_identifier(" react"));
        assert!(!is_identifier("react dom"));
        assert!(!is_identifier(""));
    }
}
