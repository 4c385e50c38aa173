//! Parser for SDL documents
//!
//! A recursive-descent parser over the token stream produced by the
//! [`Lexer`](crate::lexer::Lexer). Tags end at a `;`, a newline, the end of the
//! input, or the `}` of an enclosing body. Errors are collected rather than
//! aborting the parse: after an error the parser skips to the next separator
//! and carries on, so one run reports every problem in the file.
//!
//! # Example
//!
//! ```
//! use sdl_core::parser::Parser;
//!
//! let doc = Parser::parse_document("name \"react-flip\";\nscripts {\n  lint \"eslint src\"\n}\n").unwrap();
//! assert_eq!(doc.tags.len(), 2);
//! assert_eq!(doc.tag("scripts").unwrap().children.len(), 1);
//! ```

mod error;

pub use error::{ParseError, ParseErrorKind};

use crate::ast::{Attribute, Comment, Document, Ident, Literal, Tag, Value};
use crate::lexer::{Lexer, Span, Token, TokenKind};

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest body nesting accepted before the parser gives up on a tag
pub const MAX_NESTING_DEPTH: usize = 128;

/// The SDL parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<ParseError>,
    /// Comments seen since the last time they were attached to a tag
    pending_comments: Vec<Comment>,
    /// Number of bodies currently open
    depth: usize,
}

impl Parser {
    /// Create a parser over `source`. Lexer errors are recorded up front.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let (tokens, lex_errors) = Lexer::tokenize(source);
        let mut parser = Self {
            tokens,
            position: 0,
            errors: lex_errors.iter().map(ParseError::from).collect(),
            pending_comments: Vec::new(),
            depth: 0,
        };
        parser.collect_comments();
        parser
    }

    /// Parse a complete document, failing if any error was found
    pub fn parse_document(source: &str) -> Result<Document, Vec<ParseError>> {
        let (document, errors) = Self::parse_lenient(source);
        if errors.is_empty() {
            Ok(document)
        } else {
            Err(errors)
        }
    }

    /// Parse a document and return whatever could be recovered alongside all
    /// errors, ordered by position
    #[must_use]
    pub fn parse_lenient(source: &str) -> (Document, Vec<ParseError>) {
        let mut parser = Parser::new(source);
        let document = parser.document();
        let mut errors = parser.errors;
        errors.sort_by_key(|e| (e.span.start, e.span.end));
        tracing::debug!(
            tags = document.tags.len(),
            errors = errors.len(),
            "parsed SDL document"
        );
        (document, errors)
    }

    // ==================== Token Management ====================

    fn current(&self) -> &Token {
        // The stream always ends with Eof and `advance` never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn is_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Span of the last consumed token
    fn previous_span(&self) -> Span {
        self.tokens[..self.position]
            .iter()
            .rev()
            .find(|t| !t.kind.is_comment())
            .map_or(Span::default(), |t| t.span)
    }

    /// Consume the current token, then any comments that follow it
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_eof() {
            self.position += 1;
        }
        self.collect_comments();
        token
    }

    /// Move comment tokens at the cursor into `pending_comments`
    fn collect_comments(&mut self) {
        while self.current_kind().is_comment() {
            let token = self.current().clone();
            let comment = if token.kind == TokenKind::LineComment {
                Comment::line(token.lexeme, token.span)
            } else {
                Comment::block(token.lexeme, token.span)
            };
            self.pending_comments.push(comment);
            self.position += 1;
        }
    }

    fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.pending_comments)
    }

    /// Record an error. An error at a span that already has one (typically the
    /// lexer's own report for an `Error` token) is dropped.
    fn error(&mut self, error: ParseError) {
        if !self.errors.iter().any(|e| e.span == error.span) {
            self.errors.push(error);
        }
    }

    /// Skip `;` and newlines. Returns true if an empty line was crossed.
    fn skip_separators(&mut self) -> bool {
        let mut newlines = 0;
        while self.current_kind().is_separator() {
            if self.check(TokenKind::Newline) {
                newlines += 1;
            }
            self.advance();
        }
        newlines >= 2
    }

    // ==================== Document Parsing ====================

    fn document(&mut self) -> Document {
        let start = self.current().span.start;
        let mut tags = Vec::new();
        let mut first = true;

        loop {
            let blank = self.skip_separators();
            if self.is_eof() {
                break;
            }
            match self.tag_declaration() {
                Ok(mut tag) => {
                    tag.blank_line_before = blank && !first;
                    tags.push(tag);
                }
                Err(e) => {
                    self.error(e);
                    self.synchronize(false);
                }
            }
            first = false;
        }

        let end = self.current().span.end;
        let mut document = Document::new(tags, Span::new(start, end));
        document.dangling_comments = self.take_comments();
        document
    }

    /// Parse one tag: `name item* (terminator | body)`
    fn tag_declaration(&mut self) -> ParseResult<Tag> {
        let leading = self.take_comments();
        let name = self.identifier()?;
        let mut tag = Tag::new(name);
        tag.comments.leading = leading;

        loop {
            match self.current_kind() {
                TokenKind::Semicolon
                | TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::RightBrace
                | TokenKind::LeftBrace => break,
                TokenKind::Identifier => {
                    let attribute = self.attribute()?;
                    tag.set_attribute(attribute);
                }
                TokenKind::Error => return Err(self.lex_error()),
                kind if kind.is_literal() => {
                    let literal = self.literal()?;
                    tag.values.push(literal);
                }
                kind => {
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedTerminator(kind),
                        self.current().span,
                    ));
                }
            }
        }

        if self.check(TokenKind::LeftBrace) {
            if self.depth >= MAX_NESTING_DEPTH {
                let span = self.current().span;
                self.skip_body();
                return Err(ParseError::new(
                    ParseErrorKind::NestingTooDeep(MAX_NESTING_DEPTH),
                    span,
                )
                .with_hint(format!("`{}` and everything inside it was skipped", tag.name)));
            }
            self.advance();
            tag.has_body = true;
            self.depth += 1;
            let result = self.body(&mut tag);
            self.depth -= 1;
            result?;
            self.eat_semicolon();
        } else {
            if tag.values.is_empty() && tag.attributes.is_empty() {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedValueOrAttribute,
                    self.current().span,
                )
                .with_hint("a tag without a `{ }` body needs at least one value or attribute"));
            }
            self.eat_semicolon();
        }

        // Comments collected since the last token are on the tag's final line
        tag.comments.trailing = self.take_comments();
        tag.span = tag.name.span.merge(self.previous_span());
        Ok(tag)
    }

    /// Parse children up to and including the closing `}`
    fn body(&mut self, tag: &mut Tag) -> ParseResult<()> {
        let mut first = true;
        loop {
            let blank = self.skip_separators();
            match self.current_kind() {
                TokenKind::RightBrace => {
                    tag.comments.inner = self.take_comments();
                    self.advance();
                    return Ok(());
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedAfter {
                            expected: "}",
                            context: "tag body",
                        },
                        self.current().span,
                    )
                    .with_hint(format!("the body of `{}` is never closed", tag.name)));
                }
                _ => match self.tag_declaration() {
                    Ok(mut child) => {
                        child.blank_line_before = blank && !first;
                        tag.children.push(child);
                    }
                    Err(e) => {
                        self.error(e);
                        self.synchronize(true);
                    }
                },
            }
            first = false;
        }
    }

    fn eat_semicolon(&mut self) {
        if self.check(TokenKind::Semicolon) {
            self.advance();
        }
    }

    // ==================== Items ====================

    fn identifier(&mut self) -> ParseResult<Ident> {
        match self.current_kind() {
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Ident::new(token.lexeme, token.span))
            }
            TokenKind::Error => Err(self.lex_error()),
            kind => {
                let error =
                    ParseError::new(ParseErrorKind::ExpectedIdentifier(kind), self.current().span);
                if kind.is_literal() {
                    Err(error.with_hint("every line must start with a tag name"))
                } else {
                    Err(error)
                }
            }
        }
    }

    /// `name = literal`
    fn attribute(&mut self) -> ParseResult<Attribute> {
        let name = self.identifier()?;

        if !self.check(TokenKind::Equal) {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedAfter {
                    expected: "=",
                    context: "attribute name",
                },
                self.current().span,
            )
            .with_hint(format!(
                "`{name}` is not the first word on its line; separate tags with ';' or a newline"
            )));
        }
        let equal = self.advance();

        if !self.current_kind().is_literal() {
            if self.check(TokenKind::Error) {
                return Err(self.lex_error());
            }
            return Err(ParseError::new(ParseErrorKind::ExpectedLiteral, equal.span));
        }
        let value = self.literal()?;
        Ok(Attribute::new(name, value))
    }

    fn literal(&mut self) -> ParseResult<Literal> {
        let token = self.advance();
        let value = match token.kind {
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Null => Value::Null,
            TokenKind::Integer => {
                let int = token.lexeme.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidNumber(token.lexeme.clone()),
                        token.span,
                    )
                    .with_hint("integers must fit in 64 bits")
                })?;
                Value::Integer(int)
            }
            TokenKind::Float => match token.lexeme.parse::<f64>() {
                Ok(float) if float.is_finite() => Value::Float(float),
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidNumber(token.lexeme.clone()),
                        token.span,
                    ));
                }
            },
            TokenKind::String | TokenKind::RawString => {
                Value::String(token.string_value().unwrap_or_default())
            }
            kind => {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedTerminator(kind),
                    token.span,
                ));
            }
        };
        Ok(Literal::new(value, token.span))
    }

    /// Error for an `Error` token at the cursor; the lexer already reported it
    fn lex_error(&self) -> ParseError {
        let span = self.current().span;
        self.errors
            .iter()
            .find(|e| e.span == span)
            .cloned()
            .unwrap_or_else(|| {
                ParseError::new(
                    ParseErrorKind::Lex(crate::lexer::LexError::UnexpectedChar),
                    span,
                )
            })
    }

    // ==================== Error Recovery ====================

    /// Skip a `{ ... }` body and everything nested in it without recursing.
    /// Comments inside it are dropped.
    fn skip_body(&mut self) {
        let mut open = 0_usize;
        while !self.is_eof() {
            match self.current_kind() {
                TokenKind::LeftBrace => open += 1,
                TokenKind::RightBrace => open -= 1,
                _ => {}
            }
            self.advance();
            if open == 0 {
                break;
            }
        }
        self.pending_comments.clear();
    }

    /// Skip to just past the next separator. Inside a body, stop before a `}`
    /// so the body can close.
    fn synchronize(&mut self, in_body: bool) {
        while !self.is_eof() {
            match self.current_kind() {
                TokenKind::Semicolon | TokenKind::Newline => {
                    self.advance();
                    return;
                }
                TokenKind::RightBrace if in_body => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
