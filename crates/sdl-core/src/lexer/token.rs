//! Token kinds for the SDL lexer

use logos::Logos;

/// The kind of token produced by the lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"\\[ \t]*\r?\n")]
pub enum TokenKind {
    // ========== Literals ==========
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"-?[0-9]+")]
    Integer,

    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+")]
    Float,

    /// Double-quoted string, escapes still encoded in the lexeme
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    /// Backtick string; may span lines, no escapes
    #[regex(r"`[^`]*`")]
    RawString,

    /// A string that runs into a newline or the end of input
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    #[regex(r"`[^`]*")]
    UnterminatedString,

    // ========== Names ==========
    /// Tag or attribute name, optionally namespaced (`lint:fix`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_.$\-]*(:[A-Za-z_][A-Za-z0-9_.$\-]*)?")]
    Identifier,

    // ========== Punctuation ==========
    #[token("=")]
    Equal,
    #[token(";")]
    Semicolon,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,

    // ========== Trivia ==========
    #[regex(r"//[^\n]*")]
    #[regex(r"#[^\n]*")]
    LineComment,

    /// `/* ... */`, not nested. An unclosed comment is a lexer error.
    #[token("/*", block_comment)]
    BlockComment,

    #[token("\n")]
    Newline,

    // ========== Special ==========
    /// End of input (added by the lexer)
    Eof,

    /// Unrecognised input
    Error,
}

/// Consume a block comment after its opening `/*`. Returns false when the
/// input ends before `*/`, after consuming the rest of it.
fn block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(rest.len());
            false
        }
    }
}

impl TokenKind {
    /// Returns true if this token can be a tag value or attribute value
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::True
                | Self::False
                | Self::Null
                | Self::Integer
                | Self::Float
                | Self::String
                | Self::RawString
        )
    }

    /// Comments are trivia; newlines are significant and are not
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns true if this token ends a tag declared without a body
    #[must_use]
    pub const fn is_separator(&self) -> bool {
        matches!(self, Self::Semicolon | Self::Newline)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String | Self::RawString => "string",
            Self::UnterminatedString => "unterminated string",
            Self::Identifier => "identifier",
            Self::Equal => "'='",
            Self::Semicolon => "';'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LineComment | Self::BlockComment => "comment",
            Self::Newline => "newline",
            Self::Eof => "end of file",
            Self::Error => "error",
        };
        f.write_str(text)
    }
}
