//! Comments attached to tags so the formatter can keep them

use super::Span;

/// A comment in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Full text including the `//`, `#` or `/* */` delimiters
    pub text: String,
    pub span: Span,
    pub kind: CommentKind,
}

impl Comment {
    #[must_use]
    pub fn line(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
            kind: CommentKind::Line,
        }
    }

    #[must_use]
    pub fn block(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
            kind: CommentKind::Block,
        }
    }

    /// Comment content without its delimiters
    #[must_use]
    pub fn content(&self) -> &str {
        match self.kind {
            CommentKind::Line => self
                .text
                .strip_prefix("//")
                .or_else(|| self.text.strip_prefix('#'))
                .unwrap_or(&self.text)
                .trim(),
            CommentKind::Block => {
                let s = self.text.strip_prefix("/*").unwrap_or(&self.text);
                s.strip_suffix("*/").unwrap_or(s).trim()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...` or `# ...`
    Line,
    /// `/* ... */`
    Block,
}

/// Comments around a tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comments {
    /// Comments on the lines directly before the tag
    pub leading: Vec<Comment>,
    /// Comments after the tag on its last line
    pub trailing: Vec<Comment>,
    /// Comments before the closing `}` of the body
    pub inner: Vec<Comment>,
}

impl Comments {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty() && self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_strips_delimiters() {
        assert_eq!(Comment::line("// scripts", Span::default()).content(), "scripts");
        assert_eq!(Comment::line("#deps", Span::default()).content(), "deps");
        assert_eq!(Comment::block("/* a */", Span::default()).content(), "a");
    }
}
