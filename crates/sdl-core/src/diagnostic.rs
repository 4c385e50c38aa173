//! Human-readable error reports with source snippets
//!
//! Renders a message against the offending line of source:
//!
//! ```text
//! error: expected '=' after attribute name
//!  --> config.sdl:3:28
//!   |
//! 3 | format "prettier" prettier true
//!   |                            ^^^^
//! ```

use crate::lexer::{LineIndex, Span};
use crate::parser::ParseError;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message tied to an optional source location
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub hint: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
            hint: None,
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render against `source`, labelling the location with `file`
    #[must_use]
    pub fn render(&self, source: &str, file: &str) -> String {
        let mut out = format!("{}: {}\n", self.severity, self.message);

        let Some(span) = self.span else {
            if let Some(hint) = &self.hint {
                out.push_str(&format!("  = hint: {hint}\n"));
            }
            return out;
        };

        let index = LineIndex::new(source);
        let location = index.location(span.start);
        let line_text = index.line_text(location.line).unwrap_or("");
        let width = location.line.to_string().len();
        let pad = " ".repeat(width);

        out.push_str(&format!("{pad}--> {file}:{location}\n"));
        out.push_str(&format!("{pad} |\n"));
        out.push_str(&format!("{} | {}\n", location.line, line_text));

        // Keep tabs so the caret lines up under tab-indented source
        let prefix: String = line_text
            .chars()
            .take(location.column as usize - 1)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let underline = caret_width(source, span, location.line, line_text.len(), &index);
        out.push_str(&format!("{pad} | {prefix}{}\n", "^".repeat(underline)));

        if let Some(hint) = &self.hint {
            out.push_str(&format!("{pad} = hint: {hint}\n"));
        }
        out
    }
}

/// Number of characters to underline, clipped to the first line of the span
fn caret_width(source: &str, span: Span, line: u32, line_len: usize, index: &LineIndex<'_>) -> usize {
    let start = span.start as usize;
    let line_end = index.line_start(line).map_or(start, |s| s as usize + line_len);
    let end = (span.end as usize).min(line_end).max(start);
    source
        .get(start..end)
        .map_or(0, |text| text.chars().count())
        .max(1)
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Self {
            severity: Severity::Error,
            message: error.kind.to_string(),
            span: Some(error.span),
            hint: error.hint.clone(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}
