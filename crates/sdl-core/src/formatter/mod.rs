//! Source formatter for SDL documents
//!
//! Produces a canonical layout:
//! - one tag per line, values before attributes
//! - 4-space indentation inside bodies
//! - optional `;` terminators
//! - comments and single blank lines between tags preserved

use crate::ast::{Comment, Document, Tag, Value};
use crate::lexer::escape_string;

/// Formatter configuration
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Number of spaces per indentation level
    pub indent_size: usize,
    /// End body-less tags with `;`
    pub semicolons: bool,
    /// Whether to end the output with a newline
    pub trailing_newline: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            semicolons: true,
            trailing_newline: true,
        }
    }
}

/// The document formatter
pub struct Formatter {
    output: String,
    indent_level: usize,
    config: FormatConfig,
}

impl Formatter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FormatConfig::default())
    }

    #[must_use]
    pub fn with_config(config: FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            config,
        }
    }

    /// Format a document with the default configuration
    #[must_use]
    pub fn format_document(document: &Document) -> String {
        Self::new().format(document)
    }

    /// Format a document with this formatter's configuration
    #[must_use]
    pub fn format(mut self, document: &Document) -> String {
        for tag in &document.tags {
            self.write_tag(tag);
        }
        for comment in &document.dangling_comments {
            self.write_comment_line(comment);
        }

        if self.config.trailing_newline {
            if !self.output.is_empty() && !self.output.ends_with('\n') {
                self.output.push('\n');
            }
        } else {
            let trimmed = self.output.trim_end_matches('\n').len();
            self.output.truncate(trimmed);
        }
        self.output
    }

    fn write_indent(&mut self) {
        let width = self.indent_level * self.config.indent_size;
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    fn write_comment_line(&mut self, comment: &Comment) {
        self.write_indent();
        self.output.push_str(&comment.text);
        self.output.push('\n');
    }

    fn write_tag(&mut self, tag: &Tag) {
        if tag.blank_line_before && !self.output.is_empty() {
            self.output.push('\n');
        }
        for comment in &tag.comments.leading {
            self.write_comment_line(comment);
        }

        self.write_indent();
        self.output.push_str(&tag.name.name);
        for literal in &tag.values {
            self.output.push(' ');
            self.output.push_str(&format_value(&literal.value));
        }
        for attribute in &tag.attributes {
            self.output.push(' ');
            self.output.push_str(&attribute.name.name);
            self.output.push('=');
            self.output.push_str(&format_value(&attribute.value.value));
        }

        // A tag with nothing after its name only parses back with a body
        let needs_body = tag.values.is_empty() && tag.attributes.is_empty();
        if tag.has_body || !tag.children.is_empty() || needs_body {
            self.write_body(tag);
        } else if self.config.semicolons {
            self.output.push(';');
        }

        for comment in &tag.comments.trailing {
            self.output.push(' ');
            self.output.push_str(&comment.text);
        }
        self.output.push('\n');
    }

    fn write_body(&mut self, tag: &Tag) {
        if tag.children.is_empty() && tag.comments.inner.is_empty() {
            self.output.push_str(" {}");
            return;
        }

        self.output.push_str(" {\n");
        self.indent_level += 1;
        for child in &tag.children {
            self.write_tag(child);
        }
        for comment in &tag.comments.inner {
            self.write_comment_line(comment);
        }
        self.indent_level -= 1;
        self.write_indent();
        self.output.push('}');
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Source form of a value
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains('\n') && !s.contains('`') => format!("`{s}`"),
        Value::String(s) => format!("\"{}\"", escape_string(s)),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}
