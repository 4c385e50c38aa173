//! Document model for parsed SDL
//!
//! A document is a list of [`Tag`]s. Each tag has a name, zero or more
//! anonymous values, named attributes, and an optional body of child tags.
//! Every node carries a [`Span`] for diagnostics.

mod comment;
mod tag;
mod value;

pub use comment::{Comment, CommentKind, Comments};
pub use tag::{Attribute, Document, Tag};
pub use value::{Literal, Value};

pub use crate::lexer::Span;

use serde::{Serialize, Serializer};

/// A node with a source location
pub trait Spanned {
    fn span(&self) -> Span;
}

/// A tag or attribute name with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Namespace prefix of `ns:name`, if any
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once(':').map(|(ns, _)| ns)
    }

    /// Name without its namespace prefix
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(&self.name, |(_, local)| local)
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}
