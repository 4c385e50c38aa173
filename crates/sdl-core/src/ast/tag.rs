//! Tags, attributes and documents

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::{Comment, Comments, Ident, Literal, Span, Spanned, Value};

/// A `name=value` pair on a tag
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: Ident,
    pub value: Literal,
    pub span: Span,
}

impl Attribute {
    #[must_use]
    pub fn new(name: Ident, value: Literal) -> Self {
        let span = name.span.merge(value.span);
        Self { name, value, span }
    }
}

impl Spanned for Attribute {
    fn span(&self) -> Span {
        self.span
    }
}

/// A tag: `name value* attr=value* { children }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: Ident,
    pub values: Vec<Literal>,
    #[serde(serialize_with = "serialize_attributes")]
    pub attributes: Vec<Attribute>,
    pub children: Vec<Tag>,
    #[serde(skip)]
    pub comments: Comments,
    /// True when the tag was written with a `{ }` body, even an empty one
    #[serde(skip)]
    pub has_body: bool,
    /// The tag was preceded by an empty line
    #[serde(skip)]
    pub blank_line_before: bool,
    #[serde(skip)]
    pub span: Span,
}

impl Tag {
    #[must_use]
    pub fn new(name: Ident) -> Self {
        let span = name.span;
        Self {
            name,
            values: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            comments: Comments::default(),
            has_body: false,
            blank_line_before: false,
            span,
        }
    }

    /// Shorthand for a tag with a single value and no source location
    #[must_use]
    pub fn with_value(name: &str, value: impl Into<Value>) -> Self {
        let mut tag = Self::new(Ident::new(name, Span::default()));
        tag.values.push(Literal::new(value, Span::default()));
        tag
    }

    /// The first value, if any
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first().map(|literal| &literal.value)
    }

    /// The value of the attribute called `name`
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|attr| attr.name.name == name)
            .map(|attr| &attr.value.value)
    }

    /// Set an attribute. An existing attribute of the same name keeps its
    /// position and takes the new value.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self
            .attributes
            .iter_mut()
            .find(|existing| existing.name.name == attribute.name.name)
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// First child called `name`
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Tag> {
        self.children.iter().find(|tag| tag.name.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.children.iter_mut().find(|tag| tag.name.name == name)
    }

    /// All children called `name`, in source order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.children.iter().filter(move |tag| tag.name.name == name)
    }

    /// Mark the tag as having a body and append a child
    pub fn push_child(&mut self, child: Tag) {
        self.has_body = true;
        self.children.push(child);
    }

    fn write_tree(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{pad}Tag {} {{", self.name)?;

        let values: Vec<String> = self.values.iter().map(|v| v.value.to_string()).collect();
        if values.is_empty() {
            writeln!(f, "{pad}  values:")?;
        } else {
            writeln!(f, "{pad}  values: {}", values.join(", "))?;
        }

        if !self.attributes.is_empty() {
            let attrs: Vec<String> = self
                .attributes
                .iter()
                .map(|a| format!("{}={}", a.name, a.value.value))
                .collect();
            writeln!(f, "{pad}  attributes: {}", attrs.join(", "))?;
        }

        if !self.children.is_empty() {
            writeln!(f, "{pad}  children:")?;
            for child in &self.children {
                child.write_tree(f, depth + 2)?;
            }
        }

        writeln!(f, "{pad}}}")
    }
}

impl Spanned for Tag {
    fn span(&self) -> Span {
        self.span
    }
}

/// Indented debug tree, one `Tag name { ... }` block per tag
impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_tree(f, 0)
    }
}

fn serialize_attributes<S: Serializer>(
    attributes: &[Attribute],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(attributes.len()))?;
    for attr in attributes {
        map.serialize_entry(&attr.name.name, &attr.value)?;
    }
    map.end()
}

/// A parsed SDL document
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub tags: Vec<Tag>,
    /// Comments not attached to any tag (e.g. at the end of the file)
    #[serde(skip)]
    pub dangling_comments: Vec<Comment>,
    #[serde(skip)]
    pub span: Span,
}

impl Document {
    #[must_use]
    pub fn new(tags: Vec<Tag>, span: Span) -> Self {
        Self {
            tags,
            dangling_comments: Vec::new(),
            span,
        }
    }

    /// First top-level tag called `name`
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name.name == name)
    }

    pub fn tag_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|tag| tag.name.name == name)
    }

    /// All top-level tags called `name`, in source order
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |tag| tag.name.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for tag in &self.tags {
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}
