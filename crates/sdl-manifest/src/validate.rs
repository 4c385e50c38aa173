//! Schema validation for manifest documents.
//!
//! A single pass over the top-level tags both builds the [`Manifest`] and
//! records every [`Violation`], so one run reports all problems in the file.

use crate::manifest::{Author, Dependency, DependencyKind, Manifest, Repository, Script};
use crate::name::validate_package_name;
use nodejs_semver::Range;
use sdl_core::ast::Spanned;
use sdl_core::{Diagnostic, Severity, Span, Tag, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// What rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    MissingField,
    DuplicateField,
    WrongShape,
    InvalidName,
    InvalidVersion,
    DuplicateScript,
    EmptyScript,
    DuplicateDependency,
    InvalidRange,
    UnknownField,
    ConflictingDependency,
    IgnoredAttribute,
}

impl ViolationKind {
    /// Default severity for this kind of violation.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::UnknownField | Self::ConflictingDependency | Self::IgnoredAttribute => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Short kebab-case code, e.g. `invalid-range`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingField => "missing-field",
            Self::DuplicateField => "duplicate-field",
            Self::WrongShape => "wrong-shape",
            Self::InvalidName => "invalid-name",
            Self::InvalidVersion => "invalid-version",
            Self::DuplicateScript => "duplicate-script",
            Self::EmptyScript => "empty-script",
            Self::DuplicateDependency => "duplicate-dependency",
            Self::InvalidRange => "invalid-range",
            Self::UnknownField => "unknown-field",
            Self::ConflictingDependency => "conflicting-dependency",
            Self::IgnoredAttribute => "ignored-attribute",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A schema problem found in a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub severity: Severity,
    pub kind: ViolationKind,
    pub message: String,
    /// `None` for problems with no single location, like a missing field.
    pub span: Option<Span>,
    pub hint: Option<String>,
}

impl Violation {
    #[must_use]
    pub fn new(kind: ViolationKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
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
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.severity, self.message, self.kind)
    }
}

impl From<&Violation> for Diagnostic {
    fn from(violation: &Violation) -> Self {
        Self {
            severity: violation.severity,
            message: format!("{} [{}]", violation.message, violation.kind),
            span: violation.span,
            hint: violation.hint.clone(),
        }
    }
}

/// Parse an npm version range such as `^1.2.0` or `>=16 <18`.
///
/// # Errors
///
/// Returns the parser's message when the range is malformed.
pub fn parse_range(range: &str) -> Result<Range, String> {
    if range.trim().is_empty() {
        return Err(String::from("range cannot be empty"));
    }
    range.parse::<Range>().map_err(|e| e.to_string())
}

/// Fields that may appear at most once and hold a single string.
const SCALAR_FIELDS: &[&str] = &["name", "version", "description", "license", "homepage"];

/// Builds a manifest from a document while collecting violations.
pub(crate) struct Reader {
    violations: Vec<Violation>,
    /// First occurrence of each singular field or table
    seen: HashSet<String>,
    name: Option<String>,
    version: Option<semver::Version>,
    description: Option<String>,
    license: Option<String>,
    homepage: Option<String>,
    author: Option<Author>,
    keywords: Vec<String>,
    repository: Option<Repository>,
    scripts: Vec<Script>,
    dependencies: Vec<Dependency>,
}

impl Reader {
    /// Read a document. The manifest is `None` when a required field could not
    /// be read; the violations then say why.
    pub(crate) fn read(document: &sdl_core::Document) -> (Option<Manifest>, Vec<Violation>) {
        let mut reader = Self {
            violations: Vec::new(),
            seen: HashSet::new(),
            name: None,
            version: None,
            description: None,
            license: None,
            homepage: None,
            author: None,
            keywords: Vec::new(),
            repository: None,
            scripts: Vec::new(),
            dependencies: Vec::new(),
        };

        for tag in &document.tags {
            reader.top_level(tag);
        }
        reader.cross_table_checks();
        reader.finish()
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn finish(mut self) -> (Option<Manifest>, Vec<Violation>) {
        if !self.seen.contains("name") {
            self.push(
                Violation::new(ViolationKind::MissingField, "missing required field `name`", None)
                    .with_hint("add a line like `name \"my-package\"`"),
            );
        }
        if !self.seen.contains("version") {
            self.push(
                Violation::new(ViolationKind::MissingField, "missing required field `version`", None)
                    .with_hint("add a line like `version \"0.1.0\"`"),
            );
        }

        let errors = self.violations.iter().filter(|v| v.is_error()).count();
        tracing::debug!(
            violations = self.violations.len(),
            errors,
            "validated manifest"
        );

        let manifest = match (self.name, self.version) {
            (Some(name), Some(version)) => Some(Manifest {
                name,
                version,
                description: self.description,
                license: self.license,
                homepage: self.homepage,
                author: self.author,
                keywords: self.keywords,
                repository: self.repository,
                scripts: self.scripts,
                dependencies: self.dependencies,
            }),
            _ => None,
        };
        (manifest, self.violations)
    }

    /// Record a singular field. Returns false (and reports) if it was already seen.
    fn first_occurrence(&mut self, tag: &Tag) -> bool {
        let name = tag.name.name.as_str();
        if self.seen.contains(name) {
            self.push(
                Violation::new(
                    ViolationKind::DuplicateField,
                    format!("`{name}` is defined more than once"),
                    Some(tag.name.span),
                )
                .with_hint("only the first definition is used"),
            );
            return false;
        }
        self.seen.insert(name.to_string());
        true
    }

    fn top_level(&mut self, tag: &Tag) {
        let field = tag.name.name.as_str();

        if SCALAR_FIELDS.contains(&field) {
            if !self.first_occurrence(tag) {
                return;
            }
            self.no_children(tag);
            self.ignored_attributes(tag, &[]);
            let Some(value) = self.single_string(tag) else {
                return;
            };
            self.scalar(tag, value);
            return;
        }

        match field {
            "author" => {
                if self.first_occurrence(tag) {
                    self.author(tag);
                }
            }
            "keywords" => {
                if self.first_occurrence(tag) {
                    self.keywords(tag);
                }
            }
            "repository" => {
                if self.first_occurrence(tag) {
                    self.repository(tag);
                }
            }
            "scripts" => {
                if self.first_occurrence(tag) {
                    self.scripts(tag);
                }
            }
            _ => match DependencyKind::from_tag_name(field) {
                Some(kind) => {
                    if self.first_occurrence(tag) {
                        self.dependency_table(tag, kind);
                    }
                }
                None => self.push(
                    Violation::new(
                        ViolationKind::UnknownField,
                        format!("unknown field `{field}`"),
                        Some(tag.name.span),
                    )
                    .with_hint("it will be ignored"),
                ),
            },
        }
    }

    fn scalar(&mut self, tag: &Tag, value: String) {
        let span = tag.values[0].span;
        match tag.name.name.as_str() {
            "name" => {
                if let Err(reason) = validate_package_name(&value) {
                    self.push(Violation::new(
                        ViolationKind::InvalidName,
                        format!("invalid package name '{value}': {reason}"),
                        Some(span),
                    ));
                }
                self.name = Some(value);
            }
            "version" => match semver::Version::parse(&value) {
                Ok(version) => self.version = Some(version),
                Err(e) => self.push(
                    Violation::new(
                        ViolationKind::InvalidVersion,
                        format!("invalid version '{value}': {e}"),
                        Some(span),
                    )
                    .with_hint("versions look like `1.2.3` or `1.0.0-beta.1`"),
                ),
            },
            "description" => self.description = Some(value),
            "license" => self.license = Some(value),
            _ => self.homepage = Some(value),
        }
    }

    fn author(&mut self, tag: &Tag) {
        self.no_children(tag);
        self.ignored_attributes(tag, &["email", "url"]);
        let Some(name) = self.single_string(tag) else {
            return;
        };
        let email = self.string_attribute(tag, "email");
        let url = self.string_attribute(tag, "url");
        self.author = Some(Author { name, email, url });
    }

    fn keywords(&mut self, tag: &Tag) {
        self.no_children(tag);
        self.ignored_attributes(tag, &[]);
        if tag.values.is_empty() {
            self.wrong_shape(tag.name.span, "`keywords` needs at least one string");
            return;
        }
        for literal in &tag.values {
            match &literal.value {
                Value::String(keyword) => self.keywords.push(keyword.clone()),
                other => self.wrong_shape(
                    literal.span,
                    format!("keywords must be strings, found {}", other.type_name()),
                ),
            }
        }
    }

    fn repository(&mut self, tag: &Tag) {
        self.no_children(tag);
        self.ignored_attributes(tag, &["url", "type"]);
        let kind = self.string_attribute(tag, "type");
        let url = match (tag.values.as_slice(), tag.attribute("url")) {
            ([], Some(_)) => self.string_attribute(tag, "url"),
            ([_], None) => self.single_string(tag),
            ([], None) => {
                self.wrong_shape(tag.name.span, "`repository` needs a URL");
                None
            }
            _ => {
                self.wrong_shape(
                    tag.span,
                    "`repository` takes either one URL value or a `url=` attribute",
                );
                None
            }
        };
        if let Some(url) = url {
            self.repository = Some(Repository { url, kind });
        }
    }

    fn scripts(&mut self, tag: &Tag) {
        if !self.is_table(tag) {
            return;
        }
        let mut names: HashMap<&str, Span> = HashMap::new();

        for child in &tag.children {
            let name = child.name.name.as_str();
            if names.insert(name, child.name.span).is_some() {
                self.push(
                    Violation::new(
                        ViolationKind::DuplicateScript,
                        format!("script `{name}` is defined more than once"),
                        Some(child.name.span),
                    )
                    .with_hint("script names must be unique"),
                );
                continue;
            }
            self.no_children(child);
            let Some(command) = self.single_string(child) else {
                continue;
            };
            if command.trim().is_empty() {
                self.push(Violation::new(
                    ViolationKind::EmptyScript,
                    format!("script `{name}` has an empty command"),
                    Some(child.values[0].span),
                ));
                continue;
            }
            let attributes: BTreeMap<String, Value> = child
                .attributes
                .iter()
                .map(|a| (a.name.name.clone(), a.value.value.clone()))
                .collect();
            self.scripts.push(Script {
                name: name.to_string(),
                command,
                attributes,
                span: child.span,
            });
        }
    }

    fn dependency_table(&mut self, tag: &Tag, kind: DependencyKind) {
        if !self.is_table(tag) {
            return;
        }

        for child in &tag.children {
            self.no_children(child);
            self.ignored_attributes(child, &[]);

            // `dependency "<name>" "<range>"` covers names that are not identifiers
            let (name, range_literal) = if child.name.name == "dependency" {
                match child.values.as_slice() {
                    [name, range] => match &name.value {
                        Value::String(s) => (s.clone(), range),
                        other => {
                            self.wrong_shape(
                                name.span,
                                format!("dependency name must be a string, found {}", other.type_name()),
                            );
                            continue;
                        }
                    },
                    _ => {
                        self.wrong_shape(
                            child.span,
                            "expected `dependency \"<name>\" \"<range>\"`",
                        );
                        continue;
                    }
                }
            } else {
                match child.values.as_slice() {
                    [range] => (child.name.name.clone(), range),
                    _ => {
                        self.wrong_shape(
                            child.span,
                            format!("expected `{} \"<range>\"`", child.name.name),
                        );
                        continue;
                    }
                }
            };

            if let Err(reason) = validate_package_name(&name) {
                self.push(Violation::new(
                    ViolationKind::InvalidName,
                    format!("invalid dependency name '{name}': {reason}"),
                    Some(child.name.span),
                ));
                continue;
            }

            let Value::String(range) = &range_literal.value else {
                self.wrong_shape(
                    range_literal.span,
                    format!(
                        "version range must be a string, found {}",
                        range_literal.value.type_name()
                    ),
                );
                continue;
            };
            let requirement = match parse_range(range) {
                Ok(requirement) => requirement,
                Err(_) => {
                    self.push(
                        Violation::new(
                            ViolationKind::InvalidRange,
                            format!("invalid version range '{range}' for `{name}`"),
                            Some(range_literal.span),
                        )
                        .with_hint("ranges look like `^1.2.0`, `~0.11`, `>=16.8.0` or `1.x || 2.x`"),
                    );
                    continue;
                }
            };

            if self.dependencies(kind).any(|d| d.name == name) {
                self.push(Violation::new(
                    ViolationKind::DuplicateDependency,
                    format!("`{name}` is listed more than once in `{kind}`"),
                    Some(child.name.span),
                ));
                continue;
            }

            self.dependencies.push(Dependency {
                name,
                kind,
                range: range.clone(),
                requirement,
                span: child.span,
            });
        }
    }

    fn dependencies(&self, kind: DependencyKind) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.kind == kind)
    }

    /// A package both shipped and dev-only is almost always a mistake
    fn cross_table_checks(&mut self) {
        let conflicts: Vec<Violation> = self
            .dependencies(DependencyKind::Dev)
            .filter_map(|dev| {
                let normal = self
                    .dependencies(DependencyKind::Normal)
                    .find(|d| d.name == dev.name)?;
                Some(
                    Violation::new(
                        ViolationKind::ConflictingDependency,
                        format!(
                            "`{}` is listed in both `dependencies` and `dev-dependencies`",
                            dev.name
                        ),
                        Some(dev.span),
                    )
                    .with_hint(format!("the `dependencies` entry ('{}') takes precedence", normal.range)),
                )
            })
            .collect();
        self.violations.extend(conflicts);
    }

    // ==================== Shape helpers ====================

    fn wrong_shape(&mut self, span: Span, message: impl Into<String>) {
        self.push(Violation::new(ViolationKind::WrongShape, message, Some(span)));
    }

    /// The tag's only value, which must be a string.
    fn single_string(&mut self, tag: &Tag) -> Option<String> {
        let field = tag.name.name.as_str();
        match tag.values.as_slice() {
            [literal] => match &literal.value {
                Value::String(s) => Some(s.clone()),
                other => {
                    self.wrong_shape(
                        literal.span,
                        format!("`{field}` must be a string, found {}", other.type_name()),
                    );
                    None
                }
            },
            [] => {
                self.wrong_shape(tag.name.span, format!("`{field}` needs a string value"));
                None
            }
            [_, extra, ..] => {
                self.wrong_shape(
                    extra.span,
                    format!("`{field}` takes a single value, found {}", tag.values.len()),
                );
                None
            }
        }
    }

    fn string_attribute(&mut self, tag: &Tag, name: &str) -> Option<String> {
        let attribute = tag.attributes.iter().find(|a| a.name.name == name)?;
        match &attribute.value.value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.wrong_shape(
                    attribute.value.span,
                    format!("`{name}=` must be a string, found {}", other.type_name()),
                );
                None
            }
        }
    }

    fn no_children(&mut self, tag: &Tag) {
        if tag.has_body {
            self.wrong_shape(
                tag.span,
                format!("`{}` does not take a `{{ }}` block", tag.name),
            );
        }
    }

    fn ignored_attributes(&mut self, tag: &Tag, known: &[&str]) {
        for attribute in &tag.attributes {
            if !known.contains(&attribute.name.name.as_str()) {
                self.push(Violation::new(
                    ViolationKind::IgnoredAttribute,
                    format!("attribute `{}` on `{}` is ignored", attribute.name, tag.name),
                    Some(attribute.span()),
                ));
            }
        }
    }

    /// A block tag such as `scripts { ... }` with no values or attributes.
    fn is_table(&mut self, tag: &Tag) -> bool {
        if !tag.values.is_empty() || !tag.attributes.is_empty() || !tag.has_body {
            self.push(
                Violation::new(
                    ViolationKind::WrongShape,
                    format!("`{}` must be a block of entries", tag.name),
                    Some(tag.span),
                )
                .with_hint(format!("write `{} {{ ... }}`", tag.name)),
            );
            return false;
        }
        true
    }
}
