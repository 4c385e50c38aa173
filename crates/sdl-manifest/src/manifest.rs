//! The `config.sdl` package manifest.

use crate::validate::{Reader, Violation};
use nodejs_semver::{Range, Version as NpmVersion};
use sdl_core::{Document, ParseError, Parser, Span, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest has {} syntax error(s)", .0.len())]
    Syntax(Vec<ParseError>),

    #[error("manifest is invalid: {}", summarize(.0))]
    Invalid(Vec<Violation>),

    #[error("no config.sdl found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),
}

fn summarize(violations: &[Violation]) -> String {
    match violations {
        [] => String::from("no details"),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

/// The package manifest.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Package name (required, npm naming rules).
    pub name: String,

    /// Package version (required, semver).
    pub version: semver::Version,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// SPDX license identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,

    pub(crate) scripts: Vec<Script>,

    pub(crate) dependencies: Vec<Dependency>,
}

/// Package author: `author "Name" email="..." url="..."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(email) = &self.email {
            write!(f, " <{email}>")?;
        }
        if let Some(url) = &self.url {
            write!(f, " ({url})")?;
        }
        Ok(())
    }
}

/// Source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A named shell command from the `scripts` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub name: String,
    pub command: String,
    /// Free-form metadata attributes, such as `prettier=true`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(skip)]
    pub span: Span,
}

impl Script {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Which dependency table an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Normal,
    Peer,
    Dev,
}

impl DependencyKind {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Peer, Self::Dev];

    /// The top-level tag holding this table.
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Normal => "dependencies",
            Self::Peer => "peer-dependencies",
            Self::Dev => "dev-dependencies",
        }
    }

    #[must_use]
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag_name() == name)
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// One entry of a dependency table.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
    /// The range exactly as written.
    pub range: String,
    #[serde(skip)]
    pub(crate) requirement: Range,
    #[serde(skip)]
    pub span: Span,
}

impl Dependency {
    /// The parsed npm version range.
    #[must_use]
    pub fn requirement(&self) -> &Range {
        &self.requirement
    }

    /// Whether an installed version falls inside the range. Unparseable
    /// versions never satisfy it.
    #[must_use]
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        version
            .parse::<NpmVersion>()
            .is_ok_and(|v| self.requirement.satisfies(&v))
    }
}

impl Manifest {
    /// Load a manifest from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or breaks
    /// the manifest schema.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from SDL source.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Syntax`] with every parse error, or
    /// [`ManifestError::Invalid`] with every schema error. Warnings are not
    /// errors; use [`Manifest::check`] to see them.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let document = Parser::parse_document(content).map_err(ManifestError::Syntax)?;
        Self::from_document(&document)
    }

    /// Build a manifest from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] if any error-level violation is found.
    pub fn from_document(document: &Document) -> Result<Self, ManifestError> {
        let (manifest, violations) = Reader::read(document);
        let errors: Vec<Violation> = violations.into_iter().filter(Violation::is_error).collect();
        match manifest {
            Some(manifest) if errors.is_empty() => Ok(manifest),
            _ => Err(ManifestError::Invalid(errors)),
        }
    }

    /// Every violation in the document, errors and warnings, in source order.
    #[must_use]
    pub fn check(document: &Document) -> Vec<Violation> {
        Reader::read(document).1
    }

    /// Look up a script by name.
    #[must_use]
    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.name == name)
    }

    /// All scripts in source order.
    #[must_use]
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// The scripts `run <name>` executes, in order: `pre<name>`, `<name>`,
    /// `post<name>`. `None` if `<name>` itself is not defined.
    #[must_use]
    pub fn lifecycle(&self, name: &str) -> Option<Vec<&Script>> {
        let main = self.script(name)?;
        let pre = self.script(&format!("pre{name}"));
        let post = self.script(&format!("post{name}"));
        Some(pre.into_iter().chain([main]).chain(post).collect())
    }

    /// Entries of one dependency table, in source order.
    pub fn dependencies(&self, kind: DependencyKind) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.kind == kind)
    }

    /// Look up a dependency by name in one table.
    #[must_use]
    pub fn dependency(&self, kind: DependencyKind, name: &str) -> Option<&Dependency> {
        self.dependencies(kind).find(|d| d.name == name)
    }

    /// Entries of every table.
    #[must_use]
    pub fn all_dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViolationKind;

    const MANIFEST: &str = r#"
author "Evelyn Ward" email="evelyn@example.com"
name "react-flip-toolkit-lite"
version "0.3.1"
license "MIT"

scripts {
    prebuild "rm -rf dist"
    build "microbundle"
    format "prettier --write src" prettier=true
    lint:fix "eslint src --fix"
}

repository url="git+https://github.com/example/flip.git" type="git"

peer-dependencies {
    react ">=16.8.0"
}

dev-dependencies {
    microbundle "^0.11.0"
    dependency "@babel/core" "~7.8"
}
"#;

    fn invalid(source: &str) -> Vec<ViolationKind> {
        match Manifest::parse(source) {
            Err(ManifestError::Invalid(violations)) => violations.into_iter().map(|v| v.kind).collect(),
            other => panic!("expected invalid manifest, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::parse(MANIFEST).unwrap();

        assert_eq!(manifest.name, "react-flip-toolkit-lite");
        assert_eq!(manifest.version, semver::Version::new(0, 3, 1));
        assert_eq!(manifest.license.as_deref(), Some("MIT"));
        assert_eq!(
            manifest.author.as_ref().map(ToString::to_string).as_deref(),
            Some("Evelyn Ward <evelyn@example.com>")
        );
        assert_eq!(
            manifest.repository,
            Some(Repository {
                url: "git+https://github.com/example/flip.git".into(),
                kind: Some("git".into()),
            })
        );
        assert_eq!(manifest.scripts().len(), 4);
        assert_eq!(
            manifest.script("format").and_then(|s| s.attribute("prettier")),
            Some(&Value::Boolean(true))
        );
        assert_eq!(manifest.script("lint:fix").unwrap().command, "eslint src --fix");
    }

    #[test]
    fn test_dependency_tables() {
        let manifest = Manifest::parse(MANIFEST).unwrap();

        let dev: Vec<&str> = manifest
            .dependencies(DependencyKind::Dev)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(dev, vec!["microbundle", "@babel/core"]);
        assert_eq!(manifest.dependencies(DependencyKind::Normal).count(), 0);
        assert_eq!(manifest.all_dependencies().len(), 3);

        let react = manifest.dependency(DependencyKind::Peer, "react").unwrap();
        assert_eq!(react.range, ">=16.8.0");
        assert!(react.is_satisfied_by("16.12.0"));
        assert!(!react.is_satisfied_by("16.7.9"));
        assert!(!react.is_satisfied_by("not-a-version"));
    }

    #[test]
    fn test_lifecycle_order() {
        let manifest = Manifest::parse(MANIFEST).unwrap();

        let names: Vec<&str> = manifest
            .lifecycle("build")
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["prebuild", "build"]);
        assert_eq!(manifest.lifecycle("format").unwrap().len(), 1);
        assert!(manifest.lifecycle("deploy").is_none());
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            invalid("license \"MIT\"\n"),
            vec![ViolationKind::MissingField, ViolationKind::MissingField]
        );
    }

    #[test]
    fn test_invalid_version_and_name() {
        assert_eq!(
            invalid("name \"Flip\"\nversion \"1.0\"\n"),
            vec![ViolationKind::InvalidName, ViolationKind::InvalidVersion]
        );
    }

    #[test]
    fn test_syntax_errors_are_reported_as_such() {
        let result = Manifest::parse("name \"x\"\nversion\n");
        assert!(matches!(result, Err(ManifestError::Syntax(errors)) if errors.len() == 1));
    }

    #[test]
    fn test_warnings_do_not_fail_parsing() {
        let manifest = Manifest::parse("name \"x\"\nversion \"1.0.0\"\nprivate true\n").unwrap();
        assert_eq!(manifest.name, "x");

        let document = Parser::parse_document("name \"x\"\nversion \"1.0.0\"\nprivate true\n").unwrap();
        let violations = Manifest::check(&document);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::UnknownField);
        assert!(!violations[0].is_error());
    }

    #[test]
    fn test_error_summary() {
        let err = Manifest::parse("version \"1.0.0\"\n").unwrap_err();
        assert_eq!(err.to_string(), "manifest is invalid: missing required field `name`");
    }

    #[test]
    fn test_manifest_serializes() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let json = serde_json::to_value(&manifest).unwrap();

        assert_eq!(json["version"], "0.3.1");
        assert_eq!(json["repository"]["type"], "git");
        assert_eq!(json["scripts"][2]["attributes"]["prettier"], true);
        assert_eq!(json["dependencies"][0]["kind"], "peer");
        assert!(json.get("homepage").is_none());
    }
}
