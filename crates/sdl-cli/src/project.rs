//! Locating, reading and writing the project manifest.

use anyhow::{bail, Context, Result};
use sdl_core::{Diagnostic, Document, FormatConfig, Formatter, ParseError, Parser};
use sdl_manifest::{Manifest, ManifestError, ManifestLocation};
use std::path::Path;

/// A parsed `config.sdl` and where it came from
pub struct Project {
    pub location: ManifestLocation,
    pub source: String,
    pub document: Document,
}

impl Project {
    /// Open the manifest given by `--manifest`, or the nearest one above the
    /// current directory. Syntax errors are printed and turn into an error.
    pub fn open(manifest: Option<&Path>) -> Result<Self> {
        let location = match manifest {
            Some(path) => ManifestLocation::at(path)?,
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                ManifestLocation::find(cwd)?
            }
        };

        let source = std::fs::read_to_string(&location.manifest_path).with_context(|| {
            format!("Failed to read '{}'", location.manifest_path.display())
        })?;
        let label = location.manifest_path.display().to_string();
        let document = parse_or_report(&source, &label)?;

        Ok(Self {
            location,
            source,
            document,
        })
    }

    pub fn label(&self) -> String {
        self.location.manifest_path.display().to_string()
    }

    /// The validated manifest. Schema errors are printed and turn into an error.
    pub fn manifest(&self) -> Result<Manifest> {
        match Manifest::from_document(&self.document) {
            Ok(manifest) => Ok(manifest),
            Err(ManifestError::Invalid(violations)) => {
                let label = self.label();
                for violation in &violations {
                    eprint!("{}", Diagnostic::from(violation).render(&self.source, &label));
                }
                bail!("`{label}` has {} error(s)", violations.len())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Format the document and write it back to the manifest file
    pub fn save(&self, config: FormatConfig) -> Result<()> {
        let formatted = Formatter::with_config(config).format(&self.document);
        std::fs::write(&self.location.manifest_path, formatted)
            .with_context(|| format!("Failed to write '{}'", self.label()))
    }
}

/// Parse SDL source, printing rendered diagnostics for any errors
pub fn parse_or_report(source: &str, label: &str) -> Result<Document> {
    Parser::parse_document(source).map_err(|errors| {
        eprint!("{}", render_parse_errors(&errors, source, label));
        anyhow::anyhow!("could not parse `{label}` ({} error(s))", errors.len())
    })
}

pub fn render_parse_errors(errors: &[ParseError], source: &str, label: &str) -> String {
    errors
        .iter()
        .map(|e| Diagnostic::from(e).render(source, label))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_explicit_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.sdl");
        std::fs::write(&path, "name \"flip\"\nversion \"1.0.0\"\n").unwrap();

        let project = Project::open(Some(&path)).unwrap();
        assert_eq!(project.location.root, temp.path());
        assert_eq!(project.manifest().unwrap().name, "flip");
    }

    #[test]
    fn test_syntax_errors_fail_to_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.sdl");
        std::fs::write(&path, "name\n").unwrap();

        let err = Project::open(Some(&path)).err().unwrap();
        assert!(err.to_string().ends_with("(1 error(s))"));
    }

    #[test]
    fn test_render_separates_errors() {
        let source = "a\nb\n";
        let errors = Parser::parse_document(source).unwrap_err();
        let rendered = render_parse_errors(&errors, source, "x.sdl");
        assert_eq!(rendered.matches("error: expected literal value or attribute").count(), 2);
        assert!(rendered.contains("\n\nerror:"));
    }
}
