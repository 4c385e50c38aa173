//! Project initialization for `sdl init`.

use anyhow::{bail, Context, Result};
use sdl_core::{Comment, Document, FormatConfig, Formatter, Ident, Span, Tag};
use sdl_manifest::{validate_package_name, DependencyKind, MANIFEST_FILE};
use std::fs;
use std::path::Path;

/// Options for project initialization.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Package name (defaults to directory name).
    pub name: Option<String>,

    /// Overwrite an existing manifest.
    pub force: bool,
}

/// Write a starter `config.sdl` into `dir`.
pub fn init_project(dir: &Path, options: InitOptions, format: FormatConfig) -> Result<()> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() && !options.force {
        bail!("Cannot initialize: `{MANIFEST_FILE}` already exists in this directory");
    }

    let name = match options.name {
        Some(n) => n,
        None => infer_package_name(dir)?,
    };
    if let Err(reason) = validate_package_name(&name) {
        bail!("Invalid package name `{name}`: {reason}\n  = hint: pass a name with `sdl init --name <name>`");
    }

    let document = starter_document(&name);
    let content = Formatter::with_config(format).format(&document);
    fs::write(&manifest_path, content).context("Failed to write config.sdl")?;

    tracing::debug!(path = %manifest_path.display(), "wrote starter manifest");
    println!("Created `{name}` package manifest");
    Ok(())
}

/// Infer the package name from the directory name, lowercased.
fn infer_package_name(dir: &Path) -> Result<String> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_ascii_lowercase)
        .context("Cannot infer package name from directory")?;

    Ok(name)
}

/// The starter manifest, built as a document so it is written in canonical form.
fn starter_document(name: &str) -> Document {
    let mut header = Tag::with_value("name", name);
    header
        .comments
        .leading
        .push(Comment::line("// Package manifest", Span::default()));

    let mut scripts = Tag::new(Ident::new("scripts", Span::default()));
    scripts.blank_line_before = true;
    scripts.push_child(Tag::with_value("test", "echo \"no tests yet\" && exit 1"));

    let mut tags = vec![
        header,
        Tag::with_value("version", "0.1.0"),
        Tag::with_value("license", "MIT"),
        scripts,
    ];
    for kind in [DependencyKind::Normal, DependencyKind::Dev] {
        let mut table = Tag::new(Ident::new(kind.tag_name(), Span::default()));
        table.has_body = true;
        table.blank_line_before = true;
        tags.push(table);
    }

    Document::new(tags, Span::default())
}
