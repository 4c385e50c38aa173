//! Implementation of the `sdl add` command.

use crate::project::Project;
use anyhow::{bail, Result};
use sdl_core::FormatConfig;
use sdl_manifest::{parse_range, set_dependency, validate_package_name, DependencyKind};

/// Range written when none is given. There is no registry to ask, so the
/// entry accepts any version until pinned.
const DEFAULT_RANGE: &str = "*";

/// Options for adding a dependency.
#[derive(Debug)]
pub struct AddOptions {
    /// Package spec: `name`, `name@range` or `@scope/name@range`.
    pub package: String,
    /// Which table to add to.
    pub kind: DependencyKind,
}

/// Split a package spec like "name" or "name@range". A leading `@` belongs to
/// the scope, not the range.
pub fn parse_package_spec(spec: &str) -> (String, Option<String>) {
    if let Some(at_pos) = spec.rfind('@') {
        if at_pos > 0 {
            let name = &spec[..at_pos];
            let range = &spec[at_pos + 1..];
            if !range.is_empty() {
                return (name.to_string(), Some(range.to_string()));
            }
            return (name.to_string(), None);
        }
    }
    (spec.to_string(), None)
}

/// Add a dependency to the project's manifest and rewrite it.
pub fn add_dependency(project: &mut Project, options: &AddOptions, format: FormatConfig) -> Result<()> {
    // Never rewrite a manifest that already has schema errors
    project.manifest()?;

    let (name, range) = parse_package_spec(&options.package);
    let range = range.unwrap_or_else(|| DEFAULT_RANGE.to_string());

    if let Err(reason) = validate_package_name(&name) {
        bail!("Invalid package name `{name}`: {reason}");
    }
    if let Err(reason) = parse_range(&range) {
        bail!("Invalid version range `{range}` for `{name}`: {reason}");
    }

    let table = options.kind.tag_name();
    let previous = set_dependency(&mut project.document, options.kind, &name, &range);
    project.save(format)?;

    match previous {
        Some(old) if old == range => println!("`{name}` is already `{range}` in {table}"),
        Some(old) => println!("Updated `{name}` from `{old}` to `{range}` in {table}"),
        None => println!("Added `{name}@{range}` to {table}"),
    }
    Ok(())
}
