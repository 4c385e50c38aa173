//! Implementation of the `sdl remove` command.

use crate::project::Project;
use anyhow::{bail, Result};
use sdl_core::FormatConfig;
use sdl_manifest::{remove_dependency, DependencyKind};

/// Options for removing a dependency.
#[derive(Debug)]
pub struct RemoveOptions {
    /// Package name to remove.
    pub package: String,
    /// Which table to remove from (None = search all tables).
    pub kind: Option<DependencyKind>,
}

/// Remove a dependency from the project's manifest and rewrite it.
pub fn remove_dependency_from(
    project: &mut Project,
    options: &RemoveOptions,
    format: FormatConfig,
) -> Result<()> {
    let manifest = project.manifest()?;
    let name = &options.package;

    let tables: Vec<DependencyKind> = match options.kind {
        Some(kind) => vec![kind],
        None => DependencyKind::ALL.to_vec(),
    };
    let found: Vec<DependencyKind> = tables
        .into_iter()
        .filter(|&kind| manifest.dependency(kind, name).is_some())
        .collect();

    let kind = match (found.as_slice(), options.kind) {
        ([], Some(kind)) => bail!("Dependency `{name}` not found in {kind}"),
        ([], None) => bail!("Dependency `{name}` not found in any table"),
        ([kind], _) => *kind,
        (several, _) => {
            let names: Vec<&str> = several.iter().map(|k| k.tag_name()).collect();
            bail!(
                "Dependency `{name}` is in several tables: {}\n  = hint: pass --peer, --dev or --normal to choose one",
                names.join(", ")
            );
        }
    };

    remove_dependency(&mut project.document, Some(kind), name);
    project.save(format)?;
    println!("Removed `{name}` from {kind}");
    Ok(())
}
