//! Read-only views of the manifest: `sdl scripts`, `sdl deps` and `sdl info`.

use crate::run::available_scripts;
use anyhow::{Context, Result};
use sdl_manifest::{Dependency, DependencyKind, Manifest};
use serde::Serialize;
use std::path::Path;

/// `sdl scripts`
pub fn scripts(manifest: &Manifest, json: bool) -> Result<()> {
    if json {
        let map: serde_json::Map<String, serde_json::Value> = manifest
            .scripts()
            .iter()
            .map(|s| (s.name.clone(), serde_json::Value::from(s.command.clone())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        println!("{}", available_scripts(manifest));
    }
    Ok(())
}

/// Whether the installed copy of a dependency matches its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallState {
    Ok,
    Mismatch,
    Missing,
}

impl std::fmt::Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Mismatch => write!(f, "mismatch"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DependencyStatus<'a> {
    #[serde(flatten)]
    pub dependency: &'a Dependency,
    pub installed: Option<String>,
    pub state: InstallState,
}

/// Version recorded in `node_modules/<name>/package.json`, if installed
pub fn installed_version(root: &Path, name: &str) -> Option<String> {
    let path = root.join("node_modules").join(name).join("package.json");
    let content = std::fs::read_to_string(path).ok()?;
    let package: serde_json::Value = serde_json::from_str(&content).ok()?;
    package.get("version")?.as_str().map(str::to_string)
}

pub fn dependency_status<'a>(root: &Path, dependency: &'a Dependency) -> DependencyStatus<'a> {
    let installed = installed_version(root, &dependency.name);
    let state = match &installed {
        None => InstallState::Missing,
        Some(version) if dependency.is_satisfied_by(version) => InstallState::Ok,
        Some(_) => InstallState::Mismatch,
    };
    DependencyStatus {
        dependency,
        installed,
        state,
    }
}

/// `sdl deps`
pub fn deps(manifest: &Manifest, root: &Path, kind: Option<DependencyKind>, json: bool) -> Result<()> {
    let kinds: Vec<DependencyKind> = match kind {
        Some(kind) => vec![kind],
        None => DependencyKind::ALL.to_vec(),
    };
    let statuses: Vec<DependencyStatus<'_>> = kinds
        .iter()
        .flat_map(|&kind| manifest.dependencies(kind))
        .map(|d| dependency_status(root, d))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("no dependencies");
        return Ok(());
    }

    let width = statuses
        .iter()
        .map(|s| s.dependency.name.len())
        .max()
        .unwrap_or(0);
    for kind in kinds {
        let rows: Vec<&DependencyStatus<'_>> = statuses
            .iter()
            .filter(|s| s.dependency.kind == kind)
            .collect();
        if rows.is_empty() {
            continue;
        }
        println!("{kind}:");
        for row in rows {
            let installed = row.installed.as_deref().unwrap_or("-");
            println!(
                "  {:width$}  {:12}  {:10}  {}",
                row.dependency.name, row.dependency.range, installed, row.state
            );
        }
    }
    Ok(())
}

/// `sdl info`
pub fn info(manifest: &Manifest, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
        println!("{text}");
        return Ok(());
    }

    println!("{}@{}", manifest.name, manifest.version);
    if let Some(description) = &manifest.description {
        println!("{description}");
    }
    println!();
    if let Some(license) = &manifest.license {
        println!("license:     {license}");
    }
    if let Some(author) = &manifest.author {
        println!("author:      {author}");
    }
    if let Some(homepage) = &manifest.homepage {
        println!("homepage:    {homepage}");
    }
    if let Some(repository) = &manifest.repository {
        println!("repository:  {}", repository.url);
    }
    if !manifest.keywords.is_empty() {
        println!("keywords:    {}", manifest.keywords.join(", "));
    }
    println!("scripts:     {}", manifest.scripts().len());
    for kind in DependencyKind::ALL {
        println!("{:<13}{}", format!("{kind}:"), manifest.dependencies(kind).count());
    }
    Ok(())
}
