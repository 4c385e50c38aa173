//! Package manifests written in SDL.
//!
//! This crate provides:
//! - The `config.sdl` manifest model (identity, scripts, dependency tables)
//! - Schema validation with spanned violations
//! - npm-style package name and version range checks
//! - Manifest discovery by walking up the directory tree
//! - Document edits for adding and removing dependencies

mod edit;
mod location;
mod manifest;
mod name;
mod validate;

pub use edit::{remove_dependency, set_dependency};
pub use location::{ManifestLocation, MANIFEST_FILE};
pub use manifest::{
    Author, Dependency, DependencyKind, Manifest, ManifestError, Repository, Script,
};
pub use name::validate_package_name;
pub use validate::{parse_range, Violation, ViolationKind};
