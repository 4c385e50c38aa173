//! npm package name rules.

/// Longest name the npm registry accepts.
pub const MAX_NAME_LENGTH: usize = 214;

/// Names the registry reserves.
const RESERVED: &[&str] = &["node_modules", "favicon.ico"];

/// Check a package name against the npm naming rules.
///
/// Names may carry an `@scope/` prefix. Each part must be lowercase and made
/// of URL-safe characters, and may not start with `.` or `_`.
///
/// # Errors
///
/// Returns a description of the first rule the name breaks.
pub fn validate_package_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name cannot be empty");
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err("name cannot exceed 214 characters");
    }
    if name.trim() != name {
        return Err("name cannot have leading or trailing spaces");
    }
    if RESERVED.contains(&name.to_ascii_lowercase().as_str()) {
        return Err("name is reserved");
    }

    match name.strip_prefix('@') {
        Some(scoped) => {
            let Some((scope, package)) = scoped.split_once('/') else {
                return Err("scoped names must look like @scope/name");
            };
            validate_part(scope)?;
            validate_part(package)
        }
        None => validate_part(name),
    }
}

fn validate_part(part: &str) -> Result<(), &'static str> {
    if part.is_empty() {
        return Err("scope and name cannot be empty");
    }
    if part.starts_with('.') || part.starts_with('_') {
        return Err("name cannot start with a period or underscore");
    }
    if part.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("name can no longer contain capital letters");
    }
    let url_safe = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "-._~".contains(c);
    if !part.chars().all(url_safe) {
        return Err("name can only contain URL-friendly characters");
    }
    Ok(())
}
