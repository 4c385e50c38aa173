//! In-place edits of a manifest document.
//!
//! Edits work on the parsed [`Document`] rather than the [`Manifest`](crate::Manifest)
//! so comments and layout survive a format-and-write cycle.

use crate::DependencyKind;
use sdl_core::lexer::is_identifier;
use sdl_core::{Document, Ident, Literal, Span, Tag, Value};

/// Tag used for entries whose name is not a valid identifier.
const LONG_FORM: &str = "dependency";

/// Add a dependency, or change its range if it is already listed. The table
/// is created at the end of the document if missing.
///
/// Returns the previous range when an existing entry was updated.
pub fn set_dependency(
    document: &mut Document,
    kind: DependencyKind,
    name: &str,
    range: &str,
) -> Option<String> {
    let table = match document.tags.iter().position(|t| t.name.name == kind.tag_name()) {
        Some(index) => &mut document.tags[index],
        None => {
            let mut table = Tag::new(Ident::new(kind.tag_name(), Span::default()));
            table.has_body = true;
            table.blank_line_before = !document.tags.is_empty();
            document.tags.push(table);
            let last = document.tags.len() - 1;
            &mut document.tags[last]
        }
    };

    if let Some(entry) = table.children.iter_mut().find(|c| entry_name(c) == Some(name)) {
        let slot = usize::from(entry.name.name == LONG_FORM);
        let previous = entry
            .values
            .get(slot)
            .and_then(|l| l.value.as_str())
            .map(str::to_string);
        entry.values.truncate(slot);
        entry.values.push(Literal::new(range, Span::default()));
        tracing::debug!(name, range, table = kind.tag_name(), "updated dependency");
        return previous;
    }

    let entry = if is_identifier(name) && name != LONG_FORM {
        Tag::with_value(name, range)
    } else {
        let mut entry = Tag::with_value(LONG_FORM, name);
        entry.values.push(Literal::new(range, Span::default()));
        entry
    };
    table.push_child(entry);
    tracing::debug!(name, range, table = kind.tag_name(), "added dependency");
    None
}

/// Remove a dependency from one table, or from every table when `kind` is
/// `None`. Returns true if anything was removed.
pub fn remove_dependency(document: &mut Document, kind: Option<DependencyKind>, name: &str) -> bool {
    let mut removed = false;
    for table in &mut document.tags {
        let Some(table_kind) = DependencyKind::from_tag_name(&table.name.name) else {
            continue;
        };
        if kind.is_some_and(|k| k != table_kind) {
            continue;
        }
        let before = table.children.len();
        table.children.retain(|c| entry_name(c) != Some(name));
        if table.children.len() != before {
            tracing::debug!(name, table = table_kind.tag_name(), "removed dependency");
            removed = true;
        }
    }
    removed
}

/// Package name of a table entry in either the short or the long form
fn entry_name(entry: &Tag) -> Option<&str> {
    if entry.name.name == LONG_FORM {
        entry.value().and_then(Value::as_str)
    } else {
        Some(&entry.name.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdl_core::{Formatter, Parser};

    fn edit(source: &str, f: impl FnOnce(&mut Document)) -> String {
        let mut document = Parser::parse_document(source).unwrap();
        f(&mut document);
        Formatter::format_document(&document)
    }

    #[test]
    fn adds_to_existing_table() {
        let out = edit("dev-dependencies {\n    eslint \"^6.8.0\"\n}\n", |doc| {
            assert_eq!(set_dependency(doc, DependencyKind::Dev, "prettier", "1.19.1"), None);
        });
        assert_eq!(
            out,
            "dev-dependencies {\n    eslint \"^6.8.0\";\n    prettier \"1.19.1\";\n}\n"
        );
    }

    #[test]
    fn creates_missing_table() {
        let out = edit("name \"flip\"\n", |doc| {
            set_dependency(doc, DependencyKind::Peer, "react", ">=16.8.0");
        });
        assert_eq!(
            out,
            "name \"flip\";\n\npeer-dependencies {\n    react \">=16.8.0\";\n}\n"
        );
    }

    #[test]
    fn updates_range_in_place() {
        let out = edit("dependencies {\n    react \"^16\" // pinned\n}\n", |doc| {
            let previous = set_dependency(doc, DependencyKind::Normal, "react", "^17");
            assert_eq!(previous.as_deref(), Some("^16"));
        });
        assert_eq!(out, "dependencies {\n    react \"^17\"; // pinned\n}\n");
    }

    #[test]
    fn scoped_names_use_long_form() {
        let out = edit("dependencies {}\n", |doc| {
            set_dependency(doc, DependencyKind::Normal, "@babel/core", "^7.8.0");
        });
        assert_eq!(
            out,
            "dependencies {\n    dependency \"@babel/core\" \"^7.8.0\";\n}\n"
        );

        let updated = edit(&out, |doc| {
            let previous = set_dependency(doc, DependencyKind::Normal, "@babel/core", "^7.9.0");
            assert_eq!(previous.as_deref(), Some("^7.8.0"));
        });
        assert!(updated.contains("dependency \"@babel/core\" \"^7.9.0\";"));
    }

    #[test]
    fn removes_from_selected_tables() {
        let source = "dependencies {\n    react \"^16\"\n}\ndev-dependencies {\n    react \"^16\"\n    dependency \"@babel/core\" \"^7\"\n}\n";

        let out = edit(source, |doc| {
            assert!(remove_dependency(doc, Some(DependencyKind::Dev), "react"));
            assert!(remove_dependency(doc, None, "@babel/core"));
            assert!(!remove_dependency(doc, Some(DependencyKind::Peer), "react"));
        });
        assert_eq!(out, "dependencies {\n    react \"^16\";\n}\ndev-dependencies {}\n");
    }
}
