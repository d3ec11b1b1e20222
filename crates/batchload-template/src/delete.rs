//! Derive a delete template from an add template.
//!
//! A delete template is the add template with its `<Item>` rewritten to
//! `action="delete"`, stripped of every mapping child, and keyed by a single
//! `id="@<n>"` attribute pointing at the data column that holds the record
//! GUID. Deletes never bind business keys.
//!
//! The GUID column is resolved once, here, rather than left to the loader:
//! - `first_row` <= 1 (or absent): the data has no header, so column 1 is
//!   assumed and the data file is never opened.
//! - `first_row` > 1: the first line of the data file is read and the column
//!   named `id` (case-insensitive) is bound by position.

use std::path::{Path, PathBuf};

use batchload_common::read_document;
use tracing::{debug, warn};

use crate::error::{MissingIdReason, Result, TemplateError};
use crate::header::{find_id_column, read_header_fields};
use crate::item::{GuidColumn, ItemKind, ItemSearch, locate_item};

/// Element that carries the item definition in a template.
pub const ITEM_ELEMENT: &str = "Item";

/// Attribute that identifies the record to delete.
pub const ID_ATTRIBUTE: &str = "id";

const ACTION_ATTRIBUTE: &str = "action";
const DELETE_ACTION: &str = "delete";

/// A delete template written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTemplate {
    /// Location of the generated template.
    pub path: PathBuf,
    /// Kind of the rewritten item.
    pub kind: ItemKind,
    /// Data column bound as the record GUID.
    pub column: GuidColumn,
}

/// Writes a delete variant of `add_template` to `dest_dir`, keeping the
/// template's file name and replacing any earlier output.
///
/// # Errors
///
/// - [`TemplateError::MalformedTemplate`] if the template cannot be parsed or
///   has no `<Item>` element.
/// - [`TemplateError::ConfigurationMismatch`] if a header is expected but no
///   data file was supplied.
/// - [`TemplateError::MissingIdColumn`] if the header cannot be read or has no
///   `id` column.
/// - [`TemplateError::Write`] if the output cannot be written.
pub fn make_delete_template(
    add_template: &Path,
    dest_dir: &Path,
    data_file: Option<&Path>,
    first_row: Option<i64>,
    delimiter: Option<char>,
) -> Result<DeleteTemplate> {
    let malformed = |reason: String| TemplateError::MalformedTemplate {
        path: add_template.to_path_buf(),
        reason,
    };

    let source = read_document(add_template).map_err(|error| malformed(error.to_string()))?;
    let ItemSearch::Found { path, kind } = locate_item(&source) else {
        return Err(malformed(format!("no <{ITEM_ELEMENT}> element")));
    };
    let file_name = add_template
        .file_name()
        .ok_or_else(|| malformed("template path has no file name".to_string()))?;

    let column = match first_row.filter(|row| *row > 1) {
        None => {
            let data_name = data_file
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned());
            warn!(
                first_row = first_row.unwrap_or(1),
                data_file = data_name.as_deref().unwrap_or("-"),
                "no header row expected; assuming column 1 holds the GUID"
            );
            GuidColumn::assumed_first()
        }
        Some(row) => {
            let data_file =
                data_file.ok_or(TemplateError::ConfigurationMismatch { first_row: row })?;
            guid_column_from_header(data_file, delimiter)?
        }
    };

    let key = kind.delete_key(column);
    let rewritten = source
        .replace_element(&path, |item| {
            key.apply(
                item.with_attribute(ACTION_ATTRIBUTE, DELETE_ACTION)
                    .without_children(),
            )
        })
        .ok_or_else(|| malformed(format!("<{ITEM_ELEMENT}> element vanished during rewrite")))?;

    let out_path = dest_dir.join(file_name);
    rewritten
        .write_pretty(&out_path, b'\t')
        .map_err(|source| TemplateError::Write {
            path: out_path.clone(),
            source,
        })?;
    debug!(
        template = %add_template.display(),
        output = %out_path.display(),
        kind = %kind,
        column = column.index(),
        "wrote delete template"
    );

    Ok(DeleteTemplate {
        path: out_path,
        kind,
        column,
    })
}

fn guid_column_from_header(data_file: &Path, delimiter: Option<char>) -> Result<GuidColumn> {
    let missing = |reason| TemplateError::MissingIdColumn {
        data_file: data_file.to_path_buf(),
        reason,
    };
    let headers = read_header_fields(data_file, delimiter);
    if headers.is_empty() {
        return Err(missing(MissingIdReason::HeaderUnreadable));
    }
    find_id_column(&headers)
        .map(GuidColumn::from_header)
        .ok_or_else(|| missing(MissingIdReason::NotInHeader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const USER_TEMPLATE: &str = "<AML>\n  <Item type=\"User\" action=\"add\">\n    <login_name>@2</login_name>\n  </Item>\n</AML>\n";

    #[test]
    fn test_headerless_binds_column_one() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("001-User.xml");
        fs::write(&template, USER_TEMPLATE).unwrap();

        let result = make_delete_template(&template, &dir.path().join("out"), None, None, None)
            .unwrap();

        assert!(result.column.is_assumed());
        let content = fs::read_to_string(&result.path).unwrap();
        assert!(content.contains("<Item type=\"User\" action=\"delete\" id=\"@1\"></Item>"));
        assert!(!content.contains("login_name"));
    }

    #[test]
    fn test_header_without_data_file_is_mismatch() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("001-User.xml");
        fs::write(&template, USER_TEMPLATE).unwrap();

        let err = make_delete_template(&template, dir.path(), None, Some(2), None).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::ConfigurationMismatch { first_row: 2 }
        ));
    }

    #[test]
    fn test_missing_item_is_malformed() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("bad.xml");
        fs::write(&template, "<AML><Relationships/></AML>").unwrap();

        let out = dir.path().join("out");
        let err = make_delete_template(&template, &out, None, None, None).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_unparseable_template_is_malformed() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("bad.xml");
        fs::write(&template, "<AML><Item action=\"add\">").unwrap();

        let err = make_delete_template(&template, dir.path(), None, None, None).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
    }
}
