//! Import templates for the batch loader.
//!
//! - [`resolve`] pairs a data file with its add template.
//! - [`delete`] derives a delete template that removes records by GUID.
//! - [`item`] classifies the template's `Item` and holds the per-kind delete
//!   key policy.

pub mod delete;
pub mod error;
pub mod header;
pub mod item;
pub mod resolve;

pub use delete::{DeleteTemplate, ID_ATTRIBUTE, ITEM_ELEMENT, make_delete_template};
pub use error::{MissingIdReason, Result, TemplateError};
pub use header::{REQUIRED_ID_COLUMN, find_id_column, read_header_fields};
pub use item::{ColumnSource, DeleteKey, GuidColumn, ItemKind, ItemSearch, locate_item};
pub use resolve::{TEMPLATE_SUFFIX, find_template, template_candidates, template_stem};
