//! The `<Item>` element of a template and its delete-key policy.

use std::fmt;

use batchload_common::{Document, Element, ElementPath};

use crate::delete::{ID_ATTRIBUTE, ITEM_ELEMENT};

/// Result of searching a template for its `<Item>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSearch {
    Found { path: ElementPath, kind: ItemKind },
    NotFound,
}

/// Finds the first `<Item>` anywhere in `document`, in document order.
pub fn locate_item(document: &Document) -> ItemSearch {
    let Some(path) = document.find_first(ITEM_ELEMENT) else {
        return ItemSearch::NotFound;
    };
    match document.element(&path) {
        Some(item) => ItemSearch::Found {
            kind: ItemKind::of(item),
            path,
        },
        None => ItemSearch::NotFound,
    }
}

/// Item types with their own delete policy; everything else is generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Part,
    PartBom,
    Generic(String),
}

impl ItemKind {
    /// Classifies an item by its `type` attribute (case-insensitive).
    pub fn of(item: &Element) -> Self {
        Self::from_type(item.attribute("type").unwrap_or_default())
    }

    pub fn from_type(type_name: &str) -> Self {
        let trimmed = type_name.trim();
        if trimmed.eq_ignore_ascii_case("Part") {
            Self::Part
        } else if trimmed.eq_ignore_ascii_case("Part BOM") {
            Self::PartBom
        } else {
            Self::Generic(trimmed.to_string())
        }
    }

    /// The key a delete of this kind binds to.
    pub fn delete_key(&self, column: GuidColumn) -> DeleteKey {
        match self {
            Self::Part => part_delete_key(column),
            Self::PartBom => part_bom_delete_key(column),
            Self::Generic(_) => generic_delete_key(column),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part => f.write_str("Part"),
            Self::PartBom => f.write_str("Part BOM"),
            Self::Generic(name) if name.is_empty() => f.write_str("(untyped)"),
            Self::Generic(name) => f.write_str(name),
        }
    }
}

/// Attributes that select rows by something other than the bound GUID.
const SELECTOR_ATTRIBUTES: [&str; 2] = ["where", "idlist"];

// Parts are keyed by item_number in add templates; a delete must still go
// through the item GUID, since every generation of a part shares its number.
fn part_delete_key(column: GuidColumn) -> DeleteKey {
    DeleteKey::guid(column)
}

// A BOM row is a relationship; its GUID is the relationship id, not the
// parent or child part id.
fn part_bom_delete_key(column: GuidColumn) -> DeleteKey {
    DeleteKey::guid(column)
}

fn generic_delete_key(column: GuidColumn) -> DeleteKey {
    DeleteKey::guid(column)
}

/// Where the GUID column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// No header row: column 1 is assumed to hold the GUID.
    Assumed,
    /// Located by the `id` header name.
    Header,
}

/// A 1-based data column holding record GUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidColumn {
    index: usize,
    source: ColumnSource,
}

impl GuidColumn {
    /// Column 1, assumed without inspecting the data file.
    pub fn assumed_first() -> Self {
        Self {
            index: 1,
            source: ColumnSource::Assumed,
        }
    }

    /// A column found in the header row. `index` is 1-based.
    pub fn from_header(index: usize) -> Self {
        Self {
            index: index.max(1),
            source: ColumnSource::Header,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn source(&self) -> ColumnSource {
        self.source
    }

    pub fn is_assumed(&self) -> bool {
        self.source == ColumnSource::Assumed
    }

    /// Positional reference in the loader's template syntax (`@3`).
    pub fn reference(&self) -> String {
        format!("@{}", self.index)
    }
}

/// The identifying attribute a delete template sets on its item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteKey {
    pub attribute: &'static str,
    pub value: String,
}

impl DeleteKey {
    fn guid(column: GuidColumn) -> Self {
        Self {
            attribute: ID_ATTRIBUTE,
            value: column.reference(),
        }
    }

    /// Binds this key on `item`, dropping any other row selectors.
    #[must_use]
    pub fn apply(&self, item: Element) -> Element {
        SELECTOR_ATTRIBUTES
            .iter()
            .fold(item, |item, selector| item.without_attribute(selector))
            .with_attribute(self.attribute, self.value.clone())
    }
}
