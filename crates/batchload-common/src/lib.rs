//! Shared utilities for the batchload crates.
//!
//! This crate provides the owned XML document model used by the settings
//! reader and the template synthesizer, plus lexical path helpers.

pub mod error;
pub mod paths;
pub mod xml;

pub use error::{Result, XmlError};
pub use paths::{absolute_path, normalize_path};
pub use xml::{Document, Element, ElementPath, Node, parse_document, read_document};
