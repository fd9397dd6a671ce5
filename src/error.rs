use std::path::PathBuf;
use thiserror::Error;

use crate::model::{Bbox, CollectionId, ItemId};
use crate::validation::ValidationReport;

/// The main error type for terracat operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Incomplete item '{id}': missing {missing}")]
    IncompleteItem { id: ItemId, missing: String },

    #[error("Declared bbox on item '{id}' disagrees with geometry envelope: declared {declared:?}, computed {computed:?}")]
    BboxMismatch {
        id: ItemId,
        declared: Bbox,
        computed: Bbox,
    },

    #[error("Collection '{id}' was built from zero items")]
    EmptyCollection { id: CollectionId },

    #[error("Cross-reference from label '{label}' names tile '{tile}' which has no item in collection '{collection}'")]
    DanglingReference {
        label: ItemId,
        collection: CollectionId,
        tile: ItemId,
    },

    #[error("Link resolution has not covered the tree: {detail}")]
    LinksNotResolved { detail: String },

    #[error("Failed to resolve '{href}' after {attempts} attempt(s): {detail}")]
    UnresolvedLink {
        href: String,
        attempts: u32,
        detail: String,
    },

    #[error("Document at '{href}' does not match its declared type: {detail}")]
    SchemaMismatch { href: String, detail: String },

    #[error("Failed to parse catalog document {path}: {source}")]
    DocParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write catalog document {path}: {source}")]
    DocWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse provider config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
