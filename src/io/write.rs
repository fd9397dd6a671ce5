//! Catalog serialization.
//!
//! The writer lays a validated tree out as one document per entity under a
//! root directory, paths derived from identifiers. Output is byte-stable:
//! struct field order is fixed, asset maps are ordered, links come from the
//! deterministic graph, and floating-point coordinates use serde_json's
//! shortest-roundtrip formatting. Re-running on an unchanged tree rewrites
//! identical bytes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::model::{Catalog, EntityRef, LinkGraph};
use crate::validation::ValidationReport;

use super::documents::{doc_path, CatalogDoc, CollectionDoc, ItemDoc};

/// Options for publishing behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOptions {
    /// Publish even with outstanding error-level violations. The
    /// violations are still logged.
    pub force: bool,
}

/// Serializes a validated catalog tree to a directory of linked documents.
#[derive(Clone, Debug)]
pub struct CatalogWriter {
    root: PathBuf,
}

impl CatalogWriter {
    /// Creates a writer targeting the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes the tree.
    ///
    /// Publishing fails closed: a report with error-level violations blocks
    /// the write unless `opts.force` is set, in which case every violation
    /// is logged and the write proceeds. Warning-level violations never
    /// block.
    ///
    /// Only canonical items are written; a stale duplicate never reaches
    /// disk.
    ///
    /// # Errors
    /// [`CatalogError::ValidationFailed`] when blocked by the report, or an
    /// IO/serialization error from writing documents.
    pub fn write(
        &self,
        catalog: &Catalog,
        links: &LinkGraph,
        report: &ValidationReport,
        opts: &WriteOptions,
    ) -> Result<(), CatalogError> {
        if !report.is_ok() {
            if !opts.force {
                return Err(CatalogError::ValidationFailed {
                    error_count: report.error_count(),
                    warning_count: report.warning_count(),
                    report: report.clone(),
                });
            }
            for violation in &report.violations {
                warn!(%violation, "publishing despite violation (forced)");
            }
        }

        let root_entity = EntityRef::Catalog(catalog.id.clone());
        self.write_doc(
            &doc_path(&root_entity),
            &CatalogDoc::from_model(catalog, links),
        )?;

        for collection in &catalog.collections {
            let coll_entity = EntityRef::Collection(collection.id.clone());
            self.write_doc(
                &doc_path(&coll_entity),
                &CollectionDoc::from_model(collection, links),
            )?;

            for item in collection.canonical_items() {
                let item_entity = EntityRef::Item(collection.id.clone(), item.id.clone());
                self.write_doc(
                    &doc_path(&item_entity),
                    &ItemDoc::from_model(item, &collection.id, links),
                )?;
            }
        }

        info!(
            catalog = %catalog.id,
            root = %self.root.display(),
            collections = catalog.collections.len(),
            "catalog published"
        );
        Ok(())
    }

    fn write_doc<T: Serialize>(&self, rel_path: &Path, doc: &T) -> Result<(), CatalogError> {
        let path = self.root.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut bytes =
            serde_json::to_vec_pretty(doc).map_err(|source| CatalogError::DocWrite {
                path: path.clone(),
                source,
            })?;
        bytes.push(b'\n');
        fs::write(&path, bytes)?;
        Ok(())
    }
}
