//! Lazy catalog reading.
//!
//! [`CatalogReader`] opens a root document and loads the rest of the tree
//! on demand: collections when traversal first touches them, items one
//! document at a time. A per-reader cache keyed by document path keeps any
//! document from being fetched twice, while every traversal call re-walks
//! the tree from its current state; there is no hidden cursor.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::build::CrossRef;
use crate::error::CatalogError;
use crate::model::{Catalog, CatalogId, Collection, CollectionId, Item, ItemId, LinkRel};

use super::documents::{
    check_doc_type, item_ref_from_href, resolve_href, CatalogDoc, CollectionDoc, ItemDoc,
    CATALOG_TYPE, COLLECTION_TYPE, ITEM_TYPE,
};
use super::fetch::{fetch_with_retry, Fetcher, FileFetcher, RetryPolicy};

/// Reads a catalog document graph, fetching documents on demand.
pub struct CatalogReader {
    root_dir: PathBuf,
    root: CatalogDoc,
    /// Child collection document paths, in root link order.
    collection_paths: Vec<PathBuf>,
    fetcher: Box<dyn Fetcher>,
    policy: RetryPolicy,
    collections: RefCell<HashMap<PathBuf, CollectionDoc>>,
    items: RefCell<HashMap<PathBuf, ItemDoc>>,
}

impl CatalogReader {
    /// Opens the catalog rooted at the given document, using the local
    /// filesystem and the default retry policy.
    pub fn open(root_doc: &Path) -> Result<Self, CatalogError> {
        Self::open_with(root_doc, Box::new(FileFetcher), RetryPolicy::default())
    }

    /// Opens the catalog with a custom fetcher and retry policy.
    pub fn open_with(
        root_doc: &Path,
        fetcher: Box<dyn Fetcher>,
        policy: RetryPolicy,
    ) -> Result<Self, CatalogError> {
        let root_dir = root_doc
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let value = fetch_value(fetcher.as_ref(), root_doc, &policy)?;
        check_doc_type(&value, CATALOG_TYPE, &root_doc.display().to_string())?;
        let root: CatalogDoc = decode(value, root_doc)?;

        let collection_paths = root
            .links
            .iter()
            .filter(|l| l.rel == LinkRel::Child)
            .map(|l| resolve_href(&root_dir, &l.href))
            .collect();

        Ok(Self {
            root_dir,
            root,
            collection_paths,
            fetcher,
            policy,
            collections: RefCell::new(HashMap::new()),
            items: RefCell::new(HashMap::new()),
        })
    }

    /// The root catalog identifier.
    pub fn id(&self) -> CatalogId {
        CatalogId::new(self.root.id.clone())
    }

    /// Loads the metadata of every child collection, in link order. Items
    /// are not loaded.
    pub fn get_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        self.collection_paths
            .iter()
            .map(|path| Ok(self.collection_doc(path)?.into_model()))
            .collect()
    }

    /// Finds a child collection by identifier. Collections are loaded one
    /// at a time until the identifier matches.
    pub fn get_child(&self, id: &CollectionId) -> Result<Option<Collection>, CatalogError> {
        for path in &self.collection_paths {
            let doc = self.collection_doc(path)?;
            if doc.id == id.as_str() {
                return Ok(Some(doc.into_model()));
            }
        }
        Ok(None)
    }

    /// Finds an item by identifier. With `recursive`, every collection is
    /// searched in order; otherwise nothing is found, since the catalog
    /// root holds no items of its own. Only documents whose path stem
    /// matches the identifier are fetched.
    pub fn get_item(&self, id: &ItemId, recursive: bool) -> Result<Option<Item>, CatalogError> {
        if !recursive {
            return Ok(None);
        }
        for coll_path in &self.collection_paths {
            for item_path in self.item_paths(coll_path)? {
                let stem_matches = item_path
                    .file_stem()
                    .map(|s| s == std::ffi::OsStr::new(id.as_str()))
                    .unwrap_or(false);
                if !stem_matches {
                    continue;
                }
                let doc = self.item_doc(&item_path)?;
                if doc.id == id.as_str() {
                    return Ok(Some(
                        doc.into_model(&item_path.display().to_string())?,
                    ));
                }
            }
        }
        Ok(None)
    }

    /// Iterates every item in the catalog lazily, in collection and link
    /// order, yielding each identifier at most once per collection. The
    /// iterator is finite and restartable: each call starts a fresh walk.
    pub fn get_all_items(&self) -> ItemIter<'_> {
        ItemIter {
            reader: self,
            collection_paths: self.collection_paths.clone(),
            next_collection: 0,
            current_items: Vec::new(),
            next_item: 0,
            seen: HashSet::new(),
        }
    }

    /// Materializes the whole tree plus the cross-references recorded in
    /// item documents. Any failure aborts the read; a partial tree is
    /// never returned.
    pub fn read_tree(&self) -> Result<(Catalog, Vec<CrossRef>), CatalogError> {
        let mut catalog = Catalog::new(
            self.root.id.clone(),
            self.root.title.clone(),
            self.root.description.clone(),
        );
        let mut cross_refs = Vec::new();

        for coll_path in &self.collection_paths {
            let doc = self.collection_doc(coll_path)?;
            let mut collection = doc.into_model();

            for item_path in self.item_paths(coll_path)? {
                let item_doc = self.item_doc(&item_path)?;
                let sources: Vec<ItemId> = item_doc
                    .links
                    .iter()
                    .filter(|l| l.rel == LinkRel::DerivedFrom)
                    .filter_map(|l| item_ref_from_href(&l.href))
                    .map(|(_, item)| item)
                    .collect();
                if !sources.is_empty() {
                    // All derived_from links of one item point into one
                    // source collection in this layout.
                    if let Some((source_collection, _)) = item_doc
                        .links
                        .iter()
                        .filter(|l| l.rel == LinkRel::DerivedFrom)
                        .find_map(|l| item_ref_from_href(&l.href))
                    {
                        cross_refs.push(CrossRef {
                            label_collection: collection.id.clone(),
                            label_item: ItemId::new(item_doc.id.clone()),
                            source_collection,
                            source_items: sources,
                        });
                    }
                }
                collection
                    .items
                    .push(item_doc.into_model(&item_path.display().to_string())?);
            }
            catalog.collections.push(collection);
        }

        Ok((catalog, cross_refs))
    }

    /// Item document paths of one collection, in link order.
    fn item_paths(&self, coll_path: &Path) -> Result<Vec<PathBuf>, CatalogError> {
        let doc = self.collection_doc(coll_path)?;
        let dir = coll_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(doc
            .links
            .iter()
            .filter(|l| l.rel == LinkRel::Item)
            .map(|l| resolve_href(&dir, &l.href))
            .collect())
    }

    /// Fetches and caches a collection document.
    fn collection_doc(&self, path: &Path) -> Result<CollectionDoc, CatalogError> {
        if let Some(doc) = self.collections.borrow().get(path) {
            return Ok(doc.clone());
        }
        debug!(path = %path.display(), "loading collection document");
        let value = fetch_value(self.fetcher.as_ref(), path, &self.policy)?;
        check_doc_type(&value, COLLECTION_TYPE, &path.display().to_string())?;
        let doc: CollectionDoc = decode(value, path)?;
        self.collections
            .borrow_mut()
            .insert(path.to_path_buf(), doc.clone());
        Ok(doc)
    }

    /// Fetches and caches an item document.
    fn item_doc(&self, path: &Path) -> Result<ItemDoc, CatalogError> {
        if let Some(doc) = self.items.borrow().get(path) {
            return Ok(doc.clone());
        }
        debug!(path = %path.display(), "loading item document");
        let value = fetch_value(self.fetcher.as_ref(), path, &self.policy)?;
        check_doc_type(&value, ITEM_TYPE, &path.display().to_string())?;
        let doc: ItemDoc = decode(value, path)?;
        self.items.borrow_mut().insert(path.to_path_buf(), doc.clone());
        Ok(doc)
    }

    /// The directory holding the root document.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

/// Fetches a document and parses it as JSON. A document that cannot be
/// fetched or is not JSON at all reports as an unresolved link; schema
/// problems are reported separately once the type discriminator is known.
fn fetch_value(
    fetcher: &dyn Fetcher,
    path: &Path,
    policy: &RetryPolicy,
) -> Result<serde_json::Value, CatalogError> {
    let bytes = fetch_with_retry(fetcher, path, policy)?;
    serde_json::from_slice(&bytes).map_err(|err| CatalogError::UnresolvedLink {
        href: path.display().to_string(),
        attempts: 1,
        detail: format!("malformed document: {}", err),
    })
}

/// Decodes a type-checked JSON value into a document struct. Missing or
/// ill-typed fields report as a schema mismatch.
fn decode<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    path: &Path,
) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|err| CatalogError::SchemaMismatch {
        href: path.display().to_string(),
        detail: err.to_string(),
    })
}

/// Lazy item iterator returned by [`CatalogReader::get_all_items`].
pub struct ItemIter<'a> {
    reader: &'a CatalogReader,
    collection_paths: Vec<PathBuf>,
    next_collection: usize,
    current_items: Vec<PathBuf>,
    next_item: usize,
    seen: HashSet<(usize, ItemId)>,
}

impl Iterator for ItemIter<'_> {
    type Item = Result<Item, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.next_item < self.current_items.len() {
                let path = self.current_items[self.next_item].clone();
                self.next_item += 1;
                let item = self
                    .reader
                    .item_doc(&path)
                    .and_then(|doc| doc.into_model(&path.display().to_string()));
                match item {
                    Ok(item) => {
                        let key = (self.next_collection, item.id.clone());
                        if self.seen.insert(key) {
                            return Some(Ok(item));
                        }
                        // Duplicate identifier within one collection:
                        // enumerate it exactly once.
                        continue;
                    }
                    Err(err) => return Some(Err(err)),
                }
            }

            if self.next_collection >= self.collection_paths.len() {
                return None;
            }
            let coll_path = self.collection_paths[self.next_collection].clone();
            self.next_collection += 1;
            self.next_item = 0;
            match self.reader.item_paths(&coll_path) {
                Ok(paths) => self.current_items = paths,
                Err(err) => {
                    self.current_items = Vec::new();
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{CollectionBuilder, ItemBuilder, LinkResolver};
    use crate::io::write::{CatalogWriter, WriteOptions};
    use crate::model::{
        AssetRef, AssetRole, Bbox, Geometry, MediaType, TemporalValue,
    };
    use crate::validation::ValidationReport;

    fn write_sample(root: &Path) {
        let item = ItemBuilder::new("107762_2021_WA_NAIP_DOQQ")
            .geometry(Geometry::from_bbox(&Bbox::new(-123.5, 45.0, -123.0, 45.5)))
            .temporal(TemporalValue::from_ymd(2021, 6, 1).expect("valid date"))
            .asset(
                "image",
                AssetRef::new(
                    "https://example.com/107762.tif",
                    MediaType::CogGeoTiff,
                    AssetRole::Data,
                ),
            )
            .build()
            .expect("item");
        let collection = CollectionBuilder::new("naip", "NAIP imagery")
            .items(vec![item])
            .build()
            .expect("collection");
        let mut catalog = Catalog::new("bench", "Benchmark", "test catalog");
        catalog.collections.push(collection);
        let links = LinkResolver::new().resolve(&catalog).expect("resolve").graph;
        CatalogWriter::new(root)
            .write(
                &catalog,
                &links,
                &ValidationReport::new(),
                &WriteOptions::default(),
            )
            .expect("write");
    }

    #[test]
    fn test_open_reads_root_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        // Delete the item document: opening and listing collections must
        // still work, since neither touches item documents.
        std::fs::remove_dir_all(dir.path().join("naip/107762_2021_WA_NAIP_DOQQ"))
            .expect("remove");

        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");
        assert_eq!(reader.id().as_str(), "bench");
        let collections = reader.get_collections().expect("collections");
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].id.as_str(), "naip");
    }

    #[test]
    fn test_get_item_recursive() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");

        let id = ItemId::new("107762_2021_WA_NAIP_DOQQ");
        assert!(reader.get_item(&id, false).expect("lookup").is_none());
        let item = reader
            .get_item(&id, true)
            .expect("lookup")
            .expect("found");
        assert_eq!(item.collection.as_ref().map(|c| c.as_str()), Some("naip"));
    }

    #[test]
    fn test_get_all_items_restartable() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");

        let first: Vec<_> = reader.get_all_items().collect();
        let second: Vec<_> = reader.get_all_items().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(first[0].is_ok());
    }

    #[test]
    fn test_missing_item_document_is_unresolved_link() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        std::fs::remove_file(
            dir.path()
                .join("naip/107762_2021_WA_NAIP_DOQQ/107762_2021_WA_NAIP_DOQQ.json"),
        )
        .expect("remove");

        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");
        let results: Vec<_> = reader.get_all_items().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(CatalogError::UnresolvedLink { .. })
        ));
    }

    #[test]
    fn test_wrong_doc_type_is_schema_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        let item_path = dir
            .path()
            .join("naip/107762_2021_WA_NAIP_DOQQ/107762_2021_WA_NAIP_DOQQ.json");
        // Overwrite the item document with a collection-shaped one.
        let coll_bytes = std::fs::read(dir.path().join("naip/collection.json")).expect("read");
        std::fs::write(&item_path, coll_bytes).expect("write");

        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");
        let err = reader
            .get_item(&ItemId::new("107762_2021_WA_NAIP_DOQQ"), true)
            .expect_err("should fail");
        assert!(matches!(err, CatalogError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_read_tree_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sample(dir.path());
        let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");
        let (catalog, cross_refs) = reader.read_tree().expect("read tree");

        assert_eq!(catalog.id.as_str(), "bench");
        assert_eq!(catalog.collections.len(), 1);
        assert_eq!(catalog.collections[0].items.len(), 1);
        assert!(cross_refs.is_empty());
    }
}
