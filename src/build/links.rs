//! Link resolution.
//!
//! [`LinkResolver`] derives the full link graph of an assembled tree:
//! root/parent links up the containment hierarchy, child/item links down
//! it, and paired derived_from/via links for declared label-to-source
//! cross-references, so traversal works in both directions.

use tracing::warn;

use crate::error::CatalogError;
use crate::model::{
    Catalog, CollectionId, EntityRef, ItemId, Link, LinkGraph, LinkRel,
};

/// A declared cross-reference: one label item describes one or more source
/// items in another collection, named by tile identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossRef {
    /// Collection holding the label item.
    pub label_collection: CollectionId,
    /// The label item.
    pub label_item: ItemId,
    /// Collection holding the source items.
    pub source_collection: CollectionId,
    /// The source items the label describes.
    pub source_items: Vec<ItemId>,
}

/// A non-fatal duplicate-identifier finding from link resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateWarning {
    pub collection: CollectionId,
    pub item: ItemId,
}

/// The output of link resolution: the graph plus any duplicate warnings.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub graph: LinkGraph,
    pub duplicates: Vec<DuplicateWarning>,
}

/// Derives the link graph for a catalog tree.
#[derive(Clone, Debug, Default)]
pub struct LinkResolver {
    cross_refs: Vec<CrossRef>,
}

impl LinkResolver {
    /// Creates a resolver with no cross-references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares one cross-reference.
    pub fn cross_ref(mut self, cross_ref: CrossRef) -> Self {
        self.cross_refs.push(cross_ref);
        self
    }

    /// Declares a batch of cross-references, preserving order.
    pub fn cross_refs(mut self, refs: Vec<CrossRef>) -> Self {
        self.cross_refs.extend(refs);
        self
    }

    /// Declares cross-references by matching tile prefixes: every label
    /// item in `label_collection` is linked to the source items in
    /// `source_collection` whose identifier starts with the same tile id.
    ///
    /// This mirrors how label layers are produced: one label file per
    /// quarter-quad cell, covering every acquisition of that cell.
    pub fn cross_refs_by_tile(
        mut self,
        catalog: &Catalog,
        label_collection: &CollectionId,
        source_collection: &CollectionId,
    ) -> Self {
        let (Some(labels), Some(sources)) = (
            catalog.get_child(label_collection),
            catalog.get_child(source_collection),
        ) else {
            return self;
        };

        for label in labels.canonical_items() {
            let matching: Vec<ItemId> = sources
                .canonical_items()
                .filter(|source| source.id.tile_prefix() == label.id.tile_prefix())
                .map(|source| source.id.clone())
                .collect();
            if !matching.is_empty() {
                self.cross_refs.push(CrossRef {
                    label_collection: label_collection.clone(),
                    label_item: label.id.clone(),
                    source_collection: source_collection.clone(),
                    source_items: matching,
                });
            }
        }
        self
    }

    /// Resolves the full link graph.
    ///
    /// Emits, for every entity, a canonical parent link up the containment
    /// tree and child/item links down it; for every declared cross
    /// reference, paired derived_from and via links. When a collection
    /// holds duplicate item identifiers, the most recently built item is
    /// the link target and a [`DuplicateWarning`] is recorded; duplicates
    /// are never silently merged.
    ///
    /// # Errors
    /// Returns [`CatalogError::DanglingReference`] if a cross-reference
    /// names an item with no match in the target collection.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Resolution, CatalogError> {
        let mut resolution = Resolution::default();
        let root = EntityRef::Catalog(catalog.id.clone());

        // The root links to itself, so every document in the written graph
        // can name its root the same way.
        resolution
            .graph
            .add(root.clone(), Link::new(LinkRel::Root, root.clone()));

        for collection in &catalog.collections {
            let coll_ref = EntityRef::Collection(collection.id.clone());
            resolution
                .graph
                .add(root.clone(), Link::new(LinkRel::Child, coll_ref.clone()));
            resolution
                .graph
                .add(coll_ref.clone(), Link::new(LinkRel::Root, root.clone()));
            resolution
                .graph
                .add(coll_ref.clone(), Link::new(LinkRel::Parent, root.clone()));

            for item in collection.canonical_items() {
                let item_ref = EntityRef::Item(collection.id.clone(), item.id.clone());
                resolution
                    .graph
                    .add(coll_ref.clone(), Link::new(LinkRel::Item, item_ref.clone()));
                resolution
                    .graph
                    .add(item_ref.clone(), Link::new(LinkRel::Root, root.clone()));
                resolution
                    .graph
                    .add(item_ref, Link::new(LinkRel::Parent, coll_ref.clone()));
            }

            for id in collection.duplicate_item_ids() {
                warn!(
                    collection = %collection.id,
                    item = %id,
                    "duplicate item identifier; most recently built wins"
                );
                resolution.duplicates.push(DuplicateWarning {
                    collection: collection.id.clone(),
                    item: id,
                });
            }
        }

        for cross_ref in &self.cross_refs {
            self.resolve_cross_ref(catalog, cross_ref, &mut resolution.graph)?;
        }

        Ok(resolution)
    }

    fn resolve_cross_ref(
        &self,
        catalog: &Catalog,
        cross_ref: &CrossRef,
        graph: &mut LinkGraph,
    ) -> Result<(), CatalogError> {
        let label_collection = catalog
            .get_child(&cross_ref.label_collection)
            .ok_or_else(|| CatalogError::DanglingReference {
                label: cross_ref.label_item.clone(),
                collection: cross_ref.label_collection.clone(),
                tile: cross_ref.label_item.clone(),
            })?;
        if label_collection.get_item(&cross_ref.label_item).is_none() {
            return Err(CatalogError::DanglingReference {
                label: cross_ref.label_item.clone(),
                collection: cross_ref.label_collection.clone(),
                tile: cross_ref.label_item.clone(),
            });
        }

        let source_collection =
            catalog
                .get_child(&cross_ref.source_collection)
                .ok_or_else(|| CatalogError::DanglingReference {
                    label: cross_ref.label_item.clone(),
                    collection: cross_ref.source_collection.clone(),
                    tile: cross_ref.label_item.clone(),
                })?;

        let label_ref = EntityRef::Item(
            cross_ref.label_collection.clone(),
            cross_ref.label_item.clone(),
        );

        for tile in &cross_ref.source_items {
            // get_item picks the most recently built duplicate.
            let source = source_collection.get_item(tile).ok_or_else(|| {
                CatalogError::DanglingReference {
                    label: cross_ref.label_item.clone(),
                    collection: cross_ref.source_collection.clone(),
                    tile: tile.clone(),
                }
            })?;
            let source_ref =
                EntityRef::Item(cross_ref.source_collection.clone(), source.id.clone());
            graph.add(
                label_ref.clone(),
                Link::new(LinkRel::DerivedFrom, source_ref.clone()),
            );
            graph.add(source_ref, Link::new(LinkRel::Via, label_ref.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{CollectionBuilder, ItemBuilder};
    use crate::model::{
        AssetRef, AssetRole, Bbox, CatalogId, Geometry, MediaType, TemporalValue,
    };

    fn item(id: &str) -> crate::model::Item {
        ItemBuilder::new(id)
            .geometry(Geometry::from_bbox(&Bbox::new(0.0, 0.0, 1.0, 1.0)))
            .temporal(TemporalValue::from_ymd(2021, 6, 1).expect("valid date"))
            .asset(
                "image",
                AssetRef::new(
                    format!("https://example.com/{id}.tif"),
                    MediaType::CogGeoTiff,
                    AssetRole::Data,
                ),
            )
            .build()
            .expect("build item")
    }

    fn two_collection_catalog() -> Catalog {
        let naip = CollectionBuilder::new("naip", "NAIP imagery")
            .items(vec![item("107762_2021_WA_NAIP_DOQQ")])
            .build()
            .expect("naip");
        let labels = CollectionBuilder::new("dnr-2021-stands", "Forest stands")
            .items(vec![item("107762_2021_WA_DNR_stands")])
            .build()
            .expect("labels");
        let mut catalog = Catalog::new("bench", "Benchmark", "test");
        catalog.collections.push(naip);
        catalog.collections.push(labels);
        catalog
    }

    #[test]
    fn test_containment_links() {
        let catalog = two_collection_catalog();
        let resolution = LinkResolver::new().resolve(&catalog).expect("resolve");
        let graph = &resolution.graph;

        let root = EntityRef::Catalog(CatalogId::new("bench"));
        let coll = EntityRef::Collection(CollectionId::new("naip"));
        let item_ref = EntityRef::Item(
            CollectionId::new("naip"),
            ItemId::new("107762_2021_WA_NAIP_DOQQ"),
        );

        assert!(graph
            .links_for(&root)
            .iter()
            .any(|l| l.rel == LinkRel::Child && l.target == coll));
        assert!(graph.has_parent(&coll));
        assert!(graph.has_parent(&item_ref));
        assert!(graph
            .links_for(&coll)
            .iter()
            .any(|l| l.rel == LinkRel::Item && l.target == item_ref));
        assert!(resolution.duplicates.is_empty());
    }

    #[test]
    fn test_cross_ref_links_both_directions() {
        let catalog = two_collection_catalog();
        let resolution = LinkResolver::new()
            .cross_ref(CrossRef {
                label_collection: CollectionId::new("dnr-2021-stands"),
                label_item: ItemId::new("107762_2021_WA_DNR_stands"),
                source_collection: CollectionId::new("naip"),
                source_items: vec![ItemId::new("107762_2021_WA_NAIP_DOQQ")],
            })
            .resolve(&catalog)
            .expect("resolve");

        let label_ref = EntityRef::Item(
            CollectionId::new("dnr-2021-stands"),
            ItemId::new("107762_2021_WA_DNR_stands"),
        );
        let source_ref = EntityRef::Item(
            CollectionId::new("naip"),
            ItemId::new("107762_2021_WA_NAIP_DOQQ"),
        );

        assert!(resolution
            .graph
            .links_for(&label_ref)
            .iter()
            .any(|l| l.rel == LinkRel::DerivedFrom && l.target == source_ref));
        assert!(resolution
            .graph
            .links_for(&source_ref)
            .iter()
            .any(|l| l.rel == LinkRel::Via && l.target == label_ref));
    }

    #[test]
    fn test_cross_refs_by_tile() {
        let catalog = two_collection_catalog();
        let resolution = LinkResolver::new()
            .cross_refs_by_tile(
                &catalog,
                &CollectionId::new("dnr-2021-stands"),
                &CollectionId::new("naip"),
            )
            .resolve(&catalog)
            .expect("resolve");

        let label_ref = EntityRef::Item(
            CollectionId::new("dnr-2021-stands"),
            ItemId::new("107762_2021_WA_DNR_stands"),
        );
        assert!(resolution
            .graph
            .links_for(&label_ref)
            .iter()
            .any(|l| l.rel == LinkRel::DerivedFrom));
    }

    #[test]
    fn test_dangling_reference() {
        let catalog = two_collection_catalog();
        let err = LinkResolver::new()
            .cross_ref(CrossRef {
                label_collection: CollectionId::new("dnr-2021-stands"),
                label_item: ItemId::new("107762_2021_WA_DNR_stands"),
                source_collection: CollectionId::new("naip"),
                source_items: vec![ItemId::new("999999_2021_WA_NAIP_DOQQ")],
            })
            .resolve(&catalog)
            .expect_err("should fail");
        assert!(matches!(err, CatalogError::DanglingReference { .. }));
    }

    #[test]
    fn test_duplicates_warn_and_link_latest_once() {
        let mut catalog = two_collection_catalog();
        let dup = catalog.collections[0].items[0].clone();
        catalog.collections[0].items.push(dup);
        let resolution = LinkResolver::new().resolve(&catalog).expect("resolve");

        assert_eq!(resolution.duplicates.len(), 1);
        let coll = EntityRef::Collection(CollectionId::new("naip"));
        let item_links = resolution
            .graph
            .links_for(&coll)
            .iter()
            .filter(|l| l.rel == LinkRel::Item)
            .count();
        // Two physical copies, one canonical item link.
        assert_eq!(item_links, 1);
    }
}
