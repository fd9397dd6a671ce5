//! Directed links between catalog entities.
//!
//! Links are derived, recomputable data produced by the link resolver.
//! They exist in memory as a [`LinkGraph`] keyed by entity, and on disk as
//! link arrays inside the serialized documents. They are never maintained
//! by hand on the tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{CatalogId, CollectionId, ItemId};

/// The kind of a directed relation between two entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRel {
    /// Up to the catalog root.
    Root,
    /// Up to the immediate parent.
    Parent,
    /// Down to a child collection.
    Child,
    /// Down to a member item.
    Item,
    /// From a label item to a source item it describes.
    DerivedFrom,
    /// Reverse of `DerivedFrom`: from a source item to the label item.
    Via,
}

/// Addresses one entity in a catalog tree. Items are scoped by their
/// owning collection so two collections may (erroneously) carry the same
/// item identifier and still be distinguishable in reports.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Catalog(CatalogId),
    Collection(CollectionId),
    Item(CollectionId, ItemId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Catalog(id) => write!(f, "catalog {}", id),
            EntityRef::Collection(id) => write!(f, "collection {}", id),
            EntityRef::Item(coll, id) => write!(f, "item {}/{}", coll, id),
        }
    }
}

/// A directed link from one entity to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: LinkRel,
    pub target: EntityRef,
}

impl Link {
    pub fn new(rel: LinkRel, target: EntityRef) -> Self {
        Self { rel, target }
    }
}

/// The full link graph of one catalog tree: every entity's outgoing links.
///
/// Ordered maps keep link emission deterministic for the writer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkGraph {
    links: BTreeMap<EntityRef, Vec<Link>>,
}

impl LinkGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an outgoing link for `from`.
    pub fn add(&mut self, from: EntityRef, link: Link) {
        self.links.entry(from).or_default().push(link);
    }

    /// Outgoing links of one entity. Empty for unknown entities.
    pub fn links_for(&self, entity: &EntityRef) -> &[Link] {
        self.links.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All entities with at least one outgoing link, in deterministic order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityRef> {
        self.links.keys()
    }

    /// All (source, link) pairs, in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityRef, &Link)> {
        self.links
            .iter()
            .flat_map(|(from, links)| links.iter().map(move |l| (from, l)))
    }

    /// Returns true if `entity` carries a parent link.
    pub fn has_parent(&self, entity: &EntityRef) -> bool {
        self.links_for(entity)
            .iter()
            .any(|l| l.rel == LinkRel::Parent)
    }

    /// Number of entities in the graph.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if the graph holds no links at all.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_roundtrip() {
        let mut graph = LinkGraph::new();
        let coll = EntityRef::Collection(CollectionId::new("naip"));
        let root = EntityRef::Catalog(CatalogId::new("bench"));
        graph.add(coll.clone(), Link::new(LinkRel::Parent, root.clone()));
        graph.add(coll.clone(), Link::new(LinkRel::Root, root.clone()));
        graph.add(root.clone(), Link::new(LinkRel::Child, coll.clone()));

        assert_eq!(graph.links_for(&coll).len(), 2);
        assert!(graph.has_parent(&coll));
        assert!(!graph.has_parent(&root));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_entity_ref_display() {
        let e = EntityRef::Item(CollectionId::new("naip"), ItemId::new("t1"));
        assert_eq!(e.to_string(), "item naip/t1");
    }
}
