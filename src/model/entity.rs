//! Core catalog entities: catalog, collection, item and their metadata.
//!
//! Ownership follows the containment tree: a [`Catalog`] exclusively owns
//! its [`Collection`]s, a collection exclusively owns its [`Item`]s, and an
//! item owns its assets. An item's `collection` field is an id-only back
//! reference used for lookup, never for lifetime control. Entities are
//! constructed by the builders in [`crate::build`], validated once fully
//! assembled, then serialized; after publish they are treated as immutable.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::asset::AssetRef;
use super::bbox::Bbox;
use super::extent::Extent;
use super::geometry::Geometry;
use super::ids::{CatalogId, CollectionId, ItemId};
use super::temporal::TemporalValue;

/// A catalog extension an item declares, named by its identifier in the
/// document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Extension {
    /// Electro-optical band metadata.
    #[serde(rename = "eo")]
    ElectroOptical,
    /// Map projection (EPSG code).
    #[serde(rename = "proj")]
    Projection,
    /// Label metadata for training-data items.
    #[serde(rename = "label")]
    Label,
}

/// One electro-optical band of a raster asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EoBand {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
}

/// The geometry kind of a label layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Vector,
    Raster,
}

/// Label metadata attached to label items and their collections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelMeta {
    pub description: String,

    #[serde(rename = "type")]
    pub label_type: LabelType,

    /// Tasks the labels support (e.g. "segmentation", "regression").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,

    /// Feature properties carrying the label values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Class names for classification/segmentation labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

/// The role a provider plays for a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Licensor,
    Producer,
    Processor,
    Host,
}

/// An organization that produced, processed, licenses or hosts a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<ProviderRole>,
}

impl Provider {
    /// Creates a provider with the given roles.
    pub fn new(name: impl Into<String>, roles: Vec<ProviderRole>) -> Self {
        Self {
            name: name.into(),
            url: None,
            roles,
        }
    }

    /// Sets the provider URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A dataset license: an SPDX-ish identifier, `"proprietary"`, or
/// `"various"`, with an optional URL to the license text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    /// Creates a license with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
        }
    }

    /// Sets the URL to the license text.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Returns true for proprietary (or unknown) licenses, which require a
    /// non-empty provider role set on the collection.
    pub fn is_proprietary(&self) -> bool {
        self.id.eq_ignore_ascii_case("proprietary")
    }
}

/// One spatio-temporal observation unit: a tile of one dataset at one time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    /// Id-only back reference to the owning collection, set when the item
    /// is added to a collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionId>,

    pub geometry: Geometry,

    /// Axis-aligned envelope of `geometry`. The builder computes this; a
    /// declared bbox that disagrees beyond tolerance never gets this far.
    pub bbox: Bbox,

    pub temporal: TemporalValue,

    /// Extension identifiers this item declares.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Extension>,

    /// Asset key -> asset reference. Ordered for stable serialization.
    pub assets: BTreeMap<String, AssetRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eo_bands: Vec<EoBand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj_epsg: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelMeta>,
}

impl Item {
    /// Returns the asset stored under `key`, if any.
    pub fn asset(&self, key: &str) -> Option<&AssetRef> {
        self.assets.get(key)
    }
}

/// A named group of items sharing a dataset or label type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub description: String,

    /// Union of member item extents; must contain every member item.
    pub extent: Extent,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<Provider>,

    pub license: License,

    /// Collection-level label summary, present on label collections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelMeta>,

    /// Member items in build order. May transiently contain duplicate
    /// identifiers after a re-ingest; [`Collection::canonical_items`]
    /// resolves those.
    pub items: Vec<Item>,
}

impl Collection {
    /// Iterates member items, yielding each identifier exactly once.
    ///
    /// When duplicates share an identifier (stale re-ingests), the most
    /// recently built one (last in build order) wins. The duplicates stay
    /// physically present for the validator to report; traversal must never
    /// enumerate them twice.
    pub fn canonical_items(&self) -> impl Iterator<Item = &Item> {
        let mut last_index: HashMap<&ItemId, usize> = HashMap::new();
        for (idx, item) in self.items.iter().enumerate() {
            last_index.insert(&item.id, idx);
        }
        self.items
            .iter()
            .enumerate()
            .filter(move |(idx, item)| last_index.get(&item.id) == Some(idx))
            .map(|(_, item)| item)
    }

    /// Returns the canonical item with the given identifier.
    pub fn get_item(&self, id: &ItemId) -> Option<&Item> {
        // Last build wins, same rule as canonical_items.
        self.items.iter().rev().find(|item| &item.id == id)
    }

    /// Identifiers that appear more than once among member items.
    pub fn duplicate_item_ids(&self) -> Vec<ItemId> {
        let mut counts: HashMap<&ItemId, usize> = HashMap::new();
        for item in &self.items {
            *counts.entry(&item.id).or_insert(0) += 1;
        }
        let mut dups: Vec<ItemId> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id.clone())
            .collect();
        dups.sort();
        dups
    }
}

/// The root container of a catalog tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: CatalogId,
    pub title: String,
    pub description: String,

    /// Child collections in build order.
    pub collections: Vec<Collection>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new(
        id: impl Into<CatalogId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            collections: Vec::new(),
        }
    }

    /// Returns the child collection with the given identifier.
    pub fn get_child(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| &c.id == id)
    }

    /// Looks up an item by identifier. With `recursive`, every collection
    /// is searched; otherwise nothing is found (the catalog root holds no
    /// items of its own).
    pub fn get_item(&self, id: &ItemId, recursive: bool) -> Option<&Item> {
        if !recursive {
            return None;
        }
        self.collections.iter().find_map(|c| c.get_item(id))
    }

    /// Iterates the canonical items of every collection, in collection
    /// build order. Finite and restartable: each call walks the tree afresh.
    pub fn get_all_items(&self) -> impl Iterator<Item = &Item> {
        self.collections.iter().flat_map(|c| c.canonical_items())
    }
}
