//! On-disk document schema for the catalog graph.
//!
//! Each entity serializes to its own linked JSON document: the catalog
//! root, one document per collection, one per item (a GeoJSON Feature).
//! Every document carries a `type` discriminator and a `links` array of
//! relative hrefs. These schema types are the only place the document
//! layout is known; the writer and reader both go through them.
//!
//! # Layout
//!
//! ```text
//! catalog.json
//! <collection>/collection.json
//! <collection>/<item>/<item>.json
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{
    AssetRef, Bbox, Catalog, Collection, CollectionId, EntityRef, EoBand, Extension, Extent,
    Geometry, Item, ItemId, LabelMeta, License, LinkGraph, LinkRel, Provider, TemporalValue,
};

pub const CATALOG_TYPE: &str = "Catalog";
pub const COLLECTION_TYPE: &str = "Collection";
pub const ITEM_TYPE: &str = "Feature";

/// One entry in a document's `links` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDoc {
    pub rel: LinkRel,
    pub href: String,
}

/// The catalog root document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub links: Vec<LinkDoc>,
}

/// A collection document. Items are not embedded; they hang off `item`
/// links and load on demand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub description: String,
    pub extent: Extent,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<Provider>,

    pub license: License,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelMeta>,

    pub links: Vec<LinkDoc>,
}

/// Per-item temporal and extension payloads, carried in the GeoJSON
/// `properties` member. Either `datetime` or both of
/// `start_datetime`/`end_datetime` must be present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eo_bands: Vec<EoBand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj_epsg: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelMeta>,
}

/// An item document: a GeoJSON Feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    pub geometry: Geometry,
    pub bbox: Bbox,
    pub properties: ItemProperties,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Extension>,

    pub assets: BTreeMap<String, AssetRef>,
    pub links: Vec<LinkDoc>,
}

/// Repository-relative path of an entity's document.
pub fn doc_path(entity: &EntityRef) -> PathBuf {
    match entity {
        EntityRef::Catalog(_) => PathBuf::from("catalog.json"),
        EntityRef::Collection(id) => Path::new(id.as_str()).join("collection.json"),
        EntityRef::Item(coll, id) => Path::new(coll.as_str())
            .join(id.as_str())
            .join(format!("{}.json", id)),
    }
}

/// Directory depth of an entity's document below the catalog root.
fn doc_depth(entity: &EntityRef) -> usize {
    match entity {
        EntityRef::Catalog(_) => 0,
        EntityRef::Collection(_) => 1,
        EntityRef::Item(_, _) => 2,
    }
}

/// Relative href from one entity's document to another's. Uniform rule:
/// climb to the catalog root, then descend the target's path.
pub fn relative_href(from: &EntityRef, to: &EntityRef) -> String {
    let target = doc_path(to);
    let target = target.to_string_lossy();
    match doc_depth(from) {
        0 => format!("./{}", target),
        depth => format!("{}{}", "../".repeat(depth), target),
    }
}

/// Resolves a relative href against the directory holding the referencing
/// document, normalizing `.` and `..` segments without touching the
/// filesystem.
pub fn resolve_href(doc_dir: &Path, href: &str) -> PathBuf {
    let mut out = PathBuf::from(doc_dir);
    for component in Path::new(href).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Recovers the (collection, item) pair a link href points at, if it has
/// the item-document shape. Used to rebuild cross-references when reading.
pub fn item_ref_from_href(href: &str) -> Option<(CollectionId, ItemId)> {
    let parts: Vec<&str> = Path::new(href)
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => p.to_str(),
            _ => None,
        })
        .collect();
    match parts.as_slice() {
        [coll, item, file] if *file == format!("{}.json", item) => {
            Some((CollectionId::new(*coll), ItemId::new(*item)))
        }
        _ => None,
    }
}

/// Verifies a parsed document's `type` discriminator before decoding the
/// full schema, so a wrong kind of document reports as a schema mismatch
/// rather than a soup of missing fields.
pub fn check_doc_type(
    value: &serde_json::Value,
    expected: &str,
    href: &str,
) -> Result<(), CatalogError> {
    match value.get("type").and_then(|t| t.as_str()) {
        Some(t) if t == expected => Ok(()),
        Some(t) => Err(CatalogError::SchemaMismatch {
            href: href.to_string(),
            detail: format!("expected type '{}', found '{}'", expected, t),
        }),
        None => Err(CatalogError::SchemaMismatch {
            href: href.to_string(),
            detail: format!("expected type '{}', found none", expected),
        }),
    }
}

impl CatalogDoc {
    /// Renders the root document for a catalog, links taken from the graph.
    pub fn from_model(catalog: &Catalog, links: &LinkGraph) -> Self {
        let entity = EntityRef::Catalog(catalog.id.clone());
        Self {
            doc_type: CATALOG_TYPE.to_string(),
            id: catalog.id.as_str().to_string(),
            title: catalog.title.clone(),
            description: catalog.description.clone(),
            links: links_to_docs(&entity, links),
        }
    }
}

impl CollectionDoc {
    /// Renders a collection document, links taken from the graph.
    pub fn from_model(collection: &Collection, links: &LinkGraph) -> Self {
        let entity = EntityRef::Collection(collection.id.clone());
        Self {
            doc_type: COLLECTION_TYPE.to_string(),
            id: collection.id.as_str().to_string(),
            title: collection.title.clone(),
            description: collection.description.clone(),
            extent: collection.extent,
            providers: collection.providers.clone(),
            license: collection.license.clone(),
            label: collection.label.clone(),
            links: links_to_docs(&entity, links),
        }
    }

    /// Rebuilds the in-memory collection. Items load separately.
    pub fn into_model(self) -> Collection {
        Collection {
            id: CollectionId::new(self.id),
            title: self.title,
            description: self.description,
            extent: self.extent,
            providers: self.providers,
            license: self.license,
            label: self.label,
            items: Vec::new(),
        }
    }
}

impl ItemDoc {
    /// Renders an item document, links taken from the graph.
    pub fn from_model(item: &Item, collection: &CollectionId, links: &LinkGraph) -> Self {
        let entity = EntityRef::Item(collection.clone(), item.id.clone());
        let properties = match item.temporal {
            TemporalValue::Instant(t) => ItemProperties {
                datetime: Some(t),
                ..Default::default()
            },
            TemporalValue::Interval { start, end } => ItemProperties {
                start_datetime: Some(start),
                end_datetime: Some(end),
                ..Default::default()
            },
        };
        Self {
            doc_type: ITEM_TYPE.to_string(),
            id: item.id.as_str().to_string(),
            collection: Some(collection.as_str().to_string()),
            geometry: item.geometry.clone(),
            bbox: item.bbox,
            properties: ItemProperties {
                eo_bands: item.eo_bands.clone(),
                proj_epsg: item.proj_epsg,
                label: item.label.clone(),
                ..properties
            },
            extensions: item.extensions.clone(),
            assets: item.assets.clone(),
            links: links_to_docs(&entity, links),
        }
    }

    /// Rebuilds the in-memory item.
    ///
    /// # Errors
    /// Returns [`CatalogError::SchemaMismatch`] if neither a datetime nor a
    /// complete start/end pair is present.
    pub fn into_model(self, href: &str) -> Result<Item, CatalogError> {
        let temporal = match (
            self.properties.datetime,
            self.properties.start_datetime,
            self.properties.end_datetime,
        ) {
            (Some(t), _, _) => TemporalValue::Instant(t),
            (None, Some(start), Some(end)) => TemporalValue::Interval { start, end },
            _ => {
                return Err(CatalogError::SchemaMismatch {
                    href: href.to_string(),
                    detail: "item has neither datetime nor start/end pair".to_string(),
                })
            }
        };
        Ok(Item {
            id: ItemId::new(self.id),
            collection: self.collection.map(CollectionId::new),
            geometry: self.geometry,
            bbox: self.bbox,
            temporal,
            extensions: self.extensions,
            assets: self.assets,
            eo_bands: self.properties.eo_bands,
            proj_epsg: self.properties.proj_epsg,
            label: self.properties.label,
        })
    }
}

/// Converts an entity's outgoing links into document link entries with
/// relative hrefs.
fn links_to_docs(entity: &EntityRef, links: &LinkGraph) -> Vec<LinkDoc> {
    links
        .links_for(entity)
        .iter()
        .map(|link| LinkDoc {
            rel: link.rel,
            href: relative_href(entity, &link.target),
        })
        .collect()
}
