//! Item construction.
//!
//! [`ItemBuilder`] assembles one catalog entry from a tile identifier, a
//! footprint geometry, a temporal value and a set of asset references. The
//! bbox is always computed from the geometry; a declared bbox is only
//! accepted as a cross-check. Building touches no disk.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::CatalogError;
use crate::model::{
    AssetRef, Bbox, EoBand, Extension, Geometry, Item, ItemId, LabelMeta, TemporalValue,
};

/// Builds one [`Item`] from its required metadata and assets.
#[derive(Clone, Debug)]
pub struct ItemBuilder {
    id: ItemId,
    geometry: Option<Geometry>,
    declared_bbox: Option<Bbox>,
    temporal: Option<TemporalValue>,
    assets: BTreeMap<String, AssetRef>,
    eo_bands: Vec<EoBand>,
    proj_epsg: Option<i32>,
    label: Option<LabelMeta>,
}

impl ItemBuilder {
    /// Starts a builder for the given item identifier (tile identifier plus
    /// dataset code, e.g. `107762_2021_WA_NAIP_DOQQ`).
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            geometry: None,
            declared_bbox: None,
            temporal: None,
            assets: BTreeMap::new(),
            eo_bands: Vec::new(),
            proj_epsg: None,
            label: None,
        }
    }

    /// Sets the footprint geometry.
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Declares a bbox the caller believes matches the geometry. Building
    /// fails if it disagrees with the computed envelope beyond tolerance.
    pub fn declared_bbox(mut self, bbox: Bbox) -> Self {
        self.declared_bbox = Some(bbox);
        self
    }

    /// Sets the acquisition instant or interval.
    pub fn temporal(mut self, temporal: TemporalValue) -> Self {
        self.temporal = Some(temporal);
        self
    }

    /// Adds an asset under the given key. Keys are unique; adding the same
    /// key twice keeps the later asset.
    pub fn asset(mut self, key: impl Into<String>, asset: AssetRef) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    /// Attaches electro-optical band metadata; declares the `eo` extension.
    pub fn eo_bands(mut self, bands: Vec<EoBand>) -> Self {
        self.eo_bands = bands;
        self
    }

    /// Attaches the EPSG code; declares the `proj` extension.
    pub fn proj_epsg(mut self, epsg: i32) -> Self {
        self.proj_epsg = Some(epsg);
        self
    }

    /// Attaches label metadata; declares the `label` extension.
    pub fn label(mut self, label: LabelMeta) -> Self {
        self.label = Some(label);
        self
    }

    /// Builds the item.
    ///
    /// # Errors
    /// - [`CatalogError::IncompleteItem`] if geometry or datetime is
    ///   missing, or if the footprint is not a well-formed simple polygon
    /// - [`CatalogError::BboxMismatch`] if a declared bbox disagrees with
    ///   the computed envelope beyond tolerance
    pub fn build(self) -> Result<Item, CatalogError> {
        let geometry = self.geometry.ok_or_else(|| CatalogError::IncompleteItem {
            id: self.id.clone(),
            missing: "geometry".to_string(),
        })?;
        let temporal = self.temporal.ok_or_else(|| CatalogError::IncompleteItem {
            id: self.id.clone(),
            missing: "datetime".to_string(),
        })?;

        geometry
            .check_simple_polygon()
            .map_err(|fault| CatalogError::IncompleteItem {
                id: self.id.clone(),
                missing: format!("well-formed simple polygon ({})", fault),
            })?;

        // check_simple_polygon guarantees a non-empty exterior ring.
        let computed = geometry
            .envelope()
            .ok_or_else(|| CatalogError::IncompleteItem {
                id: self.id.clone(),
                missing: "geometry".to_string(),
            })?;

        if let Some(declared) = self.declared_bbox {
            if !declared.approx_eq(&computed) {
                return Err(CatalogError::BboxMismatch {
                    id: self.id,
                    declared,
                    computed,
                });
            }
        }

        let mut extensions = Vec::new();
        if !self.eo_bands.is_empty() {
            extensions.push(Extension::ElectroOptical);
        }
        if self.proj_epsg.is_some() {
            extensions.push(Extension::Projection);
        }
        if self.label.is_some() {
            extensions.push(Extension::Label);
        }

        debug!(item = %self.id, assets = self.assets.len(), "built item");

        Ok(Item {
            id: self.id,
            collection: None,
            geometry,
            bbox: computed,
            temporal,
            extensions,
            assets: self.assets,
            eo_bands: self.eo_bands,
            proj_epsg: self.proj_epsg,
            label: self.label,
        })
    }
}
