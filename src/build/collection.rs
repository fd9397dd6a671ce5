//! Collection construction.
//!
//! [`CollectionBuilder`] groups items sharing a dataset identity, computes
//! the collection extent as the union of item extents, and attaches
//! provider/license metadata, typically taken from a
//! [`crate::config::ProviderConfig`] block.

use tracing::info;

use crate::config::DatasetConfig;
use crate::error::CatalogError;
use crate::model::{
    Collection, CollectionId, Extent, Item, LabelMeta, License, Provider,
};

/// Builds one [`Collection`] from a dataset identifier and its items.
#[derive(Clone, Debug)]
pub struct CollectionBuilder {
    id: CollectionId,
    title: Option<String>,
    description: String,
    providers: Vec<Provider>,
    license: License,
    label: Option<LabelMeta>,
    items: Vec<Item>,
}

impl CollectionBuilder {
    /// Starts a builder for the given dataset identifier.
    pub fn new(id: impl Into<CollectionId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: description.into(),
            providers: Vec::new(),
            license: License::new("proprietary"),
            label: None,
            items: Vec::new(),
        }
    }

    /// Sets a human-readable title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds one provider.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Sets the license. Defaults to proprietary when never called.
    pub fn license(mut self, license: License) -> Self {
        self.license = license;
        self
    }

    /// Attaches a collection-level label summary.
    pub fn label(mut self, label: LabelMeta) -> Self {
        self.label = Some(label);
        self
    }

    /// Applies provider, license and label metadata from a config block,
    /// verbatim.
    pub fn from_config(mut self, config: &DatasetConfig) -> Self {
        self.providers.push(config.provider());
        self.license = config.license();
        if let Some(label) = config.label_meta() {
            self.label = Some(label);
        }
        self
    }

    /// Adds one item.
    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Adds a batch of items, preserving order.
    pub fn items(mut self, items: Vec<Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Builds the collection.
    ///
    /// The extent is the union of all item bboxes and the min/max of all
    /// item datetimes, computed by pairwise reduction, so it does not
    /// depend on item insertion order. Every item's collection back
    /// reference is set here.
    ///
    /// # Errors
    /// Returns [`CatalogError::EmptyCollection`] if no items were added.
    pub fn build(self) -> Result<Collection, CatalogError> {
        let extent = self
            .items
            .iter()
            .map(|item| Extent::from_parts(item.bbox, &item.temporal))
            .reduce(|a, b| a.union(&b))
            .ok_or(CatalogError::EmptyCollection {
                id: self.id.clone(),
            })?;

        let mut items = self.items;
        for item in &mut items {
            item.collection = Some(self.id.clone());
        }

        info!(collection = %self.id, items = items.len(), "built collection");

        Ok(Collection {
            id: self.id,
            title: self.title,
            description: self.description,
            extent,
            providers: self.providers,
            license: self.license,
            label: self.label,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::ItemBuilder;
    use crate::config::ProviderConfig;
    use crate::model::{AssetRef, AssetRole, Bbox, Geometry, MediaType, TemporalValue};

    fn item(id: &str, minx: f64, day: u32) -> Item {
        ItemBuilder::new(id)
            .geometry(Geometry::from_bbox(&Bbox::new(minx, 0.0, minx + 1.0, 1.0)))
            .temporal(TemporalValue::from_ymd(2021, 6, day).expect("valid date"))
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

    #[test]
    fn test_extent_is_union_of_items() {
        let collection = CollectionBuilder::new("naip", "NAIP imagery")
            .items(vec![item("a", 0.0, 1), item("b", 4.0, 20)])
            .build()
            .expect("build");

        assert_eq!(collection.extent.spatial, Bbox::new(0.0, 0.0, 5.0, 1.0));
        assert_eq!(
            collection.extent.temporal.start,
            TemporalValue::from_ymd(2021, 6, 1).expect("date").start()
        );
        assert_eq!(
            collection.extent.temporal.end,
            TemporalValue::from_ymd(2021, 6, 20).expect("date").end()
        );
    }

    #[test]
    fn test_extent_order_independent() {
        let forward = CollectionBuilder::new("c", "d")
            .items(vec![item("a", 0.0, 1), item("b", 4.0, 20), item("c", -2.0, 10)])
            .build()
            .expect("build");
        let reversed = CollectionBuilder::new("c", "d")
            .items(vec![item("c", -2.0, 10), item("b", 4.0, 20), item("a", 0.0, 1)])
            .build()
            .expect("build");
        assert_eq!(forward.extent, reversed.extent);
    }

    #[test]
    fn test_empty_collection_rejected() {
        let err = CollectionBuilder::new("empty", "no items")
            .build()
            .expect_err("should fail");
        assert!(matches!(err, CatalogError::EmptyCollection { .. }));
    }

    #[test]
    fn test_back_references_set() {
        let collection = CollectionBuilder::new("naip", "NAIP imagery")
            .item(item("a", 0.0, 1))
            .build()
            .expect("build");
        assert_eq!(
            collection.items[0].collection.as_ref().map(|c| c.as_str()),
            Some("naip")
        );
    }

    #[test]
    fn test_from_config_applies_metadata() {
        let yaml = r#"
dnr-stands:
  provider_name: Washington State DNR
  provider_roles: [producer, host]
  description: Forest stand delineations
  label_type: vector
  label_task: [segmentation]
  label_license:
    type: CC-BY-4.0
"#;
        let config = ProviderConfig::from_yaml_str(yaml).expect("parse");
        let collection = CollectionBuilder::new("dnr-stands", "Forest stand delineations")
            .from_config(config.get("dnr-stands").expect("block"))
            .item(item("107225_2021_WA_DNR", 0.0, 1))
            .build()
            .expect("build");

        assert_eq!(collection.providers.len(), 1);
        assert_eq!(collection.license.id, "CC-BY-4.0");
        assert!(collection.label.is_some());
    }
}
