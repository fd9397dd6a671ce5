//! Duplicate-ingest behavior: a re-ingested tile must never be enumerated
//! twice by traversal, and the validator must report it exactly once.

use terracat::build::{CollectionBuilder, ItemBuilder, LinkResolver};
use terracat::io::{CatalogReader, CatalogWriter, WriteOptions};
use terracat::model::{
    AssetRef, AssetRole, Bbox, Catalog, Geometry, Item, ItemId, MediaType, TemporalValue,
};
use terracat::validation::{validate_catalog, Severity, ValidateOptions, ViolationKind};

fn dem_item(minx: f64, day: u32) -> Item {
    ItemBuilder::new("107225_WA_3DEP_10mDEM")
        .geometry(Geometry::from_bbox(&Bbox::new(minx, 45.0, minx + 1.0, 46.0)))
        .temporal(TemporalValue::from_ymd(2021, 6, day).expect("valid date"))
        .asset(
            "image",
            AssetRef::new(
                format!("https://example.com/3dep/{minx}/107225-cog.tif"),
                MediaType::CogGeoTiff,
                AssetRole::Data,
            ),
        )
        .build()
        .expect("item")
}

/// A collection holding a stale and a fresh build of the same tile.
fn duplicated_catalog() -> Catalog {
    let stale = dem_item(-123.5, 1);
    let fresh = dem_item(-123.5, 15);

    let collection = CollectionBuilder::new("3dep", "3DEP 10m DEM")
        .items(vec![stale, fresh])
        .build()
        .expect("collection");

    let mut catalog = Catalog::new("forest-bench", "Forest Benchmarking Catalog", "test");
    catalog.collections.push(collection);
    catalog
}

#[test]
fn traversal_enumerates_duplicate_once() {
    let catalog = duplicated_catalog();
    let items: Vec<_> = catalog.get_all_items().collect();
    assert_eq!(items.len(), 1);
    // The survivor is the most recently built one.
    assert_eq!(
        items[0].temporal,
        TemporalValue::from_ymd(2021, 6, 15).expect("valid date")
    );
}

#[test]
fn resolver_warns_but_does_not_fail() {
    let catalog = duplicated_catalog();
    let resolution = LinkResolver::new().resolve(&catalog).expect("resolve");
    assert_eq!(resolution.duplicates.len(), 1);
    assert_eq!(
        resolution.duplicates[0].item,
        ItemId::new("107225_WA_3DEP_10mDEM")
    );
}

#[test]
fn validator_reports_exactly_one_duplicate_warning() {
    let catalog = duplicated_catalog();
    let links = LinkResolver::new().resolve(&catalog).expect("resolve").graph;
    let report =
        validate_catalog(&catalog, &links, &ValidateOptions::default()).expect("validate");

    let duplicates: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::DuplicateIdentifier)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].severity, Severity::Warning);
    // Warning-level only: publishing stays unblocked.
    assert!(report.is_ok());
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn published_catalog_lists_duplicate_once() {
    let catalog = duplicated_catalog();
    let links = LinkResolver::new().resolve(&catalog).expect("resolve").graph;
    let report =
        validate_catalog(&catalog, &links, &ValidateOptions::default()).expect("validate");

    let dir = tempfile::tempdir().expect("tempdir");
    CatalogWriter::new(dir.path())
        .write(&catalog, &links, &report, &WriteOptions::default())
        .expect("publish");

    let reader = CatalogReader::open(&dir.path().join("catalog.json")).expect("open");
    let items: Vec<_> = reader.get_all_items().collect();
    assert_eq!(items.len(), 1);
    let item = items[0].as_ref().expect("item");
    assert_eq!(item.id.as_str(), "107225_WA_3DEP_10mDEM");
    // The written document is the fresh build.
    assert_eq!(
        item.temporal,
        TemporalValue::from_ymd(2021, 6, 15).expect("valid date")
    );
}
