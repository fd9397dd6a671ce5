//! CLI integration tests for the terracat binary.

use std::path::Path;

use assert_cmd::Command;

use terracat::build::{CollectionBuilder, ItemBuilder, LinkResolver};
use terracat::io::{CatalogWriter, WriteOptions};
use terracat::model::{
    AssetRef, AssetRole, Bbox, Catalog, Geometry, MediaType, TemporalValue,
};
use terracat::validation::ValidationReport;

/// Publishes a small catalog; `asset_href` lets tests plant unresolvable
/// assets. Validation is skipped so broken catalogs can be written too.
fn publish_catalog(root: &Path, asset_href: &str) {
    let item = ItemBuilder::new("107762_2021_WA_NAIP_DOQQ")
        .geometry(Geometry::from_bbox(&Bbox::new(-123.5, 45.0, -123.0, 45.5)))
        .temporal(TemporalValue::from_ymd(2021, 6, 1).expect("valid date"))
        .asset(
            "image",
            AssetRef::new(asset_href, MediaType::CogGeoTiff, AssetRole::Data),
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
        .expect("publish");
}

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("terracat 0.3.0\n");
}

#[test]
fn validate_clean_catalog_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_catalog(dir.path(), "https://example.com/107762.tif");

    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.arg("validate").arg(dir.path().join("catalog.json"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_reports_unresolvable_asset() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_catalog(dir.path(), "/definitely/not/here.tif");

    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.arg("validate").arg(dir.path().join("catalog.json"));
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("UnresolvableAsset"));
}

#[test]
fn validate_no_assets_skips_href_checks() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_catalog(dir.path(), "/definitely/not/here.tif");

    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.args(["validate", "--no-assets"])
        .arg(dir.path().join("catalog.json"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_json_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_catalog(dir.path(), "https://example.com/107762.tif");

    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.args(["validate", "--output", "json"])
        .arg(dir.path().join("catalog.json"));
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"violations\""));
}

#[test]
fn validate_missing_root_fails() {
    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.args(["validate", "/no/such/catalog.json"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("error:"));
}

#[test]
fn validate_rejects_unknown_output_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    publish_catalog(dir.path(), "https://example.com/107762.tif");

    let mut cmd = Command::cargo_bin("terracat").unwrap();
    cmd.args(["validate", "--output", "xml"])
        .arg(dir.path().join("catalog.json"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported format"));
}
