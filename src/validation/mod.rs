//! Catalog validation for terracat.
//!
//! This module walks a fully assembled, link-resolved tree and checks:
//! - Identifier uniqueness within each containment scope
//! - Item bboxes and datetimes against the owning collection's extent
//! - Asset resolvability, media types and checksums
//! - Link targets
//! - Provider roles against the license kind
//!
//! Violations are collected, never short-circuited, so one pass reports
//! every problem in the tree. Validation refuses to run against a tree the
//! link resolver has not fully covered: a partial link graph would produce
//! false negatives.

mod report;

pub use report::{Severity, ValidationReport, Violation, ViolationKind};

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::{Catalog, Collection, EntityRef, LinkGraph};

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// Check that every asset href resolves to an existing file.
    pub check_assets: bool,

    /// Recompute CRC32C checksums of local assets that carry one. Reads
    /// every checksummed file, so off by default.
    pub verify_checksums: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            check_assets: true,
            verify_checksums: false,
        }
    }
}

/// Decides whether an asset href resolves. The default implementation
/// checks the local filesystem; remote URLs are accepted without a network
/// round-trip. Implement this to enforce stricter policies.
pub trait AssetResolver {
    /// Returns true if `href` is believed to point at an existing object.
    fn resolvable(&self, href: &str) -> bool;
}

/// Filesystem-backed resolver: local paths must exist, remote URLs pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsResolver;

impl AssetResolver for FsResolver {
    fn resolvable(&self, href: &str) -> bool {
        if href.contains("://") {
            return true;
        }
        Path::new(href).exists()
    }
}

/// Validates a catalog tree against its resolved link graph.
///
/// Uses the default filesystem [`AssetResolver`]. See
/// [`validate_catalog_with`] for a custom resolver.
///
/// # Errors
/// Returns [`CatalogError::LinksNotResolved`] if the link graph does not
/// cover the whole tree; validation never runs partially.
pub fn validate_catalog(
    catalog: &Catalog,
    links: &LinkGraph,
    opts: &ValidateOptions,
) -> Result<ValidationReport, CatalogError> {
    validate_catalog_with(catalog, links, opts, &FsResolver)
}

/// Validates a catalog tree, resolving asset hrefs through `resolver`.
pub fn validate_catalog_with(
    catalog: &Catalog,
    links: &LinkGraph,
    opts: &ValidateOptions,
    resolver: &dyn AssetResolver,
) -> Result<ValidationReport, CatalogError> {
    check_links_cover_tree(catalog, links)?;

    let mut report = ValidationReport::new();

    check_collection_ids(catalog, &mut report);
    for collection in &catalog.collections {
        check_items_within_extent(collection, &mut report);
        if opts.check_assets {
            check_assets(collection, opts, resolver, &mut report);
        }
        check_media_types(collection, &mut report);
    }
    check_link_targets(catalog, links, &mut report);
    for collection in &catalog.collections {
        check_duplicate_items(collection, &mut report);
        check_provider_roles(collection, &mut report);
    }

    info!(
        catalog = %catalog.id,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    Ok(report)
}

/// Precondition: every collection and every canonical item must carry a
/// parent link, otherwise the resolver has not seen the whole tree.
fn check_links_cover_tree(catalog: &Catalog, links: &LinkGraph) -> Result<(), CatalogError> {
    for collection in &catalog.collections {
        let entity = EntityRef::Collection(collection.id.clone());
        if !links.has_parent(&entity) {
            return Err(CatalogError::LinksNotResolved {
                detail: format!("{} has no parent link", entity),
            });
        }
        for item in collection.canonical_items() {
            let entity = EntityRef::Item(collection.id.clone(), item.id.clone());
            if !links.has_parent(&entity) {
                return Err(CatalogError::LinksNotResolved {
                    detail: format!("{} has no parent link", entity),
                });
            }
        }
    }
    Ok(())
}

/// (a) Collection identifiers must be unique within the catalog.
fn check_collection_ids(catalog: &Catalog, report: &mut ValidationReport) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, collection) in catalog.collections.iter().enumerate() {
        if let Some(first_idx) = seen.get(collection.id.as_str()) {
            report.add(Violation::error(
                ViolationKind::DuplicateCollectionId,
                EntityRef::Collection(collection.id.clone()),
                format!(
                    "duplicate collection id (first seen at index {})",
                    first_idx
                ),
            ));
        } else {
            seen.insert(collection.id.as_str(), idx);
        }
    }
}

/// (b) Every item must fall within the collection's declared extent, both
/// spatially and temporally.
fn check_items_within_extent(collection: &Collection, report: &mut ValidationReport) {
    for item in &collection.items {
        if !collection.extent.spatial.contains(&item.bbox) {
            report.add(Violation::error(
                ViolationKind::ItemOutsideExtent,
                EntityRef::Item(collection.id.clone(), item.id.clone()),
                format!(
                    "bbox {:?} outside collection extent {:?}",
                    item.bbox, collection.extent.spatial
                ),
            ));
        }
        if !collection.extent.temporal.contains(&item.temporal) {
            report.add(Violation::error(
                ViolationKind::ItemOutsideExtent,
                EntityRef::Item(collection.id.clone(), item.id.clone()),
                format!(
                    "datetime outside collection interval {:?}",
                    collection.extent.temporal
                ),
            ));
        }
    }
}

/// (c) Every asset href must resolve; recorded checksums must match when
/// verification is enabled.
fn check_assets(
    collection: &Collection,
    opts: &ValidateOptions,
    resolver: &dyn AssetResolver,
    report: &mut ValidationReport,
) {
    for item in &collection.items {
        let entity = EntityRef::Item(collection.id.clone(), item.id.clone());
        for (key, asset) in &item.assets {
            debug!(item = %item.id, asset = %key, href = %asset.href, "checking asset");
            if !resolver.resolvable(&asset.href) {
                report.add(Violation::error(
                    ViolationKind::UnresolvableAsset,
                    entity.clone(),
                    format!("asset '{}' href '{}' does not resolve", key, asset.href),
                ));
                continue;
            }
            if opts.verify_checksums && asset.is_local() {
                if let Some(recorded) = &asset.checksum {
                    match std::fs::read(&asset.href) {
                        Ok(bytes) => {
                            let actual = format!("{:08x}", crc32c::crc32c(&bytes));
                            if &actual != recorded {
                                report.add(Violation::error(
                                    ViolationKind::ChecksumMismatch,
                                    entity.clone(),
                                    format!(
                                        "asset '{}' checksum {} does not match recorded {}",
                                        key, actual, recorded
                                    ),
                                ));
                            }
                        }
                        Err(err) => {
                            report.add(Violation::error(
                                ViolationKind::UnresolvableAsset,
                                entity.clone(),
                                format!("asset '{}' could not be read: {}", key, err),
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// (c, continued) Media types must be recognized for each declared role.
fn check_media_types(collection: &Collection, report: &mut ValidationReport) {
    for item in &collection.items {
        for (key, asset) in &item.assets {
            for role in &asset.roles {
                if !role.accepts(&asset.media_type) {
                    report.add(Violation::error(
                        ViolationKind::UnrecognizedMediaType,
                        EntityRef::Item(collection.id.clone(), item.id.clone()),
                        format!(
                            "asset '{}' media type '{}' not recognized for role '{}'",
                            key, asset.media_type, role
                        ),
                    ));
                }
            }
        }
    }
}

/// (d) Every link must target an entity that exists in the tree.
fn check_link_targets(catalog: &Catalog, links: &LinkGraph, report: &mut ValidationReport) {
    let mut known: HashSet<EntityRef> = HashSet::new();
    known.insert(EntityRef::Catalog(catalog.id.clone()));
    for collection in &catalog.collections {
        known.insert(EntityRef::Collection(collection.id.clone()));
        for item in &collection.items {
            known.insert(EntityRef::Item(collection.id.clone(), item.id.clone()));
        }
    }

    for (from, link) in links.iter() {
        if !known.contains(&link.target) {
            report.add(Violation::error(
                ViolationKind::InvalidLinkTarget,
                from.clone(),
                format!("{:?} link targets missing {}", link.rel, link.target),
            ));
        }
    }
}

/// (e) Item identifiers must not repeat under one collection. One warning
/// per duplicated identifier, regardless of how many copies exist.
fn check_duplicate_items(collection: &Collection, report: &mut ValidationReport) {
    for id in collection.duplicate_item_ids() {
        report.add(Violation::warning(
            ViolationKind::DuplicateIdentifier,
            EntityRef::Item(collection.id.clone(), id.clone()),
            "item identifier appears more than once; traversal keeps the most recently built",
        ));
    }
}

/// (f) A proprietary license requires a non-empty provider role set.
fn check_provider_roles(collection: &Collection, report: &mut ValidationReport) {
    if collection.license.is_proprietary()
        && collection.providers.iter().all(|p| p.roles.is_empty())
    {
        report.add(Violation::error(
            ViolationKind::MissingProviderRoles,
            EntityRef::Collection(collection.id.clone()),
            "proprietary license but no provider declares a role",
        ));
    }
}
