//! Source asset discovery.
//!
//! Walks a data directory and groups the files belonging to one tile of
//! one dataset into asset references, following the naming conventions of
//! the ingest pipeline: `<dataset>/.../<cellid>_<year>_<state>_<agency>`
//! stems with `-cog.tif`, `-preview.png`, `-metadata.json` and `.geojson`
//! suffixes. No raster or vector decoding happens here; files are opaque.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CatalogError;
use crate::model::{AssetRef, AssetRole, MediaType};

/// Options for a source scan.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanOptions {
    /// Compute a CRC32C checksum for every discovered file. Reads every
    /// file, so off by default.
    pub checksums: bool,
}

/// All files of one tile of one dataset, keyed the way item assets are.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceGroup {
    /// Dataset directory the files were found under.
    pub dataset: String,

    /// Tile stem, e.g. `107762_2021_WA_NAIP_DOQQ`.
    pub stem: String,

    /// Asset key -> reference, hrefs pointing at the scanned files.
    pub assets: BTreeMap<String, AssetRef>,
}

impl SourceGroup {
    /// The acquisition year embedded in the stem, when the second
    /// underscore-separated part is a 4-digit year.
    pub fn year(&self) -> Option<i32> {
        let part = self.stem.split('_').nth(1)?;
        if part.len() == 4 {
            part.parse().ok()
        } else {
            None
        }
    }
}

/// Classifies one file by its suffix convention. Returns the asset key,
/// role, media type and the tile stem with the suffix stripped.
fn classify(file_name: &str) -> Option<(&'static str, AssetRole, MediaType, String)> {
    if let Some(stem) = file_name.strip_suffix("-cog.tif") {
        Some(("image", AssetRole::Data, MediaType::CogGeoTiff, stem.into()))
    } else if let Some(stem) = file_name.strip_suffix("-preview.png") {
        Some(("thumbnail", AssetRole::Thumbnail, MediaType::Png, stem.into()))
    } else if let Some(stem) = file_name.strip_suffix("-metadata.json") {
        Some(("metadata", AssetRole::Metadata, MediaType::Json, stem.into()))
    } else if let Some(stem) = file_name.strip_suffix(".geojson") {
        Some(("labels", AssetRole::Labels, MediaType::GeoJson, stem.into()))
    } else {
        None
    }
}

/// Scans a data directory and groups recognized files by dataset and tile
/// stem. The walk is sorted, so results are deterministic for a given
/// directory state; unrecognized files are skipped.
pub fn scan_sources(root: &Path, opts: &ScanOptions) -> Result<Vec<SourceGroup>, CatalogError> {
    let mut groups: BTreeMap<(String, String), SourceGroup> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            CatalogError::Io(err.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "walk error")
            }))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        let Some((key, role, media_type, stem)) = classify(file_name) else {
            continue;
        };
        let Some(dataset) = dataset_of(root, entry.path()) else {
            // Files directly under the root have no dataset directory.
            continue;
        };

        let mut asset = AssetRef::new(
            entry.path().to_string_lossy().to_string(),
            media_type,
            role,
        );
        if opts.checksums {
            asset = asset.with_checksum_from(entry.path())?;
        }

        debug!(dataset = %dataset, stem = %stem, key, "discovered source file");
        groups
            .entry((dataset.clone(), stem.clone()))
            .or_insert_with(|| SourceGroup {
                dataset,
                stem,
                assets: BTreeMap::new(),
            })
            .assets
            .insert(key.to_string(), asset);
    }

    Ok(groups.into_values().collect())
}

/// The first path component below the scan root.
fn dataset_of(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let first = rel.components().next()?;
    let name = first.as_os_str().to_str()?;
    // A bare file directly under the root is not inside a dataset dir.
    if rel.components().count() < 2 {
        return None;
    }
    Some(name.to_string())
}

/// Returns the scanned file paths of one role, for callers that only need
/// a flat listing (mirrors the ingest pipeline's image collection helper).
pub fn collect_files(root: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| n.ends_with(suffix))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"data").expect("write");
    }

    fn sample_tree(root: &Path) {
        touch(&root.join("naip/2021/107762_2021_WA_NAIP_DOQQ-cog.tif"));
        touch(&root.join("naip/2021/107762_2021_WA_NAIP_DOQQ-preview.png"));
        touch(&root.join("naip/2021/107762_2021_WA_NAIP_DOQQ-metadata.json"));
        touch(&root.join("labels/107762_2021_WA_DNR_stands.geojson"));
        touch(&root.join("naip/2021/notes.txt")); // ignored
    }

    #[test]
    fn test_scan_groups_by_dataset_and_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        sample_tree(dir.path());

        let groups = scan_sources(dir.path(), &ScanOptions::default()).expect("scan");
        assert_eq!(groups.len(), 2);

        let labels = &groups[0];
        assert_eq!(labels.dataset, "labels");
        assert_eq!(labels.stem, "107762_2021_WA_DNR_stands");
        assert!(labels.assets.contains_key("labels"));

        let naip = &groups[1];
        assert_eq!(naip.dataset, "naip");
        assert_eq!(naip.stem, "107762_2021_WA_NAIP_DOQQ");
        assert_eq!(naip.assets.len(), 3);
        assert_eq!(
            naip.assets.get("image").expect("image").media_type,
            MediaType::CogGeoTiff
        );
    }

    #[test]
    fn test_scan_year() {
        let dir = tempfile::tempdir().expect("tempdir");
        sample_tree(dir.path());
        let groups = scan_sources(dir.path(), &ScanOptions::default()).expect("scan");
        assert_eq!(groups[1].year(), Some(2021));
    }

    #[test]
    fn test_scan_checksums() {
        let dir = tempfile::tempdir().expect("tempdir");
        sample_tree(dir.path());
        let groups = scan_sources(dir.path(), &ScanOptions { checksums: true }).expect("scan");
        let image = groups[1].assets.get("image").expect("image");
        let expected = format!("{:08x}", crc32c::crc32c(b"data"));
        assert_eq!(image.checksum.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_collect_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        sample_tree(dir.path());
        let cogs = collect_files(dir.path(), "-cog.tif");
        assert_eq!(cogs.len(), 1);
        let geojsons = collect_files(dir.path(), ".geojson");
        assert_eq!(geojsons.len(), 1);
    }
}
