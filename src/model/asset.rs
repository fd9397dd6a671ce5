//! Asset references: one physical raster or vector file per asset.
//!
//! An [`AssetRef`] describes location, media type, roles and an optional
//! CRC32C checksum. Assets are opaque to the catalog; no raster or vector
//! decoding happens here.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Media types recognized by the catalog.
///
/// Serialized as full MIME strings so documents stay interoperable with
/// other catalog tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MediaType {
    /// Cloud-optimized GeoTIFF.
    CogGeoTiff,
    /// Plain GeoTIFF.
    GeoTiff,
    Png,
    Json,
    GeoJson,
    /// Anything else, carried verbatim.
    Other(String),
}

impl MediaType {
    /// Returns the MIME string for this media type.
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::CogGeoTiff => "image/tiff; application=geotiff; profile=cloud-optimized",
            MediaType::GeoTiff => "image/tiff; application=geotiff",
            MediaType::Png => "image/png",
            MediaType::Json => "application/json",
            MediaType::GeoJson => "application/geo+json",
            MediaType::Other(s) => s,
        }
    }
}

impl From<MediaType> for String {
    fn from(m: MediaType) -> String {
        m.as_str().to_string()
    }
}

impl From<String> for MediaType {
    fn from(s: String) -> MediaType {
        match s.as_str() {
            "image/tiff; application=geotiff; profile=cloud-optimized" => MediaType::CogGeoTiff,
            "image/tiff; application=geotiff" => MediaType::GeoTiff,
            "image/png" => MediaType::Png,
            "application/json" => MediaType::Json,
            "application/geo+json" => MediaType::GeoJson,
            _ => MediaType::Other(s),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role an asset plays within its item.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// The primary data file (raster tile, vector layer).
    Data,
    /// A small preview image.
    Thumbnail,
    /// Sidecar metadata describing the data file.
    Metadata,
    /// Vector label data describing source imagery.
    Labels,
}

impl AssetRole {
    /// Returns true if `media_type` is one of the recognized types for this
    /// role. Used by the validator; unknown combinations are reported, not
    /// rejected at build time.
    pub fn accepts(&self, media_type: &MediaType) -> bool {
        match self {
            AssetRole::Data => matches!(
                media_type,
                MediaType::CogGeoTiff | MediaType::GeoTiff | MediaType::GeoJson
            ),
            AssetRole::Thumbnail => matches!(media_type, MediaType::Png),
            AssetRole::Metadata => matches!(media_type, MediaType::Json),
            AssetRole::Labels => matches!(media_type, MediaType::GeoJson),
        }
    }
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssetRole::Data => "data",
            AssetRole::Thumbnail => "thumbnail",
            AssetRole::Metadata => "metadata",
            AssetRole::Labels => "labels",
        };
        write!(f, "{}", s)
    }
}

/// A reference to one physical file belonging to an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Resolvable locator: a filesystem path or URL.
    pub href: String,

    /// Media type of the referenced file.
    #[serde(rename = "type")]
    pub media_type: MediaType,

    /// Roles this asset plays. Kept sorted for stable serialization.
    pub roles: Vec<AssetRole>,

    /// Optional CRC32C checksum of the file contents, lowercase hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl AssetRef {
    /// Creates an asset reference with a single role.
    pub fn new(href: impl Into<String>, media_type: MediaType, role: AssetRole) -> Self {
        Self {
            href: href.into(),
            media_type,
            roles: vec![role],
            checksum: None,
        }
    }

    /// Adds a role, keeping the role list sorted and deduplicated.
    pub fn with_role(mut self, role: AssetRole) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
            self.roles.sort();
        }
        self
    }

    /// Attaches a precomputed CRC32C checksum.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Computes and attaches the CRC32C checksum of a local file.
    pub fn with_checksum_from(mut self, path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        self.checksum = Some(format!("{:08x}", crc32c::crc32c(&bytes)));
        Ok(self)
    }

    /// Returns true if the href points at the local filesystem rather than
    /// a remote service.
    pub fn is_local(&self) -> bool {
        !self.href.contains("://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_string_roundtrip() {
        for mt in [
            MediaType::CogGeoTiff,
            MediaType::GeoTiff,
            MediaType::Png,
            MediaType::Json,
            MediaType::GeoJson,
        ] {
            let s: String = mt.clone().into();
            assert_eq!(MediaType::from(s), mt);
        }
        let odd = MediaType::from("application/x-whatever".to_string());
        assert_eq!(odd, MediaType::Other("application/x-whatever".into()));
    }

    #[test]
    fn test_role_accepts() {
        assert!(AssetRole::Data.accepts(&MediaType::CogGeoTiff));
        assert!(AssetRole::Labels.accepts(&MediaType::GeoJson));
        assert!(!AssetRole::Thumbnail.accepts(&MediaType::Json));
        assert!(!AssetRole::Data.accepts(&MediaType::Png));
    }

    #[test]
    fn test_roles_sorted_and_deduped() {
        let asset = AssetRef::new("x.tif", MediaType::CogGeoTiff, AssetRole::Thumbnail)
            .with_role(AssetRole::Data)
            .with_role(AssetRole::Data);
        assert_eq!(asset.roles, vec![AssetRole::Data, AssetRole::Thumbnail]);
    }

    #[test]
    fn test_checksum_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tile.bin");
        std::fs::write(&path, b"terracat").expect("write");
        let asset = AssetRef::new(
            path.to_string_lossy().to_string(),
            MediaType::CogGeoTiff,
            AssetRole::Data,
        )
        .with_checksum_from(&path)
        .expect("checksum");
        let expected = format!("{:08x}", crc32c::crc32c(b"terracat"));
        assert_eq!(asset.checksum, Some(expected));
    }

    #[test]
    fn test_is_local() {
        let local = AssetRef::new("data/x.tif", MediaType::CogGeoTiff, AssetRole::Data);
        let remote = AssetRef::new(
            "https://example.com/x.tif",
            MediaType::CogGeoTiff,
            AssetRole::Data,
        );
        assert!(local.is_local());
        assert!(!remote.is_local());
    }
}
