//! Provider and license configuration input.
//!
//! A YAML document enumerates, per dataset group, the provider, license and
//! label metadata the collection builder attaches verbatim. Only role-set
//! membership is enforced (through enum deserialization); free-text fields
//! pass through unvalidated.
//!
//! ```yaml
//! naip:
//!   provider_name: USDA Farm Production and Conservation
//!   provider_url: https://www.fsa.usda.gov
//!   provider_roles: [producer, licensor]
//!   description: NAIP aerial imagery
//! dnr-stands:
//!   provider_name: Washington State DNR
//!   provider_roles: [producer, processor, host]
//!   description: Forest stand delineations
//!   label_type: vector
//!   label_task: [segmentation]
//!   label_name: stand_id
//!   label_license:
//!     type: CC-BY-4.0
//!     url: https://creativecommons.org/licenses/by/4.0/
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{LabelMeta, LabelType, License, Provider, ProviderRole};

/// A license entry inside the config document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LicenseEntry {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-dataset provider, license and label metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub provider_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,

    /// Roles are a closed set; unknown role names fail deserialization.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_roles: Vec<ProviderRole>,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_type: Option<LabelType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_task: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_properties: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_classes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_license: Option<LicenseEntry>,
}

impl DatasetConfig {
    /// The provider record this config describes.
    pub fn provider(&self) -> Provider {
        let mut provider = Provider::new(self.provider_name.clone(), self.provider_roles.clone());
        if let Some(url) = &self.provider_url {
            provider = provider.with_url(url.clone());
        }
        provider
    }

    /// The license for collections of this dataset. Falls back to the label
    /// license, then to proprietary when nothing is declared.
    pub fn license(&self) -> License {
        let entry = self.license.as_ref().or(self.label_license.as_ref());
        match entry {
            Some(e) => {
                let mut license = License::new(e.kind.clone());
                if let Some(url) = &e.url {
                    license = license.with_url(url.clone());
                }
                license
            }
            None => License::new("proprietary"),
        }
    }

    /// The label metadata block, present when this dataset is a label layer.
    pub fn label_meta(&self) -> Option<LabelMeta> {
        let label_type = self.label_type?;
        Some(LabelMeta {
            description: self.description.clone(),
            label_type,
            tasks: self.label_task.clone(),
            properties: self.label_properties.clone(),
            name: self.label_name.clone(),
            classes: self.label_classes.clone(),
        })
    }
}

/// The whole provider config: dataset identifier -> metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig {
    pub datasets: BTreeMap<String, DatasetConfig>,
}

impl ProviderConfig {
    /// Loads the config from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&text).map_err(|source| CatalogError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses the config from a YAML string. Useful for tests.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Returns the config block for one dataset group.
    pub fn get(&self, dataset: &str) -> Option<&DatasetConfig> {
        self.datasets.get(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
naip:
  provider_name: USDA Farm Production and Conservation
  provider_url: https://www.fsa.usda.gov
  provider_roles: [producer, licensor]
  description: NAIP aerial imagery
dnr-stands:
  provider_name: Washington State DNR
  provider_roles: [producer, processor, host]
  description: Forest stand delineations
  label_type: vector
  label_task: [segmentation]
  label_name: stand_id
  label_license:
    type: CC-BY-4.0
    url: https://creativecommons.org/licenses/by/4.0/
"#;

    #[test]
    fn test_parse_sample() {
        let config = ProviderConfig::from_yaml_str(SAMPLE).expect("parse");
        assert_eq!(config.datasets.len(), 2);

        let naip = config.get("naip").expect("naip");
        assert_eq!(
            naip.provider_roles,
            vec![ProviderRole::Producer, ProviderRole::Licensor]
        );
        assert_eq!(naip.license().id, "proprietary");
        assert!(naip.label_meta().is_none());
    }

    #[test]
    fn test_label_dataset_metadata() {
        let config = ProviderConfig::from_yaml_str(SAMPLE).expect("parse");
        let stands = config.get("dnr-stands").expect("dnr-stands");

        let label = stands.label_meta().expect("label meta");
        assert_eq!(label.label_type, LabelType::Vector);
        assert_eq!(label.tasks, vec!["segmentation"]);
        assert_eq!(label.name.as_deref(), Some("stand_id"));

        let license = stands.license();
        assert_eq!(license.id, "CC-BY-4.0");
        assert!(license.url.is_some());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let bad = r#"
x:
  provider_name: X
  provider_roles: [owner]
  description: nope
"#;
        assert!(ProviderConfig::from_yaml_str(bad).is_err());
    }
}
