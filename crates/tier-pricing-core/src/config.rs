use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::calculator::DEFAULT_FEATURES;
use crate::error::{PricingError, Result};
use crate::volume::{parse_volume, DEFAULT_VOLUMES};

/// Which volumes and features the reports cover.
///
/// ```toml
/// volumes = [10000, "50k", "2M"]
/// features = ["support", "soc2"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(deserialize_with = "deserialize_volumes")]
    pub volumes: Vec<u64>,
    pub features: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            volumes: DEFAULT_VOLUMES.to_vec(),
            features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VolumeSpec {
    Count(u64),
    Text(String),
}

fn deserialize_volumes<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u64>, D::Error> {
    Vec::<VolumeSpec>::deserialize(deserializer)?
        .into_iter()
        .map(|spec| match spec {
            VolumeSpec::Count(n) => Ok(n),
            VolumeSpec::Text(s) => parse_volume(&s).map_err(<D::Error as serde::de::Error>::custom),
        })
        .collect()
}

impl ReportConfig {
    /// Read a report config from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PricingError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            volumes = config.volumes.len(),
            features = config.features.len(),
            "loaded report config"
        );
        Ok(config)
    }

    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| PricingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace volumes and/or features with values given on the command line.
    /// Empty overrides leave the current values alone.
    pub fn with_overrides(mut self, volumes: Vec<u64>, features: Vec<String>) -> Result<Self> {
        if !volumes.is_empty() {
            self.volumes = volumes;
        }
        if !features.is_empty() {
            self.features = features;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.volumes.is_empty() {
            return Err(PricingError::Config("volumes must not be empty".into()));
        }
        if self.features.is_empty() {
            return Err(PricingError::Config("features must not be empty".into()));
        }
        if let Some(f) = self.features.iter().find(|f| f.trim().is_empty()) {
            return Err(PricingError::Config(format!("blank feature key {f:?}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ReportConfig::default();
        assert_eq!(c.volumes, DEFAULT_VOLUMES);
        assert_eq!(c.features.len(), DEFAULT_FEATURES.len());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_keeps_defaults() {
        assert_eq!(ReportConfig::parse("").unwrap(), ReportConfig::default());
    }

    #[test]
    fn volumes_accept_numbers_and_shorthand() {
        let c = ReportConfig::parse(r#"volumes = [10000, "50k", "2M"]"#).unwrap();
        assert_eq!(c.volumes, vec![10_000, 50_000, 2_000_000]);
        assert_eq!(c.features, ReportConfig::default().features);
    }

    #[test]
    fn bad_volume_is_config_error() {
        let err = ReportConfig::parse(r#"volumes = ["lots"]"#).unwrap_err();
        assert!(matches!(err, PricingError::Config(_)), "got {err:?}");
    }

    #[test]
    fn unknown_key_is_config_error() {
        let err = ReportConfig::parse("volume = [1]").unwrap_err();
        assert!(matches!(err, PricingError::Config(_)), "got {err:?}");
    }

    #[test]
    fn empty_lists_rejected() {
        assert!(ReportConfig::parse("volumes = []").is_err());
        assert!(ReportConfig::parse("features = []").is_err());
        assert!(ReportConfig::parse(r#"features = [" "]"#).is_err());
    }

    #[test]
    fn overrides_replace_only_when_given() {
        let c = ReportConfig::default()
            .with_overrides(vec![42], Vec::new())
            .unwrap();
        assert_eq!(c.volumes, vec![42]);
        assert_eq!(c.features, ReportConfig::default().features);

        let c = ReportConfig::default()
            .with_overrides(Vec::new(), vec!["soc2".into()])
            .unwrap();
        assert_eq!(c.volumes, DEFAULT_VOLUMES);
        assert_eq!(c.features, vec!["soc2"]);
    }
}
