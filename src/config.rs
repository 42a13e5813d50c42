//! Conversion settings: coordinate scale and the physical region table.
//!
//! The defaults reproduce the constants the converter has always used
//! (`[6, 17, 19]` / `["pot", "stamp", "melt"]`, millimetres to metres), so
//! running without a config file gives byte-identical output.
//!
//! ```toml
//! scale = 1e-3
//!
//! [regions]
//! elem_regions = [6, 17, 19]
//! names = ["pot", "stamp", "melt"]
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};

/// Millimetres to metres.
pub const DEFAULT_SCALE: f64 = 1.0e-3;

static DEFAULT_REGIONS: Lazy<RegionTable> = Lazy::new(|| RegionTable {
    elem_regions: vec![6, 17, 19],
    names: vec!["pot".to_string(), "stamp".to_string(), "melt".to_string()],
});

/// Maps an element attribute (1-based) to a numeric region tag and a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    pub elem_regions: Vec<i64>,
    pub names: Vec<String>,
}

impl Default for RegionTable {
    fn default() -> Self {
        DEFAULT_REGIONS.clone()
    }
}

impl RegionTable {
    pub fn new(elem_regions: Vec<i64>, names: Vec<String>) -> Self {
        RegionTable { elem_regions, names }
    }

    /// Region tag for a 1-based attribute, `None` when out of range.
    pub fn region_for(&self, attribute: i64) -> Option<i64> {
        if attribute < 1 {
            return None;
        }
        self.elem_regions.get((attribute - 1) as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.elem_regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elem_regions.is_empty()
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if self.is_empty() {
            return Err(ConvertError::Config("region table has no entries".to_string()));
        }
        if self.elem_regions.len() != self.names.len() {
            return Err(ConvertError::Config(format!(
                "region table has {} tags but {} names",
                self.elem_regions.len(),
                self.names.len()
            )));
        }
        if let Some(name) = self.names.iter().find(|n| n.contains('"')) {
            return Err(ConvertError::Config(format!(
                "region name {:?} contains a double quote",
                name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Uniform factor applied to every coordinate on read.
    pub scale: f64,
    pub regions: RegionTable,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            scale: DEFAULT_SCALE,
            regions: RegionTable::default(),
        }
    }
}

impl ConversionConfig {
    pub fn from_toml_str(text: &str) -> ConvertResult<Self> {
        let config: ConversionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn validate(&self) -> ConvertResult<()> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(ConvertError::Config(format!(
                "scale must be finite and non-zero, got {}",
                self.scale
            )));
        }
        self.regions.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_historical_constants() {
        let config = ConversionConfig::default();
        assert_eq!(config.scale, 1.0e-3);
        assert_eq!(config.regions.elem_regions, vec![6, 17, 19]);
        assert_eq!(config.regions.names, vec!["pot", "stamp", "melt"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_region_lookup_is_one_based() {
        let table = RegionTable::default();
        assert_eq!(table.region_for(1), Some(6));
        assert_eq!(table.region_for(3), Some(19));
        assert_eq!(table.region_for(0), None);
        assert_eq!(table.region_for(4), None);
        assert_eq!(table.region_for(-2), None);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = ConversionConfig::from_toml_str(
            r#"
            scale = 2.5

            [regions]
            elem_regions = [1, 2]
            names = ["inner", "outer"]
            "#,
        )
        .unwrap();
        assert_eq!(config.scale, 2.5);
        assert_eq!(config.regions.region_for(2), Some(2));
        assert_eq!(config.regions.names[0], "inner");
    }

    #[test]
    fn test_partial_toml_keeps_default_regions() {
        let config = ConversionConfig::from_toml_str("scale = 1.0").unwrap();
        assert_eq!(config.regions, RegionTable::default());
    }

    #[test]
    fn test_mismatched_region_table_rejected() {
        let err = ConversionConfig::from_toml_str(
            r#"
            [regions]
            elem_regions = [1, 2, 3]
            names = ["a"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_empty_region_table_rejected() {
        let err = ConversionConfig::from_toml_str(
            r#"
            [regions]
            elem_regions = []
            names = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
        assert!(!RegionTable::default().is_empty());
    }

    #[test]
    fn test_zero_scale_rejected() {
        let config = ConversionConfig::default().with_scale(0.0);
        assert!(config.validate().is_err());
    }
}
