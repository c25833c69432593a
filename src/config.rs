//! Engine configuration.
//!
//! Everything the engine needs at construction: atlas geometry, viewport
//! size, the master seed and the noise layer stack for each meta property.
//! Configs load from JSON; missing fields fall back to defaults.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlas::AtlasLayout;
use crate::meta::grid::PropertyLayer;
use crate::meta::{MetaProperty, UnknownName};
use crate::noise_field::{LayeredNoise, NoiseField};
use crate::seeds::WorldSeeds;

/// One noise field of a property layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Cells per noise period; larger is smoother
    pub scale: f64,
    pub amplitude: f64,
    /// Sub-cell offsets keep samples off the Perlin lattice
    pub offset_x: f64,
    pub offset_y: f64,
    pub octaves: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            scale: 8.3,
            amplitude: 1.0,
            offset_x: 0.37,
            offset_y: 0.61,
            octaves: 1,
        }
    }
}

impl FieldConfig {
    fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

/// Noise stack deciding one property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub property: MetaProperty,
    /// Summed noise at or above this sets the property
    pub threshold: f64,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl LayerConfig {
    pub fn new(property: MetaProperty, threshold: f64, fields: Vec<FieldConfig>) -> Self {
        Self {
            property,
            threshold,
            fields,
        }
    }

    fn single(property: MetaProperty, scale: f64, threshold: f64) -> Self {
        Self::new(property, threshold, vec![FieldConfig::with_scale(scale)])
    }
}

/// Default noise layers for every property.
pub fn default_layers() -> Vec<LayerConfig> {
    use MetaProperty::*;

    vec![
        LayerConfig::new(
            Grass,
            -0.15,
            vec![
                FieldConfig::with_scale(23.7),
                FieldConfig {
                    scale: 5.9,
                    amplitude: 0.3,
                    ..FieldConfig::default()
                },
            ],
        ),
        LayerConfig::single(Bush, 4.3, 0.25),
        LayerConfig::single(Tree, 5.1, 0.3),
        LayerConfig::single(Flowers, 3.7, 0.3),
        LayerConfig::single(PlantMature, 6.1, 0.0),
        LayerConfig::single(Harvested, 5.3, 0.35),
        LayerConfig::new(
            Rocks,
            0.3,
            vec![FieldConfig {
                scale: 17.9,
                octaves: 3,
                ..FieldConfig::default()
            }],
        ),
        LayerConfig::single(OreDeposit, 3.3, 0.1),
        LayerConfig::single(Water, 31.3, 0.4),
        LayerConfig::single(Sand, 29.9, 0.25),
        LayerConfig::single(Floor, 13.1, 0.45),
        LayerConfig::single(Beam, 11.3, 0.5),
        LayerConfig::single(Bricks, 9.7, 0.45),
        LayerConfig::single(Drywall, 7.9, 0.2),
    ]
}

/// Engine construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tile edge in pixels (power of two)
    pub tile_px: u32,
    /// Atlas edge in pixels (power of two)
    pub atlas_px: u32,
    /// Visible window in cells
    pub view_width: usize,
    pub view_height: usize,
    /// Initial window anchor
    pub start_x: i64,
    pub start_y: i64,
    /// Master seed for every property's noise
    pub seed: u64,
    pub layers: Vec<LayerConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_px: 16,
            atlas_px: 1024,
            view_width: 40,
            view_height: 24,
            start_x: 0,
            start_y: 0,
            seed: 0,
            layers: default_layers(),
        }
    }
}

impl EngineConfig {
    /// Default config with a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Config without noise layers: every cell starts empty.
    pub fn blank() -> Self {
        Self {
            layers: Vec::new(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "loaded config {} ({} layers, seed {})",
            path.display(),
            config.layers.len(),
            config.seed
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Drop every layer for the named property.
    pub fn without_property(mut self, name: &str) -> Result<Self, ConfigError> {
        let property = MetaProperty::from_name(name)?;
        self.layers.retain(|layer| layer.property != property);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_px.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "tile_px",
                value: self.tile_px,
            });
        }
        if !self.atlas_px.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "atlas_px",
                value: self.atlas_px,
            });
        }
        if self.tile_px > self.atlas_px {
            return Err(ConfigError::TileLargerThanAtlas {
                tile_px: self.tile_px,
                atlas_px: self.atlas_px,
            });
        }
        if self.view_width == 0 || self.view_height == 0 {
            return Err(ConfigError::EmptyView {
                width: self.view_width,
                height: self.view_height,
            });
        }
        Ok(())
    }

    pub fn layout(&self) -> AtlasLayout {
        AtlasLayout::new(self.tile_px, self.atlas_px)
    }

    pub fn seeds(&self) -> WorldSeeds {
        WorldSeeds::from_master(self.seed)
    }

    /// Instantiate the noise stacks.
    pub fn build_layers(&self) -> Vec<PropertyLayer> {
        let seeds = self.seeds();
        self.layers
            .iter()
            .map(|layer| {
                let fields = layer
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| {
                        NoiseField::new(
                            seeds.field_seed(layer.property, i),
                            field.scale,
                            (field.offset_x, field.offset_y),
                            field.amplitude,
                        )
                        .with_octaves(field.octaves)
                    })
                    .collect();
                PropertyLayer::new(layer.property, LayeredNoise::new(fields), layer.threshold)
            })
            .collect()
    }
}

/// Errors that can occur while building an engine from configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Tile or atlas size is not a power of two
    NotPowerOfTwo { field: &'static str, value: u32 },
    /// A single tile would not fit the atlas
    TileLargerThanAtlas { tile_px: u32, atlas_px: u32 },
    /// Viewport with no cells
    EmptyView { width: usize, height: usize },
    /// Name outside a vocabulary
    UnknownName(UnknownName),
    /// IO error (file not found, permissions, etc.)
    Io(std::io::Error),
    /// Malformed JSON or unknown property in a layer
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPowerOfTwo { field, value } => {
                write!(f, "{} must be a power of two, got {}", field, value)
            }
            ConfigError::TileLargerThanAtlas { tile_px, atlas_px } => write!(
                f,
                "tile size {}px does not fit atlas size {}px",
                tile_px, atlas_px
            ),
            ConfigError::EmptyView { width, height } => {
                write!(f, "viewport must have cells, got {}x{}", width, height)
            }
            ConfigError::UnknownName(e) => write!(f, "{}", e),
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::UnknownName(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<UnknownName> for ConfigError {
    fn from(e: UnknownName) -> Self {
        ConfigError::UnknownName(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.layout().capacity(), 64 * 64);
        assert_eq!(config.build_layers().len(), MetaProperty::ALL.len());
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = EngineConfig {
            tile_px: 12,
            ..EngineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotPowerOfTwo { field: "tile_px", value: 12 }));
        assert!(err.to_string().contains("power of two"));

        let config = EngineConfig {
            atlas_px: 1000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo { field: "atlas_px", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let config = EngineConfig {
            tile_px: 64,
            atlas_px: 32,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TileLargerThanAtlas { .. })));

        let config = EngineConfig {
            view_height: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyView { .. })));
    }

    #[test]
    fn test_json_partial_and_unknown_property() {
        let config = EngineConfig::from_json_str(
            r#"{ "seed": 7, "layers": [ { "property": "grass", "threshold": 0.1 } ] }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.tile_px, 16);
        assert_eq!(config.layers.len(), 1);
        assert!(config.layers[0].fields.is_empty());

        let err = EngineConfig::from_json_str(
            r#"{ "layers": [ { "property": "lava", "threshold": 0.1 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("lava"));

        let err = EngineConfig::from_json_str(r#"{ "atlas_px": 100 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPowerOfTwo { .. }));
    }

    #[test]
    fn test_load_from_file_round_trip() {
        let config = EngineConfig::with_seed(99);
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_json().unwrap().as_bytes()).unwrap();

        let loaded = EngineConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);

        let missing = EngineConfig::load(Path::new("/nonexistent/tileworld.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_without_property() {
        let config = EngineConfig::default().without_property("water").unwrap();
        assert!(config.layers.iter().all(|l| l.property != MetaProperty::Water));

        let err = EngineConfig::default().without_property("magma").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownName(_)));
    }
}
