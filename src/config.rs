use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Terrain pipeline parameters. Immutable input to `generate_terrain`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: usize,
    pub height: usize,
    /// Fraction of the map that ends up below sea level, in (0, 1).
    pub sea_level: f32,
    pub num_plates: u32,
    pub fbm_octaves: u32,
    /// Strength of ridged noise along plate boundaries.
    pub mountain_scale: f32,
    pub erosion_iterations: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            sea_level: 0.40,
            num_plates: 8,
            fbm_octaves: 7,
            mountain_scale: 0.3,
            erosion_iterations: 50,
        }
    }
}

/// Climate model parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub sea_level: f32,
    /// Degrees. Carried for seasonal models; the annual-mean model ignores it.
    pub axial_tilt: f32,
    /// Equatorial sea-level temperature, Celsius.
    pub base_temp: f32,
    /// Pole-to-equator temperature range.
    pub temp_range: f32,
    /// Temperature drop from shore to the highest peak.
    pub altitude_lapse: f32,
    pub ocean_moisture: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            sea_level: 0.40,
            axial_tilt: 23.5,
            base_temp: 15.0,
            temp_range: 70.0,
            altitude_lapse: 40.0,
            ocean_moisture: 0.9,
        }
    }
}

/// Everything `crate::generate` needs besides the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub terrain: TerrainConfig,
    pub climate: ClimateConfig,
    /// When non-zero, one draw of `[0, plate_jitter]` is added to `terrain.num_plates`.
    pub plate_jitter: u32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self::for_size(512)
    }
}

impl PlanetConfig {
    /// Square planet preset: 7-12 plates and `size * 100` erosion droplets.
    pub fn for_size(size: usize) -> Self {
        let terrain = TerrainConfig {
            width: size,
            height: size,
            num_plates: 7,
            erosion_iterations: u32::try_from(size.saturating_mul(100)).unwrap_or(u32::MAX),
            ..TerrainConfig::default()
        };
        let climate = ClimateConfig {
            sea_level: terrain.sea_level,
            ..ClimateConfig::default()
        };
        Self {
            terrain,
            climate,
            plate_jitter: 5,
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Range checks for caller-supplied configs. The pipeline itself assumes valid input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        if t.width < 3 || t.height < 3 {
            return Err(ConfigError::Invalid(format!(
                "map must be at least 3x3, got {}x{}",
                t.width, t.height
            )));
        }
        if u32::try_from(t.width).is_err() || u32::try_from(t.height).is_err() {
            return Err(ConfigError::Invalid("map dimensions exceed u32".into()));
        }
        if !(t.sea_level > 0.0 && t.sea_level < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "sea_level must be in (0, 1), got {}",
                t.sea_level
            )));
        }
        if t.num_plates == 0 {
            return Err(ConfigError::Invalid("num_plates must be at least 1".into()));
        }
        if t.fbm_octaves == 0 {
            return Err(ConfigError::Invalid("fbm_octaves must be at least 1".into()));
        }
        let c = &self.climate;
        if !(c.ocean_moisture >= 0.0 && c.ocean_moisture <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "ocean_moisture must be in [0, 1], got {}",
                c.ocean_moisture
            )));
        }
        Ok(())
    }
}
