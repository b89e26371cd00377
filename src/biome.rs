use serde::{Deserialize, Serialize};

use crate::climate::land_height;

/// Biome tag. Discriminants index [`BIOME_INFO`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    #[default]
    Ocean = 0,
    DeepOcean,
    Ice,
    Tundra,
    BorealForest,
    TemperateGrassland,
    TemperateForest,
    TemperateRainforest,
    Shrubland,
    Desert,
    Savanna,
    TropicalForest,
    TropicalRainforest,
    Wetland,
    Mountain,
    Beach,
}

pub struct BiomeInfo {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

pub const BIOME_COUNT: usize = 16;

/// Display metadata, indexed by `Biome as usize`.
pub const BIOME_INFO: [BiomeInfo; BIOME_COUNT] = [
    BiomeInfo { name: "Ocean", rgb: [28, 107, 160] },
    BiomeInfo { name: "Deep Ocean", rgb: [15, 60, 110] },
    BiomeInfo { name: "Ice", rgb: [220, 235, 245] },
    BiomeInfo { name: "Tundra", rgb: [180, 200, 190] },
    BiomeInfo { name: "Boreal Forest", rgb: [40, 100, 60] },
    BiomeInfo { name: "Temperate Grassland", rgb: [140, 175, 80] },
    BiomeInfo { name: "Temperate Forest", rgb: [50, 130, 50] },
    BiomeInfo { name: "Temperate Rainforest", rgb: [30, 100, 80] },
    BiomeInfo { name: "Shrubland", rgb: [165, 155, 95] },
    BiomeInfo { name: "Desert", rgb: [210, 190, 140] },
    BiomeInfo { name: "Savanna", rgb: [185, 175, 95] },
    BiomeInfo { name: "Tropical Forest", rgb: [35, 120, 45] },
    BiomeInfo { name: "Tropical Rainforest", rgb: [20, 90, 35] },
    BiomeInfo { name: "Wetland", rgb: [80, 130, 110] },
    BiomeInfo { name: "Mountain", rgb: [140, 140, 145] },
    BiomeInfo { name: "Beach", rgb: [220, 210, 165] },
];

impl Biome {
    pub const ALL: [Biome; BIOME_COUNT] = [
        Biome::Ocean,
        Biome::DeepOcean,
        Biome::Ice,
        Biome::Tundra,
        Biome::BorealForest,
        Biome::TemperateGrassland,
        Biome::TemperateForest,
        Biome::TemperateRainforest,
        Biome::Shrubland,
        Biome::Desert,
        Biome::Savanna,
        Biome::TropicalForest,
        Biome::TropicalRainforest,
        Biome::Wetland,
        Biome::Mountain,
        Biome::Beach,
    ];

    pub fn info(self) -> &'static BiomeInfo {
        &BIOME_INFO[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn rgb(self) -> [u8; 3] {
        self.info().rgb
    }

    pub fn is_water(self) -> bool {
        matches!(self, Biome::Ocean | Biome::DeepOcean)
    }
}

// Water bands, relative to sea level
const DEEP_OCEAN_DEPTH: f32 = 0.05;
const SEA_ICE_TEMP: f32 = -10.0;
// Normalised land height bands
const BEACH_HEIGHT: f32 = 0.02;
const MOUNTAIN_HEIGHT: f32 = 0.7;
const COLD_MOUNTAIN_HEIGHT: f32 = 0.5;
const COLD_MOUNTAIN_TEMP: f32 = 0.0;
const WETLAND_HEIGHT: f32 = 0.1;
const WETLAND_MOISTURE: f32 = 0.85;

/// Classify a cell. First matching rule wins:
/// water bands, beach, mountain, then a Whittaker temperature/moisture lattice.
///
/// `elevation` is in `[0, 1]`, `temperature` in approximate Celsius and
/// `moisture` in `[0, 1]`.
pub fn classify_biome(elevation: f32, temperature: f32, moisture: f32, sea_level: f32) -> Biome {
    // Water
    if elevation < sea_level {
        if temperature < SEA_ICE_TEMP {
            return Biome::Ice;
        }
        if elevation < sea_level - DEEP_OCEAN_DEPTH {
            return Biome::DeepOcean;
        }
        return Biome::Ocean;
    }

    let land = land_height(elevation, sea_level);

    if land < BEACH_HEIGHT {
        return Biome::Beach;
    }
    if land > MOUNTAIN_HEIGHT || (land > COLD_MOUNTAIN_HEIGHT && temperature < COLD_MOUNTAIN_TEMP) {
        return Biome::Mountain;
    }

    // Frozen
    if temperature < -10.0 {
        return Biome::Ice;
    }
    if temperature < 0.0 {
        return Biome::Tundra;
    }

    // Cool
    if temperature < 10.0 {
        if moisture > 0.5 {
            return Biome::BorealForest;
        }
        return Biome::Tundra;
    }

    // Low, saturated ground floods in any warm band
    if moisture > WETLAND_MOISTURE && land < WETLAND_HEIGHT {
        return Biome::Wetland;
    }

    // Temperate
    if temperature < 20.0 {
        return match moisture {
            m if m > 0.7 => Biome::TemperateRainforest,
            m if m > 0.4 => Biome::TemperateForest,
            m if m > 0.2 => Biome::Shrubland,
            _ => Biome::TemperateGrassland,
        };
    }

    // Warm
    if temperature < 30.0 {
        return match moisture {
            m if m > 0.65 => Biome::TropicalRainforest,
            m if m > 0.35 => Biome::TropicalForest,
            m if m > 0.15 => Biome::Savanna,
            _ => Biome::Desert,
        };
    }

    // Hot
    match moisture {
        m if m > 0.6 => Biome::TropicalRainforest,
        m if m > 0.3 => Biome::Savanna,
        _ => Biome::Desert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_cells() {
        assert_eq!(classify_biome(0.2, 15.0, 0.5, 0.4), Biome::DeepOcean);
        assert_eq!(classify_biome(0.6, 35.0, 0.1, 0.4), Biome::Desert);
        assert_eq!(classify_biome(0.55, 28.0, 0.8, 0.4), Biome::TropicalRainforest);
        assert_eq!(classify_biome(0.9, 5.0, 0.3, 0.4), Biome::Mountain);
    }

    #[test]
    fn water_bands() {
        assert_eq!(classify_biome(0.38, 15.0, 0.9, 0.4), Biome::Ocean);
        assert_eq!(classify_biome(0.1, -20.0, 0.9, 0.4), Biome::Ice);
        assert_eq!(classify_biome(0.39, -15.0, 0.9, 0.4), Biome::Ice);
    }

    #[test]
    fn shoreline_and_peaks() {
        assert_eq!(classify_biome(0.405, 20.0, 0.5, 0.4), Biome::Beach);
        assert_eq!(classify_biome(0.4, 20.0, 0.5, 0.4), Biome::Beach);
        // Cold lowers the mountain line
        assert_eq!(classify_biome(0.75, -2.0, 0.3, 0.4), Biome::Mountain);
        assert_eq!(classify_biome(0.75, 12.0, 0.3, 0.4), Biome::Shrubland);
    }

    #[test]
    fn whittaker_lattice() {
        assert_eq!(classify_biome(0.5, -5.0, 0.3, 0.4), Biome::Tundra);
        assert_eq!(classify_biome(0.5, -15.0, 0.3, 0.4), Biome::Ice);
        assert_eq!(classify_biome(0.5, 5.0, 0.6, 0.4), Biome::BorealForest);
        assert_eq!(classify_biome(0.5, 15.0, 0.1, 0.4), Biome::TemperateGrassland);
        assert_eq!(classify_biome(0.5, 15.0, 0.5, 0.4), Biome::TemperateForest);
        assert_eq!(classify_biome(0.5, 15.0, 0.8, 0.4), Biome::TemperateRainforest);
        assert_eq!(classify_biome(0.5, 25.0, 0.1, 0.4), Biome::Desert);
        assert_eq!(classify_biome(0.5, 25.0, 0.2, 0.4), Biome::Savanna);
        assert_eq!(classify_biome(0.5, 25.0, 0.5, 0.4), Biome::TropicalForest);
        assert_eq!(classify_biome(0.5, 35.0, 0.4, 0.4), Biome::Savanna);
        assert_eq!(classify_biome(0.42, 25.0, 0.95, 0.4), Biome::Wetland);
    }

    #[test]
    fn table_lines_up_with_enum() {
        for (i, b) in Biome::ALL.iter().enumerate() {
            assert_eq!(*b as usize, i);
        }
        assert_eq!(Biome::DeepOcean.name(), "Deep Ocean");
        assert_eq!(Biome::Beach.rgb(), [220, 210, 165]);
        assert!(Biome::Ocean.is_water());
        assert!(!Biome::Ice.is_water());
    }
}
