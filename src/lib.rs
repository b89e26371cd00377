pub mod biome;
pub mod climate;
pub mod config;
pub mod distance;
pub mod erosion;
pub mod grid;
pub mod logging;
pub mod noise;
pub mod planet;
pub mod plates;
pub mod render;
pub mod rng;
pub mod terrain;

use std::time::Instant;

use serde::Serialize;
use tracing::info;

pub use biome::{Biome, classify_biome};
pub use climate::{generate_moisture, generate_temperature};
pub use config::{ClimateConfig, ConfigError, PlanetConfig, TerrainConfig};
pub use grid::{Grid, GridError};
pub use planet::{PlanetSurface, SurfaceStats};
pub use rng::RngStream;
pub use terrain::generate_terrain;

#[derive(Clone, Debug, Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

fn elapsed_ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

/// Run the whole planet pipeline for `seed`.
///
/// RNG draw order: plate-count jitter, terrain (plates, noise seeds, droplets),
/// temperature noise, moisture noise. Timings are reported per stage and never
/// feed back into the output.
pub fn generate(seed: u64, config: &PlanetConfig) -> (PlanetSurface, Vec<Timing>) {
    let mut timings = Vec::new();
    let total_start = Instant::now();
    let mut rng = RngStream::new(seed);

    let mut terrain_cfg = config.terrain.clone();
    if config.plate_jitter > 0 {
        let extra = rng.next_int(0, config.plate_jitter as i32);
        terrain_cfg.num_plates += extra as u32;
    }
    let mut climate_cfg = config.climate.clone();
    climate_cfg.sea_level = terrain_cfg.sea_level;

    info!(
        "generating planet (seed {}, {}x{}, {} plates)",
        seed, terrain_cfg.width, terrain_cfg.height, terrain_cfg.num_plates
    );

    // 1. Terrain
    let t = Instant::now();
    let elevation = generate_terrain(&terrain_cfg, &mut rng);
    timings.push(Timing {
        name: "terrain",
        ms: elapsed_ms(t),
    });

    // 2. Temperature
    let t = Instant::now();
    let temperature = generate_temperature(&elevation, &climate_cfg, &mut rng);
    timings.push(Timing {
        name: "temperature",
        ms: elapsed_ms(t),
    });

    // 3. Moisture
    let t = Instant::now();
    let moisture = generate_moisture(&elevation, &temperature, &climate_cfg, &mut rng);
    timings.push(Timing {
        name: "moisture",
        ms: elapsed_ms(t),
    });

    // 4. Biomes
    let t = Instant::now();
    let biome = Grid::new(elevation.w, elevation.h);
    let mut surface = PlanetSurface {
        elevation,
        temperature,
        moisture,
        biome,
        sea_level: terrain_cfg.sea_level,
    };
    surface.classify_biomes();
    timings.push(Timing {
        name: "biomes",
        ms: elapsed_ms(t),
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: elapsed_ms(total_start),
    });

    let stats = surface.stats();
    info!(
        "planet complete: land {:.1}%, avg temperature {:.1}C, avg moisture {:.2}",
        stats.land_fraction * 100.0,
        stats.avg_temperature,
        stats.avg_moisture
    );

    (surface, timings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> PlanetConfig {
        let mut cfg = PlanetConfig::for_size(32);
        cfg.terrain.erosion_iterations = 200;
        cfg
    }

    #[test]
    fn timings_cover_every_stage() {
        let (_, timings) = generate(1, &tiny());
        let names: Vec<_> = timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["terrain", "temperature", "moisture", "biomes", "TOTAL"]);
        assert!(timings.iter().all(|t| t.ms >= 0.0));
    }

    #[test]
    fn climate_sea_level_follows_terrain() {
        let mut cfg = tiny();
        cfg.terrain.sea_level = 0.6;
        cfg.climate.sea_level = 0.1;
        let (surface, _) = generate(5, &cfg);
        assert_eq!(surface.sea_level, 0.6);
        // Ocean cells carry the fixed ocean moisture, so the climate stage saw 0.6 too
        for (e, m) in surface.elevation.data.iter().zip(&surface.moisture.data) {
            if *e < 0.6 {
                assert_eq!(*m, cfg.climate.ocean_moisture);
            }
        }
    }

    #[test]
    fn jitter_changes_plate_draws() {
        let mut no_jitter = tiny();
        no_jitter.plate_jitter = 0;
        let (a, _) = generate(11, &no_jitter);
        let (b, _) = generate(11, &tiny());
        assert_ne!(a.elevation, b.elevation);
    }
}
