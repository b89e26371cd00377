use tracing::{debug, info};

use crate::config::TerrainConfig;
use crate::erosion::{self, DropletParams};
use crate::grid::Grid;
use crate::noise::PerlinNoise;
use crate::plates::PlateField;
use crate::rng::RngStream;

/// Continental fBm: ~4 cycles across the map, configured octave count.
const CONTINENT_FREQ: f64 = 4.0;
const CONTINENT_PERSISTENCE: f64 = 0.55;
const CONTINENT_AMP: f32 = 0.35;
/// Detail fBm: ~12 cycles, 4 octaves.
const DETAIL_FREQ: f64 = 12.0;
const DETAIL_OCTAVES: u32 = 4;
const DETAIL_AMP: f32 = 0.08;
/// Ridged noise at plate boundaries: ~8 cycles, 5 octaves.
const RIDGE_FREQ: f64 = 8.0;
const RIDGE_OCTAVES: u32 = 5;
const RIDGE_PERSISTENCE: f64 = 0.6;
const SEAM_BLUR_RADIUS: usize = 2;

/// Five-stage elevation pipeline:
///   1. plates: Voronoi partition, oceanic/continental base heights
///   2. continental + detail fBm
///   3. ridged noise along plate boundaries, then a seam blur
///   4. particle hydraulic erosion
///   5. normalise and remap so exactly `sea_level` of the cells sit below sea level
///
/// Every stage draws from the same `RngStream` in this order.
pub struct TerrainPipeline<'a> {
    config: &'a TerrainConfig,
    droplet: DropletParams,
}

impl<'a> TerrainPipeline<'a> {
    pub fn new(config: &'a TerrainConfig) -> Self {
        Self {
            config,
            droplet: DropletParams::default(),
        }
    }

    pub fn run(&self, rng: &mut RngStream) -> Grid<f32> {
        let c = self.config;
        info!("generating terrain ({}x{})", c.width, c.height);

        info!("stage 1: tectonic plates ({} plates)", c.num_plates);
        let plates = PlateField::generate(c.width, c.height, c.num_plates, rng);
        debug!(
            "{} oceanic / {} continental plates",
            plates.oceanic_count(),
            plates.plates.len() - plates.oceanic_count()
        );
        let mut elevation = plates.base_elevation();

        info!("stage 2: continental noise ({} octaves)", c.fbm_octaves);
        self.continental_noise(&mut elevation, rng);

        info!("stage 3: mountain ridges");
        self.mountain_ridges(&mut elevation, &plates, rng);
        drop(plates);

        info!("stage 4: hydraulic erosion ({} droplets)", c.erosion_iterations);
        erosion::erode(&mut elevation, c.erosion_iterations, &self.droplet, rng);

        info!("stage 5: normalisation and sea level");
        elevation.normalise();
        let threshold = sea_level_threshold(&elevation, c.sea_level);
        debug!("sea level threshold {:.4}", threshold);
        remap_sea_level(&mut elevation, threshold, c.sea_level);

        info!(
            "terrain complete, elevation range [{:.3}, {:.3}]",
            elevation.min(),
            elevation.max()
        );
        elevation
    }

    fn continental_noise(&self, elevation: &mut Grid<f32>, rng: &mut RngStream) {
        let continents = PerlinNoise::new(rng.next_u64());
        let detail = PerlinNoise::new(rng.next_u64());
        let (w, h) = (elevation.w, elevation.h);
        let octaves = self.config.fbm_octaves;

        for y in 0..h {
            let ny = y as f64 / h as f64;
            for x in 0..w {
                let nx = x as f64 / w as f64;
                let continent = continents.fbm(
                    nx * CONTINENT_FREQ,
                    ny * CONTINENT_FREQ,
                    octaves,
                    1.0,
                    CONTINENT_PERSISTENCE,
                    2.0,
                );
                let fine = detail.fbm(nx * DETAIL_FREQ, ny * DETAIL_FREQ, DETAIL_OCTAVES, 1.0, 0.5, 2.0);
                *elevation.at_mut(x, y) += continent as f32 * CONTINENT_AMP + fine as f32 * DETAIL_AMP;
            }
        }
    }

    fn mountain_ridges(&self, elevation: &mut Grid<f32>, plates: &PlateField, rng: &mut RngStream) {
        let ridges = PerlinNoise::new(rng.next_u64());
        let boundary = plates.boundaries();
        let (w, h) = (elevation.w, elevation.h);

        for y in 0..h {
            let ny = y as f64 / h as f64;
            for x in 0..w {
                if !boundary.get(x, y) {
                    continue;
                }
                let nx = x as f64 / w as f64;
                let ridge = ridges.ridged(
                    nx * RIDGE_FREQ,
                    ny * RIDGE_FREQ,
                    RIDGE_OCTAVES,
                    1.0,
                    RIDGE_PERSISTENCE,
                    2.0,
                );
                *elevation.at_mut(x, y) += ridge as f32 * self.config.mountain_scale;
            }
        }

        elevation.blur(SEAM_BLUR_RADIUS);
    }
}

/// Elevation of the cell at rank `floor(sea_level * N)` of the sorted field.
pub fn sea_level_threshold(elevation: &Grid<f32>, sea_level: f32) -> f32 {
    if elevation.is_empty() {
        return 0.0;
    }
    let mut sorted = elevation.data.clone();
    sorted.sort_by(f32::total_cmp);
    let rank = (sea_level * sorted.len() as f32) as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Largest f32 strictly below a positive `x`.
#[inline]
fn just_below(x: f32) -> f32 {
    f32::from_bits(x.to_bits() - 1)
}

/// Piecewise-linear remap sending `threshold` to `sea_level`:
/// `[0, threshold)` onto `[0, sea_level)` and `(threshold, 1]` onto `(sea_level, 1]`.
///
/// Only cells equal to `threshold` land exactly on `sea_level`; everything
/// below it stays strictly below, whatever the rounding.
pub fn remap_sea_level(elevation: &mut Grid<f32>, threshold: f32, sea_level: f32) {
    for v in &mut elevation.data {
        *v = if *v < threshold {
            if threshold > 0.0 && sea_level > 0.0 {
                let scaled = ((*v as f64 / threshold as f64) * sea_level as f64) as f32;
                scaled.min(just_below(sea_level))
            } else {
                0.0
            }
        } else if *v == threshold {
            if threshold > 0.0 { sea_level } else { 0.0 }
        } else {
            sea_level + (*v - threshold) / (1.0 - threshold) * (1.0 - sea_level)
        };
    }
}

/// Run the full terrain pipeline and return the elevation grid, in `[0, 1]`.
pub fn generate_terrain(config: &TerrainConfig, rng: &mut RngStream) -> Grid<f32> {
    TerrainPipeline::new(config).run(rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(w: usize, h: usize) -> TerrainConfig {
        TerrainConfig {
            width: w,
            height: h,
            erosion_iterations: 100,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn produces_unit_range_grid() {
        let cfg = small(64, 64);
        let elevation = generate_terrain(&cfg, &mut RngStream::new(42));
        assert_eq!((elevation.w, elevation.h), (64, 64));
        assert!(elevation.min() >= 0.0);
        assert!(elevation.max() <= 1.0);
    }

    #[test]
    fn deterministic_for_seed() {
        let cfg = small(32, 32);
        let a = generate_terrain(&cfg, &mut RngStream::new(42));
        let b = generate_terrain(&cfg, &mut RngStream::new(42));
        assert_eq!(a, b);
        let c = generate_terrain(&cfg, &mut RngStream::new(43));
        assert_ne!(a, c);
    }

    #[test]
    fn threshold_picks_rank() {
        let mut g = Grid::<f32>::new(10, 1);
        for (i, v) in g.data.iter_mut().enumerate() {
            *v = (9 - i) as f32 / 9.0;
        }
        assert_eq!(sea_level_threshold(&g, 0.4), 4.0 / 9.0);
        assert_eq!(sea_level_threshold(&g, 0.0), 0.0);
        assert_eq!(sea_level_threshold(&g, 0.999), 1.0);
    }

    #[test]
    fn remap_hits_exact_fraction() {
        let mut g = Grid::<f32>::new(100, 1);
        for (i, v) in g.data.iter_mut().enumerate() {
            // Skewed distribution: most mass near 1
            *v = ((i as f32) / 99.0).sqrt();
        }
        let t = sea_level_threshold(&g, 0.3);
        remap_sea_level(&mut g, t, 0.3);
        let below = g.data.iter().filter(|&&v| v < 0.3).count();
        assert_eq!(below, 30);
        assert!(g.min() >= 0.0 && g.max() <= 1.0);
        assert_eq!(g.max(), 1.0);
    }

    #[test]
    fn cells_an_ulp_below_threshold_stay_under_water() {
        let sea_level = 0.7f32;
        let threshold = 0.7f32;
        let one_down = f32::from_bits(threshold.to_bits() - 1);
        let two_down = f32::from_bits(threshold.to_bits() - 2);
        let mut g = Grid::<f32>::new(6, 1);
        g.data = vec![0.1, two_down, one_down, threshold, 0.9, 1.0];
        remap_sea_level(&mut g, threshold, sea_level);

        assert!(g.data[..3].iter().all(|&v| v < sea_level));
        assert_eq!(g.data[3], sea_level);
        assert!(g.data[4..].iter().all(|&v| v > sea_level));
        assert_eq!(g.data.iter().filter(|&&v| v < sea_level).count(), 3);
    }

    #[test]
    fn ocean_fraction_is_exact_on_generated_terrain() {
        let cfg = TerrainConfig {
            sea_level: 0.7,
            ..small(50, 50)
        };
        let elevation = generate_terrain(&cfg, &mut RngStream::new(99));
        let threshold_rank = (0.7f32 * 2500.0) as usize;
        let below = elevation.data.iter().filter(|&&v| v < 0.7).count();
        assert!(below.abs_diff(threshold_rank) <= 1, "{below} cells below, rank {threshold_rank}");
    }

    #[test]
    fn remap_handles_zero_threshold() {
        let mut g = Grid::<f32>::new(4, 1);
        g.data = vec![0.0, 0.0, 0.5, 1.0];
        remap_sea_level(&mut g, 0.0, 0.4);
        assert_eq!(g.data[0], 0.0);
        assert_eq!(g.data[1], 0.0);
        assert!((g.data[2] - 0.7).abs() < 1e-6);
        assert_eq!(g.data[3], 1.0);
    }
}
