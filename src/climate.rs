use tracing::info;

use crate::config::ClimateConfig;
use crate::distance::OceanDistanceField;
use crate::grid::Grid;
use crate::noise::PerlinNoise;
use crate::rng::RngStream;

/// Share of the latitude temperature kept over ocean; the rest pulls toward `base_temp`.
const OCEAN_LATITUDE_WEIGHT: f32 = 0.7;
const TEMP_NOISE_FREQ: f64 = 6.0;
const TEMP_NOISE_AMP: f32 = 5.0;
const MOISTURE_NOISE_FREQ: f64 = 5.0;
const MOISTURE_NOISE_AMP: f32 = 0.15;

/// 0 at the equator (middle row), 1 at the top and bottom rows.
#[inline]
pub fn latitude(y: usize, h: usize) -> f32 {
    (2.0 * y as f32 / h as f32 - 1.0).abs()
}

/// Normalised height above the shore: 0 at sea level, 1 at the highest possible peak.
#[inline]
pub fn land_height(elevation: f32, sea_level: f32) -> f32 {
    (elevation - sea_level) / (1.0 - sea_level)
}

/// Annual-mean temperature in approximate Celsius.
/// - quadratic falloff from `base_temp` at the equator, `temp_range / 2` lower at the poles
/// - land cools linearly with height (`altitude_lapse` at the highest peak)
/// - ocean is moderated toward `base_temp`
/// - small fBm layer for local variation
pub fn generate_temperature(elevation: &Grid<f32>, config: &ClimateConfig, rng: &mut RngStream) -> Grid<f32> {
    info!("generating temperature map");
    let w = elevation.w;
    let h = elevation.h;
    let mut temp = Grid::<f32>::new(w, h);
    let noise = PerlinNoise::new(rng.next_u64());

    for y in 0..h {
        let lat = latitude(y, h);
        let lat_temp = config.base_temp - config.temp_range * 0.5 * (lat * lat);
        let ny = y as f64 / h as f64;

        for x in 0..w {
            let elev = elevation.get(x, y);
            let mut t = lat_temp;

            if elev > config.sea_level {
                t -= land_height(elev, config.sea_level) * config.altitude_lapse;
            }
            if elev < config.sea_level {
                t = t * OCEAN_LATITUDE_WEIGHT + config.base_temp * (1.0 - OCEAN_LATITUDE_WEIGHT);
            }

            let nx = x as f64 / w as f64;
            t += noise.fbm(nx * TEMP_NOISE_FREQ, ny * TEMP_NOISE_FREQ, 3, 1.0, 0.5, 2.0) as f32 * TEMP_NOISE_AMP;
            temp.set(x, y, t);
        }
    }

    info!("temperature range {:.1}C to {:.1}C", temp.min(), temp.max());
    temp
}

/// Moisture in `[0, 1]`. Ocean cells get `ocean_moisture`; land combines ocean
/// proximity, an equatorial convergence band, mid-latitude storm tracks, a
/// rain-shadow penalty on high ground and a little fBm.
///
/// `temperature` is not read by the current model; it is part of the stage
/// signature so evaporation-aware models can slot in without an API change.
pub fn generate_moisture(
    elevation: &Grid<f32>,
    temperature: &Grid<f32>,
    config: &ClimateConfig,
    rng: &mut RngStream,
) -> Grid<f32> {
    info!("generating moisture map");
    debug_assert!(elevation.same_size(temperature));
    let w = elevation.w;
    let h = elevation.h;

    let distance = OceanDistanceField::compute(elevation, config.sea_level);
    let noise = PerlinNoise::new(rng.next_u64());
    let mut moisture = Grid::<f32>::new(w, h);
    let max_dist = ((w * w + h * h) as f32).sqrt() * 0.5;

    for y in 0..h {
        let lat = latitude(y, h);
        let tropical = (-lat * lat * 8.0).exp() * 0.3;
        let temperate = (-(lat - 0.5) * (lat - 0.5) * 20.0).exp() * 0.15;
        let ny = y as f64 / h as f64;

        for x in 0..w {
            let elev = elevation.get(x, y);
            if elev < config.sea_level {
                moisture.set(x, y, config.ocean_moisture);
                continue;
            }

            // Unreached cells (a world without ocean) count as maximally inland
            let dist = distance.get(x, y).map_or(max_dist, |d| d as f32);
            let ocean_factor = (1.0 - (dist / max_dist).clamp(0.0, 1.0)).powf(0.4);
            let rain_shadow = 1.0 - land_height(elev, config.sea_level) * 0.5;

            let mut m = (ocean_factor * 0.5 + tropical + temperate) * rain_shadow;
            let nx = x as f64 / w as f64;
            m += noise.fbm(nx * MOISTURE_NOISE_FREQ, ny * MOISTURE_NOISE_FREQ, 3, 1.0, 0.5, 2.0) as f32
                * MOISTURE_NOISE_AMP;
            moisture.set(x, y, m.clamp(0.0, 1.0));
        }
    }

    info!("moisture range {:.3} to {:.3}", moisture.min(), moisture.max());
    moisture
}
