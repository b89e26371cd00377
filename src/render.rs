use rayon::prelude::*;

use crate::biome::Biome;
use crate::climate::land_height;
use crate::grid::Grid;

// Terrain palette
const DEEP_OCEAN_SHALLOW_END: [u8; 4] = [45, 110, 160, 255];
const DEEP_OCEAN_FLOOR: [u8; 4] = [15, 50, 100, 255];
const SHALLOW_OCEAN: [u8; 4] = [40, 100, 150, 255];
const BEACH_SAND: [u8; 4] = [210, 200, 160, 255];
const LOWLAND: [u8; 4] = [50, 130, 40, 255];
const HILLS: [u8; 4] = [110, 110, 60, 255];
const HILLS_HIGH: [u8; 4] = [150, 90, 80, 255];
const MOUNTAIN_LOW: [u8; 4] = [150, 150, 150, 255];
const SNOW: [u8; 4] = [255, 255, 255, 255];

/// Shore band rendered as sand, in raw elevation units above sea level.
const BEACH_BAND: f32 = 0.02;
const DEEP_OCEAN_BAND: f32 = 0.05;

// Temperature stops, over the map's own min..max
const TEMP_STOPS: [[u8; 4]; 5] = [
    [0, 0, 200, 255],   // blue
    [0, 180, 150, 255], // cyan
    [0, 230, 0, 255],   // green
    [230, 180, 0, 255], // yellow
    [255, 0, 0, 255],   // red
];

// Moisture stops
const MOIST_DRY: [u8; 4] = [180, 150, 80, 255];
const MOIST_LOW: [u8; 4] = [100, 120, 100, 255];
const MOIST_MID: [u8; 4] = [0, 180, 50, 255];
const MOIST_WET: [u8; 4] = [0, 120, 180, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Fill an RGBA8 buffer row by row in parallel.
fn render_rows<F>(w: usize, h: usize, color_at: F) -> Vec<u8>
where
    F: Fn(usize, usize) -> [u8; 4] + Sync,
{
    let mut rgba = vec![0u8; w * h * 4];
    if w == 0 {
        return rgba;
    }
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            row[x * 4..x * 4 + 4].copy_from_slice(&color_at(x, y));
        }
    });
    rgba
}

/// Grayscale, values clamped to `[0, 1]`.
pub fn render_heightmap(elevation: &Grid<f32>) -> Vec<u8> {
    render_rows(elevation.w, elevation.h, |x, y| {
        let v = (elevation.get(x, y).clamp(0.0, 1.0) * 255.0) as u8;
        [v, v, v, 255]
    })
}

/// Shaded relief: deep and shallow ocean, beach, then a
/// lowland → hills → mountain → snow ramp over normalised land height.
pub fn render_terrain(elevation: &Grid<f32>, sea_level: f32) -> Vec<u8> {
    render_rows(elevation.w, elevation.h, |x, y| {
        terrain_color(elevation.get(x, y), sea_level)
    })
}

fn terrain_color(e: f32, sea_level: f32) -> [u8; 4] {
    if e < sea_level - DEEP_OCEAN_BAND {
        let depth = if sea_level > 0.0 { (sea_level - e) / sea_level } else { 1.0 };
        return lerp_color(DEEP_OCEAN_SHALLOW_END, DEEP_OCEAN_FLOOR, depth);
    }
    if e < sea_level {
        return SHALLOW_OCEAN;
    }
    if e < sea_level + BEACH_BAND {
        return BEACH_SAND;
    }

    let land = land_height(e, sea_level);
    if land < 0.3 {
        lerp_color(LOWLAND, HILLS, land / 0.3)
    } else if land < 0.6 {
        lerp_color(HILLS, HILLS_HIGH, (land - 0.3) / 0.3)
    } else {
        lerp_color(MOUNTAIN_LOW, SNOW, (land - 0.6) / 0.4)
    }
}

pub fn render_biomes(biome: &Grid<Biome>) -> Vec<u8> {
    render_rows(biome.w, biome.h, |x, y| {
        let [r, g, b] = biome.get(x, y).rgb();
        [r, g, b, 255]
    })
}

/// Heat map normalised to the grid's own range: blue (coldest) through
/// cyan, green and yellow to red (hottest).
pub fn render_temperature(temperature: &Grid<f32>) -> Vec<u8> {
    let min_t = temperature.min();
    let mut range = temperature.max() - min_t;
    if range < 1e-6 {
        range = 1.0;
    }

    render_rows(temperature.w, temperature.h, |x, y| {
        let t = ((temperature.get(x, y) - min_t) / range).clamp(0.0, 1.0);
        let scaled = t * 4.0;
        let band = (scaled as usize).min(3);
        lerp_color(TEMP_STOPS[band], TEMP_STOPS[band + 1], scaled - band as f32)
    })
}

/// Brown (dry) → green → blue (saturated).
pub fn render_moisture(moisture: &Grid<f32>) -> Vec<u8> {
    render_rows(moisture.w, moisture.h, |x, y| {
        let m = moisture.get(x, y).clamp(0.0, 1.0);
        if m < 0.3 {
            lerp_color(MOIST_DRY, MOIST_LOW, m / 0.3)
        } else if m < 0.6 {
            lerp_color(MOIST_LOW, MOIST_MID, (m - 0.3) / 0.3)
        } else {
            lerp_color(MOIST_MID, MOIST_WET, (m - 0.6) / 0.4)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(rgba: &[u8], w: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * w + x) * 4;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn heightmap_is_clamped_grayscale() {
        let mut g = Grid::<f32>::new(3, 2);
        g.data = vec![-1.0, 0.0, 0.5, 1.0, 2.0, 0.25];
        let rgba = render_heightmap(&g);
        assert_eq!(rgba.len(), 3 * 2 * 4);
        assert_eq!(pixel(&rgba, 3, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&rgba, 3, 2, 0), [127, 127, 127, 255]);
        assert_eq!(pixel(&rgba, 3, 0, 1), [255, 255, 255, 255]);
        assert_eq!(pixel(&rgba, 3, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn terrain_bands() {
        assert_eq!(terrain_color(0.38, 0.4), SHALLOW_OCEAN);
        assert_eq!(terrain_color(0.41, 0.4), BEACH_SAND);
        assert_eq!(terrain_color(0.0, 0.4), DEEP_OCEAN_FLOOR);
        assert_eq!(terrain_color(1.0, 0.4), SNOW);
        assert_eq!(terrain_color(0.43, 0.4), lerp_color(LOWLAND, HILLS, 0.05 / 0.3));
    }

    #[test]
    fn biome_pixels_use_table() {
        let mut g = Grid::<Biome>::new(2, 1);
        g.set(1, 0, Biome::Desert);
        let rgba = render_biomes(&g);
        assert_eq!(pixel(&rgba, 2, 0, 0), [28, 107, 160, 255]);
        assert_eq!(pixel(&rgba, 2, 1, 0), [210, 190, 140, 255]);
    }

    #[test]
    fn temperature_spans_blue_to_red() {
        let mut g = Grid::<f32>::new(3, 1);
        g.data = vec![-30.0, 0.0, 30.0];
        let rgba = render_temperature(&g);
        assert_eq!(pixel(&rgba, 3, 0, 0), TEMP_STOPS[0]);
        assert_eq!(pixel(&rgba, 3, 1, 0), TEMP_STOPS[2]);
        assert_eq!(pixel(&rgba, 3, 2, 0), TEMP_STOPS[4]);
    }

    #[test]
    fn constant_temperature_does_not_divide_by_zero() {
        let g = Grid::filled(4, 4, 12.0f32);
        let rgba = render_temperature(&g);
        assert!(rgba.chunks(4).all(|p| p == TEMP_STOPS[0]));
    }

    #[test]
    fn moisture_endpoints() {
        let mut g = Grid::<f32>::new(2, 1);
        g.data = vec![0.0, 1.0];
        let rgba = render_moisture(&g);
        assert_eq!(pixel(&rgba, 2, 0, 0), MOIST_DRY);
        assert_eq!(pixel(&rgba, 2, 1, 0), MOIST_WET);
    }
}
