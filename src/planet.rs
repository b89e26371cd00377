use std::io::{Read, Write};

use serde::Serialize;

use crate::biome::{BIOME_COUNT, Biome, classify_biome};
use crate::grid::{Grid, GridError};

/// Everything the pipeline produces for one planet.
/// The four grids always share one size.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetSurface {
    pub elevation: Grid<f32>,
    pub temperature: Grid<f32>,
    pub moisture: Grid<f32>,
    pub biome: Grid<Biome>,
    pub sea_level: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct BiomeCount {
    pub biome: Biome,
    pub name: &'static str,
    pub cells: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct SurfaceStats {
    /// Share of cells at or above sea level.
    pub land_fraction: f32,
    pub avg_temperature: f32,
    pub avg_moisture: f32,
    /// Non-empty biomes only, in tag order.
    pub biome_counts: Vec<BiomeCount>,
}

impl PlanetSurface {
    /// Build a surface from the three climate-stage grids and classify every cell.
    pub fn new(
        elevation: Grid<f32>,
        temperature: Grid<f32>,
        moisture: Grid<f32>,
        sea_level: f32,
    ) -> Result<Self, GridError> {
        for g in [&temperature, &moisture] {
            if !elevation.same_size(g) {
                return Err(GridError::DimensionMismatch {
                    expected_w: elevation.w,
                    expected_h: elevation.h,
                    got_w: g.w,
                    got_h: g.h,
                });
            }
        }
        let biome = Grid::new(elevation.w, elevation.h);
        let mut surface = Self {
            elevation,
            temperature,
            moisture,
            biome,
            sea_level,
        };
        surface.classify_biomes();
        Ok(surface)
    }

    pub fn width(&self) -> usize {
        self.elevation.w
    }

    pub fn height(&self) -> usize {
        self.elevation.h
    }

    pub fn biome_at(&self, x: usize, y: usize) -> Biome {
        self.biome.get(x, y)
    }

    pub fn classify_biomes(&mut self) {
        let (w, h) = (self.width(), self.height());
        self.recompute_region(0, 0, w, h);
    }

    /// Re-run the classifier for a single cell after an edit.
    pub fn recompute_biome(&mut self, x: usize, y: usize) {
        let b = classify_biome(
            self.elevation.get(x, y),
            self.temperature.get(x, y),
            self.moisture.get(x, y),
            self.sea_level,
        );
        self.biome.set(x, y, b);
    }

    /// Reclassify the half-open rectangle `[x0, x1) x [y0, y1)`, clamped to the map.
    pub fn recompute_region(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                self.recompute_biome(x, y);
            }
        }
    }

    pub fn stats(&self) -> SurfaceStats {
        let n = self.elevation.len().max(1);
        let land = self
            .elevation
            .data
            .iter()
            .filter(|&&e| e >= self.sea_level)
            .count();

        let mut counts = [0usize; BIOME_COUNT];
        for b in &self.biome.data {
            counts[*b as usize] += 1;
        }
        let biome_counts = Biome::ALL
            .iter()
            .zip(counts)
            .filter(|(_, c)| *c > 0)
            .map(|(&biome, cells)| BiomeCount {
                biome,
                name: biome.name(),
                cells,
            })
            .collect();

        SurfaceStats {
            land_fraction: land as f32 / n as f32,
            avg_temperature: self.temperature.average(),
            avg_moisture: self.moisture.average(),
            biome_counts,
        }
    }

    /// Snapshot: little-endian f32 sea level, then the elevation, temperature
    /// and moisture grids in grid wire format. Biomes are derived and not stored.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), GridError> {
        out.write_all(&self.sea_level.to_le_bytes())?;
        self.elevation.write_to(out)?;
        self.temperature.write_to(out)?;
        self.moisture.write_to(out)?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self, GridError> {
        let mut word = [0u8; 4];
        input.read_exact(&mut word)?;
        let sea_level = f32::from_le_bytes(word);
        let elevation = Grid::read_from(input)?;
        let temperature = Grid::read_from(input)?;
        let moisture = Grid::read_from(input)?;
        Self::new(elevation, temperature, moisture, sea_level)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GridError> {
        let mut buf = Vec::with_capacity(4 + 3 * (8 + self.elevation.len() * 4));
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        let mut cursor = bytes;
        Self::read_from(&mut cursor)
    }
}
