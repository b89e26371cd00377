use std::collections::VecDeque;

use crate::grid::{Grid, neighbors4};

/// Distance (in 4-connected steps) from every cell to the nearest cell below
/// sea level. Multi-source BFS seeded at every ocean cell; no wrapping.
pub struct OceanDistanceField {
    dist: Grid<u32>,
    has_ocean: bool,
}

impl OceanDistanceField {
    /// Marker for cells the flood never reached (only possible on a map without ocean).
    pub const UNREACHED: u32 = u32::MAX;

    pub fn compute(elevation: &Grid<f32>, sea_level: f32) -> Self {
        let w = elevation.w;
        let h = elevation.h;
        let mut dist = Grid::filled(w, h, Self::UNREACHED);
        let mut queue = VecDeque::new();

        for y in 0..h {
            for x in 0..w {
                if elevation.get(x, y) < sea_level {
                    dist.set(x, y, 0);
                    queue.push_back((x, y));
                }
            }
        }
        let has_ocean = !queue.is_empty();

        while let Some((x, y)) = queue.pop_front() {
            let d = dist.get(x, y);
            for (nx, ny) in neighbors4(x, y, w, h) {
                if dist.get(nx, ny) == Self::UNREACHED {
                    dist.set(nx, ny, d + 1);
                    queue.push_back((nx, ny));
                }
            }
        }

        Self { dist, has_ocean }
    }

    /// Step distance, or `None` if the cell was never reached.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        let d = self.dist.get(x, y);
        (d != Self::UNREACHED).then_some(d)
    }

    pub fn has_ocean(&self) -> bool {
        self.has_ocean
    }

    pub fn grid(&self) -> &Grid<u32> {
        &self.dist
    }

    pub fn max_distance(&self) -> Option<u32> {
        self.dist.data.iter().copied().filter(|&d| d != Self::UNREACHED).max()
    }
}
