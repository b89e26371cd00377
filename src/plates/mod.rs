pub mod assign;
pub mod boundary;
pub mod seed;

pub use seed::Plate;

use crate::grid::Grid;
use crate::rng::RngStream;

/// Base elevation of a cell owned by an oceanic plate.
pub const OCEANIC_BASE: f32 = 0.25;
/// Base elevation of a cell owned by a continental plate.
pub const CONTINENTAL_BASE: f32 = 0.55;

/// Voronoi plate partition of the map. Lives for the first three terrain stages.
pub struct PlateField {
    pub plates: Vec<Plate>,
    pub plate_id: Grid<u32>,
}

impl PlateField {
    pub fn generate(w: usize, h: usize, num_plates: u32, rng: &mut RngStream) -> Self {
        let plates = seed::draw_plates(w, h, num_plates.max(1), rng);
        let plate_id = assign::assign_plates(w, h, &plates);
        Self { plates, plate_id }
    }

    pub fn oceanic_count(&self) -> usize {
        self.plates.iter().filter(|p| p.is_oceanic).count()
    }

    /// Seed elevation: oceanic plates sit low, continental plates high.
    pub fn base_elevation(&self) -> Grid<f32> {
        let mut elevation = Grid::<f32>::new(self.plate_id.w, self.plate_id.h);
        for (e, &pid) in elevation.data.iter_mut().zip(&self.plate_id.data) {
            *e = if self.plates[pid as usize].is_oceanic {
                OCEANIC_BASE
            } else {
                CONTINENTAL_BASE
            };
        }
        elevation
    }

    pub fn boundaries(&self) -> Grid<bool> {
        boundary::boundary_mask(&self.plate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_elevation_follows_plate_type() {
        let mut rng = RngStream::new(77);
        let field = PlateField::generate(48, 24, 10, &mut rng);
        let base = field.base_elevation();
        for (i, &pid) in field.plate_id.data.iter().enumerate() {
            let want = if field.plates[pid as usize].is_oceanic {
                OCEANIC_BASE
            } else {
                CONTINENTAL_BASE
            };
            assert_eq!(base.data[i], want);
        }
    }

    #[test]
    fn zero_plates_still_partitions() {
        let mut rng = RngStream::new(1);
        let field = PlateField::generate(8, 8, 0, &mut rng);
        assert_eq!(field.plates.len(), 1);
        assert!(field.plate_id.data.iter().all(|&p| p == 0));
    }
}
