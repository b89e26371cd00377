use crate::grid::Grid;

use super::seed::Plate;

/// Squared distance with E-W wrapping (the map is a cylinder, not a torus in y).
#[inline]
pub fn wrapped_dist_sq(x: f32, y: f32, cx: f32, cy: f32, w: f32) -> f32 {
    let mut dx = x - cx;
    let dy = y - cy;
    if dx > w * 0.5 {
        dx -= w;
    }
    if dx < -w * 0.5 {
        dx += w;
    }
    dx * dx + dy * dy
}

/// Assign every cell to its nearest plate center. Ties go to the lower index.
pub fn assign_plates(w: usize, h: usize, plates: &[Plate]) -> Grid<u32> {
    let mut plate_id = Grid::<u32>::new(w, h);
    let wf = w as f32;

    for y in 0..h {
        for x in 0..w {
            let mut best_d = f32::MAX;
            let mut best = 0u32;
            for (i, p) in plates.iter().enumerate() {
                let d = wrapped_dist_sq(x as f32, y as f32, p.center_x, p.center_y, wf);
                if d < best_d {
                    best_d = d;
                    best = i as u32;
                }
            }
            plate_id.set(x, y, best);
        }
    }
    plate_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate(cx: f32, cy: f32) -> Plate {
        Plate {
            center_x: cx,
            center_y: cy,
            drift_x: 0.0,
            drift_y: 0.0,
            is_oceanic: false,
        }
    }

    #[test]
    fn wraps_horizontally_only() {
        // 2 apart across the seam, 8 apart directly
        assert_eq!(wrapped_dist_sq(0.0, 0.0, 9.0, 0.0, 10.0), 1.0);
        assert_eq!(wrapped_dist_sq(9.0, 5.0, 1.0, 5.0, 10.0), 4.0);
        assert_eq!(wrapped_dist_sq(0.0, 0.0, 0.0, 9.0, 10.0), 81.0);
    }

    #[test]
    fn nearest_center_wins_across_seam() {
        let plates = [plate(1.0, 5.0), plate(5.0, 5.0)];
        let ids = assign_plates(20, 10, &plates);
        // x = 19 is two cells from plate 0 through the seam
        assert_eq!(ids.get(19, 5), 0);
        assert_eq!(ids.get(5, 5), 1);
        assert_eq!(ids.get(10, 5), 1);
    }

    #[test]
    fn every_cell_is_assigned_a_valid_plate() {
        let plates: Vec<Plate> = (0..5).map(|i| plate(i as f32 * 7.0, i as f32 * 3.0)).collect();
        let ids = assign_plates(32, 16, &plates);
        assert!(ids.data.iter().all(|&p| (p as usize) < plates.len()));
    }
}
