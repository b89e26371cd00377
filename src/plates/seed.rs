use crate::rng::RngStream;

/// Probability that a freshly drawn plate is oceanic.
pub const OCEANIC_CHANCE: f32 = 0.45;

#[derive(Clone, Debug, PartialEq)]
pub struct Plate {
    pub center_x: f32,
    pub center_y: f32,
    /// Drift direction. Elevation synthesis does not read it yet, but the two
    /// draws stay in the sequence so every later stage sees the same stream.
    pub drift_x: f32,
    pub drift_y: f32,
    pub is_oceanic: bool,
}

/// Draw `count` plates uniformly over the map.
/// Per plate, in order: center x, center y, drift x, drift y, oceanic roll.
pub fn draw_plates(w: usize, h: usize, count: u32, rng: &mut RngStream) -> Vec<Plate> {
    (0..count)
        .map(|_| {
            let center_x = rng.next_float(0.0, w as f32);
            let center_y = rng.next_float(0.0, h as f32);
            let drift_x = rng.next_float(-1.0, 1.0);
            let drift_y = rng.next_float(-1.0, 1.0);
            let is_oceanic = rng.next_f32() < OCEANIC_CHANCE;
            Plate {
                center_x,
                center_y,
                drift_x,
                drift_y,
                is_oceanic,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_fall_inside_map() {
        let mut rng = RngStream::new(3);
        let plates = draw_plates(100, 40, 64, &mut rng);
        assert_eq!(plates.len(), 64);
        for p in &plates {
            assert!((0.0..100.0).contains(&p.center_x));
            assert!((0.0..40.0).contains(&p.center_y));
            assert!((-1.0..1.0).contains(&p.drift_x));
            assert!((-1.0..1.0).contains(&p.drift_y));
        }
    }

    #[test]
    fn five_draws_per_plate() {
        let mut a = RngStream::new(11);
        let mut b = RngStream::new(11);
        draw_plates(10, 10, 4, &mut a);
        for _ in 0..20 {
            b.next_u64();
        }
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn roughly_half_oceanic() {
        let mut rng = RngStream::new(2024);
        let plates = draw_plates(64, 64, 2000, &mut rng);
        let oceanic = plates.iter().filter(|p| p.is_oceanic).count();
        assert!((700..1100).contains(&oceanic), "oceanic = {oceanic}");
    }
}
