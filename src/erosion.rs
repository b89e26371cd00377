use crate::grid::Grid;
use crate::rng::RngStream;

/// Constants of the particle erosion model.
#[derive(Clone, Copy, Debug)]
pub struct DropletParams {
    pub inertia: f32,
    pub erosion_rate: f32,
    pub deposit_rate: f32,
    pub evaporate_rate: f32,
    pub gravity: f32,
    pub capacity_factor: f32,
    pub min_slope: f32,
    pub max_steps: u32,
}

impl Default for DropletParams {
    fn default() -> Self {
        Self {
            inertia: 0.3,
            erosion_rate: 0.3,
            deposit_rate: 0.3,
            evaporate_rate: 0.01,
            gravity: 4.0,
            capacity_factor: 8.0,
            min_slope: 0.01,
            max_steps: 50,
        }
    }
}

#[inline]
fn in_interior(px: f32, py: f32, w: usize, h: usize) -> bool {
    // Truncation toward zero, so anything in (-1, 1) lands on column/row 0 and is rejected.
    let ix = px as i64;
    let iy = py as i64;
    ix >= 1 && ix < w as i64 - 1 && iy >= 1 && iy < h as i64 - 1
}

/// Run `iterations` droplets one after another against the shared grid.
/// Each droplet draws its start position (x then y) from `rng`; later
/// droplets see every edit made by earlier ones.
pub fn erode(elevation: &mut Grid<f32>, iterations: u32, params: &DropletParams, rng: &mut RngStream) {
    let w = elevation.w;
    let h = elevation.h;
    if w < 3 || h < 3 {
        return;
    }
    for _ in 0..iterations {
        let px = rng.next_float(1.0, (w - 2) as f32);
        let py = rng.next_float(1.0, (h - 2) as f32);
        run_droplet(elevation, px, py, params);
    }
}

/// Simulate a single droplet from `(px, py)` until it stalls, leaves the
/// interior or runs out of steps.
pub fn run_droplet(elevation: &mut Grid<f32>, mut px: f32, mut py: f32, params: &DropletParams) {
    let w = elevation.w;
    let h = elevation.h;

    let mut sediment = 0.0f32;
    let mut speed = 0.0f32;
    let mut water = 1.0f32;
    let mut dir_x = 0.0f32;
    let mut dir_y = 0.0f32;

    for _ in 0..params.max_steps {
        if !in_interior(px, py, w, h) {
            break;
        }
        let ix = px as usize;
        let iy = py as usize;

        // Central-difference gradient at the cell under the droplet
        let gx = (elevation.get(ix + 1, iy) - elevation.get(ix - 1, iy)) * 0.5;
        let gy = (elevation.get(ix, iy + 1) - elevation.get(ix, iy - 1)) * 0.5;

        dir_x = dir_x * params.inertia - gx * (1.0 - params.inertia);
        dir_y = dir_y * params.inertia - gy * (1.0 - params.inertia);

        let len = (dir_x * dir_x + dir_y * dir_y).sqrt();
        if len < 1e-6 {
            break;
        }
        dir_x /= len;
        dir_y /= len;

        let new_px = px + dir_x;
        let new_py = py + dir_y;
        if !in_interior(new_px, new_py, w, h) {
            break;
        }

        let old_h = elevation.sample(px, py);
        let new_h = elevation.sample(new_px, new_py);
        let h_diff = new_h - old_h;

        if h_diff > 0.0 {
            // Uphill: fill the pit behind us
            let deposit = sediment.min(h_diff);
            *elevation.at_mut(ix, iy) += deposit;
            sediment -= deposit;
        } else {
            let capacity = (-h_diff).max(params.min_slope) * speed * water * params.capacity_factor;
            if sediment > capacity {
                let deposit = (sediment - capacity) * params.deposit_rate;
                *elevation.at_mut(ix, iy) += deposit;
                sediment -= deposit;
            } else {
                let eroded = ((capacity - sediment) * params.erosion_rate).min(-h_diff);
                *elevation.at_mut(ix, iy) -= eroded;
                sediment += eroded;
            }
        }

        speed = (speed * speed + h_diff * params.gravity).max(0.0).sqrt();
        water *= 1.0 - params.evaporate_rate;

        px = new_px;
        py = new_py;
    }
}
