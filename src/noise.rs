/// Seeded Perlin noise with fBm and ridged variants.
///
/// The permutation table is a Fisher-Yates shuffle of `0..256` driven by a
/// 64-bit LCG on the seed, duplicated to 512 entries so corner hashing never
/// needs a modulo. Gradients are the four diagonals only; output for a given
/// seed is part of the reproducibility contract, so keep the gradient set.
#[derive(Clone)]
pub struct PerlinNoise {
    perm: [u8; 512],
}

const LCG_MUL: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

#[inline]
fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn grad(hash: u8, dx: f64, dy: f64) -> f64 {
    match hash & 3 {
        0 => dx + dy,
        1 => -dx + dy,
        2 => dx - dy,
        _ => -dx - dy,
    }
}

impl PerlinNoise {
    pub fn new(seed: u64) -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }

        let mut state = seed;
        for i in (1..256usize).rev() {
            state = state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
            let j = ((state >> 33) % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);
        Self { perm }
    }

    #[inline]
    fn p(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// Single-octave noise, roughly in [-1, 1].
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let fx = x.floor();
        let fy = y.floor();
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let xf = x - fx;
        let yf = y - fy;
        let u = smootherstep(xf);
        let v = smootherstep(yf);

        let aa = self.perm[self.p(xi) + yi];
        let ab = self.perm[self.p(xi) + yi + 1];
        let ba = self.perm[self.p(xi + 1) + yi];
        let bb = self.perm[self.p(xi + 1) + yi + 1];

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        lerp(x1, x2, v)
    }

    /// Fractal Brownian motion, normalised by total amplitude.
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, frequency: f64, persistence: f64, lacunarity: f64) -> f64 {
        self.octaves(x, y, octaves, frequency, persistence, lacunarity, |n| n)
    }

    /// Ridged multi-octave noise: each octave contributes `(1 - |n|)^2`.
    pub fn ridged(&self, x: f64, y: f64, octaves: u32, frequency: f64, persistence: f64, lacunarity: f64) -> f64 {
        self.octaves(x, y, octaves, frequency, persistence, lacunarity, |n| {
            let r = 1.0 - n.abs();
            r * r
        })
    }

    #[inline]
    fn octaves(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        frequency: f64,
        persistence: f64,
        lacunarity: f64,
        shape: impl Fn(f64) -> f64,
    ) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        let mut freq = frequency;
        let mut norm = 0.0;
        for _ in 0..octaves {
            sum += shape(self.noise(x * freq, y * freq)) * amp;
            norm += amp;
            amp *= persistence;
            freq *= lacunarity;
        }
        if norm > 0.0 { sum / norm } else { 0.0 }
    }
}
