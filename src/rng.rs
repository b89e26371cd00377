//! Deterministic RNG stream based on splitmix64.
//!
//! One stream is threaded `&mut` through every pipeline stage. The draw order
//! is part of the output contract: adding, removing or reordering a draw
//! changes every downstream grid for a fixed seed.

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[derive(Clone, Debug)]
pub struct RngStream {
    state: u64,
    seed: u64,
}

impl RngStream {
    pub fn new(seed: u64) -> Self {
        Self { state: seed, seed }
    }

    /// Seed this stream was constructed with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64(self.state);
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    /// Uniform in [0, 1) with 24 bits of precision.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    /// Uniform in [min, max).
    pub fn next_float(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform in [min, max] (inclusive). Returns `min` when `max <= min`.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as u64;
        (min as i64 + (self.next_u64() % span) as i64) as i32
    }

    /// Independent child stream. Consumes one draw from the parent.
    pub fn split(&mut self) -> RngStream {
        RngStream::new(self.next_u64())
    }
}
