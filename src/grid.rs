use std::io::{self, Read, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid payload truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("grid dimensions {width}x{height} do not fit the u32 wire format")]
    SizeOverflow { width: usize, height: usize },
    #[error("grid dimension mismatch: expected {expected_w}x{expected_h}, got {got_w}x{got_h}")]
    DimensionMismatch {
        expected_w: usize,
        expected_h: usize,
        got_w: usize,
        got_h: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Upper bound on cells reserved up front when reading a grid from a stream.
const MAX_PREALLOC: usize = 1 << 20;

/// Row-major flat grid. No per-cell objects, f32 friendly.
///
/// Invariant: `data.len() == w * h`. Accessors take a precondition contract:
/// callers keep `x < w` and `y < h`. Debug builds assert it; out-of-range
/// linear indices panic in every build. Use [`Grid::try_get`] when the
/// coordinate is not known to be in range.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, T::default())
    }

    pub fn filled(w: usize, h: usize, v: T) -> Self {
        Self {
            data: vec![v; w * h],
            w,
            h,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = self.idx(x, y);
        &mut self.data[i]
    }

    /// Checked access.
    pub fn try_get(&self, x: usize, y: usize) -> Option<T> {
        (x < self.w && y < self.h).then(|| self.data[y * self.w + x])
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn same_size<U>(&self, other: &Grid<U>) -> bool {
        self.w == other.w && self.h == other.h
    }
}

impl Grid<f32> {
    /// Bilinear interpolation. Coordinates are clamped to `[0, dim-1]`.
    pub fn sample(&self, fx: f32, fy: f32) -> f32 {
        let fx = fx.clamp(0.0, (self.w - 1) as f32);
        let fy = fy.clamp(0.0, (self.h - 1) as f32);

        let x0 = fx as usize;
        let y0 = fy as usize;
        let x1 = (x0 + 1).min(self.w - 1);
        let y1 = (y0 + 1).min(self.h - 1);

        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let a = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
        let b = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;
        a * (1.0 - ty) + b * ty
    }

    /// Bilinear sample with normalised `[0, 1]` coordinates.
    pub fn sample_uv(&self, u: f32, v: f32) -> f32 {
        self.sample(u * (self.w - 1) as f32, v * (self.h - 1) as f32)
    }

    /// `self += other * scale`. Both grids must have the same size.
    pub fn add(&mut self, other: &Grid<f32>, scale: f32) {
        debug_assert!(self.same_size(other));
        for (v, o) in self.data.iter_mut().zip(&other.data) {
            *v += o * scale;
        }
    }

    pub fn multiply(&mut self, scale: f32) {
        for v in &mut self.data {
            *v *= scale;
        }
    }

    pub fn clamp(&mut self, lo: f32, hi: f32) {
        for v in &mut self.data {
            *v = v.clamp(lo, hi);
        }
    }

    /// Min-max stretch to `[0, 1]`. Constant fields (range below 1e-8) are left untouched.
    pub fn normalise(&mut self) {
        let lo = self.min();
        let hi = self.max();
        if hi - lo < 1e-8 {
            return;
        }
        let range = hi - lo;
        for v in &mut self.data {
            *v = (*v - lo) / range;
        }
    }

    /// Box blur of the given radius, clamped at the borders.
    pub fn blur(&mut self, radius: usize) {
        let (w, h) = (self.w, self.h);
        let r = radius as i64;
        let diam = 2 * radius + 1;
        let inv = 1.0 / (diam * diam) as f32;
        let mut out = vec![0.0f32; w * h];

        for y in 0..h {
            for x in 0..w {
                let mut sum = 0.0f32;
                for dy in -r..=r {
                    let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as usize;
                    for dx in -r..=r {
                        let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as usize;
                        sum += self.data[sy * w + sx];
                    }
                }
                out[y * w + x] = sum * inv;
            }
        }
        self.data = out;
    }

    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn average(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }

    /// Wire format: `u32 width`, `u32 height`, then `width * height` f32 values,
    /// all little-endian. No header or versioning.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), GridError> {
        let (w, h) = match (u32::try_from(self.w), u32::try_from(self.h)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(GridError::SizeOverflow {
                    width: self.w,
                    height: self.h,
                });
            }
        };
        out.write_all(&w.to_le_bytes())?;
        out.write_all(&h.to_le_bytes())?;
        let mut buf = Vec::with_capacity(self.data.len() * 4);
        for v in &self.data {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        out.write_all(&buf)?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self, GridError> {
        let mut word = [0u8; 4];
        input.read_exact(&mut word)?;
        let w = u32::from_le_bytes(word) as usize;
        input.read_exact(&mut word)?;
        let h = u32::from_le_bytes(word) as usize;

        let n = w
            .checked_mul(h)
            .ok_or(GridError::SizeOverflow { width: w, height: h })?;
        // The header is untrusted; grow as the payload actually arrives
        let mut data = Vec::with_capacity(n.min(MAX_PREALLOC));
        for _ in 0..n {
            input.read_exact(&mut word)?;
            data.push(f32::from_le_bytes(word));
        }
        Ok(Self { data, w, h })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GridError> {
        let mut buf = Vec::with_capacity(8 + self.data.len() * 4);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Parse a grid from the front of `bytes`. Trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GridError> {
        if bytes.len() < 8 {
            return Err(GridError::Truncated {
                needed: 8,
                available: bytes.len(),
            });
        }
        let w = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let h = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let needed = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_add(8))
            .ok_or(GridError::SizeOverflow { width: w, height: h })?;
        if bytes.len() < needed {
            return Err(GridError::Truncated {
                needed,
                available: bytes.len(),
            });
        }
        let data = bytes[8..needed]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { data, w, h })
    }
}

/// 4-connected neighbors, no wrapping.
pub fn neighbors4(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    let offsets: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    let mut out = [(0usize, 0usize); 4];
    let mut n = 0;
    for (dx, dy) in offsets {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64 {
            out[n] = (nx as usize, ny as usize);
            n += 1;
        }
    }
    out.into_iter().take(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_stop_at_edges() {
        assert_eq!(neighbors4(0, 0, 3, 3).count(), 2);
        assert_eq!(neighbors4(1, 0, 3, 3).count(), 3);
        assert_eq!(neighbors4(1, 1, 3, 3).count(), 4);
        let n: Vec<_> = neighbors4(2, 2, 3, 3).collect();
        assert_eq!(n, vec![(1, 2), (2, 1)]);
    }

    #[test]
    fn basic_access() {
        let mut g = Grid::filled(64, 64, 0.5f32);
        assert_eq!(g.w, 64);
        assert_eq!(g.h, 64);
        assert_eq!(g.get(0, 0), 0.5);
        g.set(10, 20, 0.8);
        assert_eq!(g.get(10, 20), 0.8);
        assert_eq!(g.data[20 * 64 + 10], 0.8);
        *g.at_mut(3, 4) += 1.0;
        assert_eq!(g.get(3, 4), 1.5);
    }

    #[test]
    fn try_get_checks_bounds() {
        let g = Grid::filled(4, 3, 1.0f32);
        assert_eq!(g.try_get(3, 2), Some(1.0));
        assert_eq!(g.try_get(4, 0), None);
        assert_eq!(g.try_get(0, 3), None);
    }

    #[test]
    fn normalise_stretches_to_unit_range() {
        let mut g = Grid::<f32>::new(4, 4);
        g.set(0, 0, -10.0);
        g.set(1, 0, 50.0);
        g.set(2, 0, 20.0);
        g.normalise();
        assert_eq!(g.get(0, 0), 0.0);
        assert_eq!(g.get(1, 0), 1.0);
        assert!(g.min() >= 0.0 && g.max() <= 1.0);
    }

    #[test]
    fn normalise_is_idempotent() {
        let mut g = Grid::<f32>::new(8, 8);
        for (i, v) in g.data.iter_mut().enumerate() {
            *v = ((i * 37) % 11) as f32 * 0.7 - 3.0;
        }
        g.normalise();
        let once = g.clone();
        g.normalise();
        assert_eq!(g, once);
    }

    #[test]
    fn normalise_leaves_constant_field() {
        let mut g = Grid::filled(5, 5, 0.3f32);
        g.normalise();
        assert!(g.data.iter().all(|&v| v == 0.3));
    }

    #[test]
    fn bilinear_midpoint() {
        let mut g = Grid::<f32>::new(2, 2);
        g.set(1, 0, 1.0);
        g.set(1, 1, 1.0);
        let mid = g.sample(0.5, 0.5);
        assert!((mid - 0.5).abs() < 1e-6);
        // Clamped outside the grid
        assert_eq!(g.sample(-5.0, 0.0), 0.0);
        assert_eq!(g.sample(9.0, 9.0), 1.0);
        assert!((g.sample_uv(0.5, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn blur_preserves_constant_and_smooths_spike() {
        let mut flat = Grid::filled(6, 6, 2.0f32);
        flat.blur(2);
        assert!(flat.data.iter().all(|&v| (v - 2.0).abs() < 1e-5));

        let mut spike = Grid::<f32>::new(9, 9);
        spike.set(4, 4, 9.0);
        spike.blur(1);
        assert!((spike.get(4, 4) - 1.0).abs() < 1e-6);
        assert!((spike.get(3, 3) - 1.0).abs() < 1e-6);
        assert_eq!(spike.get(0, 0), 0.0);
    }

    #[test]
    fn arithmetic_and_stats() {
        let mut a = Grid::filled(3, 3, 1.0f32);
        let b = Grid::filled(3, 3, 2.0f32);
        a.add(&b, 0.5);
        assert!(a.data.iter().all(|&v| v == 2.0));
        a.multiply(3.0);
        assert_eq!(a.average(), 6.0);
        a.set(0, 0, -4.0);
        a.clamp(0.0, 5.0);
        assert_eq!(a.min(), 0.0);
        assert_eq!(a.max(), 5.0);
    }

    #[test]
    fn serialisation_round_trip() {
        let mut g = Grid::<f32>::new(32, 17);
        for y in 0..17 {
            for x in 0..32 {
                g.set(x, y, (x + y) as f32 / 64.0 - 0.1);
            }
        }
        let bytes = g.to_bytes().unwrap();
        assert_eq!(bytes.len(), 8 + 32 * 17 * 4);
        assert_eq!(&bytes[0..4], &32u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &17u32.to_le_bytes());

        let back = Grid::from_bytes(&bytes).unwrap();
        assert_eq!(back, g);

        let streamed = Grid::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(streamed, g);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let g = Grid::filled(4, 4, 1.0f32);
        let bytes = g.to_bytes().unwrap();
        let err = Grid::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, GridError::Truncated { needed: 72, available: 71 }));
        assert!(matches!(
            Grid::read_from(&mut &bytes[..10]),
            Err(GridError::Io(_))
        ));
    }

    #[test]
    fn oversized_header_fails_cleanly() {
        let mut header = Vec::new();
        header.extend_from_slice(&u32::MAX.to_le_bytes());
        header.extend_from_slice(&u32::MAX.to_le_bytes());
        header.extend_from_slice(&[0u8; 16]);

        assert!(matches!(
            Grid::read_from(&mut header.as_slice()),
            Err(GridError::Io(_) | GridError::SizeOverflow { .. })
        ));
        assert!(Grid::from_bytes(&header).is_err());
    }
}
