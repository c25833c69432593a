//! Deterministic scalar noise over integer world coordinates.
//!
//! A [`NoiseField`] is a seeded Perlin field sampled on the integer grid,
//! optionally with fractal octaves. Several fields can be summed in a
//! [`LayeredNoise`] before thresholding, which is how each meta property
//! decides whether it is present in a cell.

use std::fmt;

use noise::{NoiseFn, Perlin};

/// One seeded noise field.
///
/// `value(x, y)` samples the field at `((x + offset_x) / scale, (y + offset_y) / scale)`
/// and multiplies by `amplitude`. Same configuration, same output.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    seed: u32,
    scale: f64,
    offset: (f64, f64),
    amplitude: f64,
    octaves: u32,
}

impl NoiseField {
    pub fn new(seed: u32, scale: f64, offset: (f64, f64), amplitude: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
            scale: scale.max(f64::EPSILON),
            offset,
            amplitude,
            octaves: 1,
        }
    }

    /// Use fractal Brownian motion with `octaves` layers (1 = plain Perlin).
    pub fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves.max(1);
        self
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample the field at an integer coordinate.
    pub fn value(&self, x: i64, y: i64) -> f64 {
        let nx = (x as f64 + self.offset.0) / self.scale;
        let ny = (y as f64 + self.offset.1) / self.scale;

        let raw = if self.octaves == 1 {
            self.perlin.get([nx, ny])
        } else {
            fbm_noise(&self.perlin, nx, ny, self.octaves, 0.5, 2.0)
        };

        raw * self.amplitude
    }

    /// Boolean version of [`value`](Self::value).
    pub fn threshold(&self, x: i64, y: i64, thresh: f64) -> bool {
        self.value(x, y) >= thresh
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .field("amplitude", &self.amplitude)
            .field("octaves", &self.octaves)
            .finish()
    }
}

/// Sum of several noise fields, thresholded as a whole.
#[derive(Clone, Debug, Default)]
pub struct LayeredNoise {
    fields: Vec<NoiseField>,
}

impl LayeredNoise {
    pub fn new(fields: Vec<NoiseField>) -> Self {
        Self { fields }
    }

    pub fn push(&mut self, field: NoiseField) {
        self.fields.push(field);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn value(&self, x: i64, y: i64) -> f64 {
        self.fields.iter().map(|field| field.value(x, y)).sum()
    }

    /// An empty stack never passes, whatever the threshold.
    pub fn threshold(&self, x: i64, y: i64, thresh: f64) -> bool {
        !self.fields.is_empty() && self.value(x, y) >= thresh
    }
}

/// Fractional Brownian Motion noise
fn fbm_noise(
    noise: &impl NoiseFn<f64, 2>,
    x: f64,
    y: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_deterministic() {
        let a = NoiseField::new(42, 9.7, (0.37, 0.61), 1.0);
        let b = NoiseField::new(42, 9.7, (0.37, 0.61), 1.0);

        for y in -20..20 {
            for x in -20..20 {
                assert_eq!(a.value(x, y).to_bits(), b.value(x, y).to_bits());
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1, 9.7, (0.37, 0.61), 1.0);
        let b = NoiseField::new(2, 9.7, (0.37, 0.61), 1.0);

        let differing = (0..64)
            .filter(|&i| a.value(i, i * 3) != b.value(i, i * 3))
            .count();
        assert!(differing > 0);
    }

    #[test]
    fn test_layered_sum_and_threshold() {
        let f1 = NoiseField::new(7, 5.3, (0.2, 0.4), 1.0);
        let f2 = NoiseField::new(8, 13.1, (0.9, 0.1), 0.5).with_octaves(3);
        let layered = LayeredNoise::new(vec![f1.clone(), f2.clone()]);

        for x in 0..16 {
            let expected = f1.value(x, -x) + f2.value(x, -x);
            assert!((layered.value(x, -x) - expected).abs() < 1e-12);
            assert_eq!(layered.threshold(x, -x, 0.1), expected >= 0.1);
        }
    }

    #[test]
    fn test_empty_layer_never_passes() {
        let empty = LayeredNoise::default();
        assert!(!empty.threshold(0, 0, -10.0));
        assert_eq!(empty.value(3, 4), 0.0);
    }
}
