//! Fractal Perlin height field.

use noise::{NoiseFn, Perlin};

use super::random::Seed;
use super::LandGenerator;

/// Scaling factor applied to world coordinates when sampling the first octave.
pub const PERLIN_SCALE_FACTOR: f64 = 0.008;
/// Number of octaves summed.
const OCTAVES: usize = 4;
/// Height of the noise midpoint.
const BASE_HEIGHT: f64 = 52.0;
/// Peak deviation from the midpoint.
const AMPLITUDE: f64 = 28.0;

/// Terrain from fractal Perlin noise.
///
/// Octaves double in frequency and halve in weight; the normalised sum in
/// `[-1, 1]` is mapped onto `BASE_HEIGHT ± AMPLITUDE`.
#[derive(Clone)]
pub struct PerlinLandGenerator {
    seed: Seed,
    perlin: Perlin,
}

impl PerlinLandGenerator {
    /// Creates a generator for `seed`. The noise permutation uses the low 32 bits.
    pub fn new(seed: Seed) -> Self {
        PerlinLandGenerator {
            seed,
            perlin: Perlin::new(seed as u32),
        }
    }

    fn fractal(&self, x: f64, z: f64) -> f64 {
        let mut sum = 0.0;
        let mut norm = 0.0;
        let mut amp = 1.0;
        let mut freq = PERLIN_SCALE_FACTOR;
        for _ in 0..OCTAVES {
            sum += amp * self.perlin.get([x * freq, z * freq]);
            norm += amp;
            amp *= 0.5;
            freq *= 2.0;
        }
        (sum / norm).clamp(-1.0, 1.0)
    }
}

impl LandGenerator for PerlinLandGenerator {
    fn seed(&self) -> Seed {
        self.seed
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        (BASE_HEIGHT + AMPLITUDE * self.fractal(x as f64, z as f64)).floor() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_stay_in_band() {
        let generator = PerlinLandGenerator::new(3);
        for x in (-300..300).step_by(7) {
            for z in (-300..300).step_by(11) {
                let h = generator.surface_height(x, z);
                assert!((24..=80).contains(&h), "height {} at ({}, {})", h, x, z);
            }
        }
    }

    #[test]
    fn same_seed_same_heights() {
        let a = PerlinLandGenerator::new(11);
        let b = PerlinLandGenerator::new(11);
        for i in -50..50 {
            assert_eq!(a.surface_height(i * 3, -i * 5), b.surface_height(i * 3, -i * 5));
        }
    }
}
