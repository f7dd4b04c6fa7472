//! Multi-octave value noise height field.

use super::random::{lattice_key, unit, Seed};
use super::LandGenerator;

/// Number of noise octaves.
const LEVEL_NUM: u32 = 5;
/// Lattice spacing of the first octave, halved each octave.
const MAX_GRID_SIZE: i32 = 128;
/// Amplitude of the first octave.
const MAX_LEVEL_HEIGHT: f32 = 30.0;
/// Amplitude ratio between consecutive octaves.
const LEVEL_HEIGHT_DECAY: f32 = 0.7;
/// Height added under all octaves.
const BASE_HEIGHT: f32 = 10.0;

/// Rolling terrain from five octaves of smoothed lattice noise.
///
/// Each octave places pseudo-random values in `[0, 1)` on a square lattice and
/// blends the four corners around a column with a smoothstep weight. The
/// result ranges from 10 to a little over 93 blocks.
#[derive(Clone, Debug)]
pub struct ValueNoiseLandGenerator {
    seed: Seed,
}

impl ValueNoiseLandGenerator {
    /// Creates a generator for `seed`.
    pub fn new(seed: Seed) -> Self {
        ValueNoiseLandGenerator { seed }
    }

    fn corner(&self, gx: i32, gz: i32, level: u32) -> f32 {
        unit(lattice_key(self.seed, gx, gz, level))
    }
}

/// Interpolates from `a` to `b` with the smoothstep weight of `t`.
#[inline]
fn smooth_lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * (3.0 * t * t - 2.0 * t * t * t)
}

impl LandGenerator for ValueNoiseLandGenerator {
    fn seed(&self) -> Seed {
        self.seed
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        let mut grid_size = MAX_GRID_SIZE;
        let mut level_height = MAX_LEVEL_HEIGHT;
        let mut result = BASE_HEIGHT;

        for level in 0..LEVEL_NUM {
            let gx = x.div_euclid(grid_size);
            let gz = z.div_euclid(grid_size);

            let h00 = self.corner(gx, gz, level);
            let h10 = self.corner(gx + 1, gz, level);
            let h01 = self.corner(gx, gz + 1, level);
            let h11 = self.corner(gx + 1, gz + 1, level);
            let tx = (x - gx * grid_size) as f32 / grid_size as f32;
            let tz = (z - gz * grid_size) as f32 / grid_size as f32;

            result += level_height
                * smooth_lerp(smooth_lerp(h00, h10, tx), smooth_lerp(h01, h11, tx), tz);
            grid_size /= 2;
            level_height *= LEVEL_HEIGHT_DECAY;
        }

        result as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_heights_for_seed_42() {
        let generator = ValueNoiseLandGenerator::new(42);
        assert_eq!(generator.surface_height(0, 0), 64);
        assert_eq!(generator.surface_height(5, 7), 63);
        assert_eq!(generator.surface_height(-1, -1), 64);
    }

    #[test]
    fn heights_depend_on_seed() {
        let a = ValueNoiseLandGenerator::new(1);
        let b = ValueNoiseLandGenerator::new(2);
        let differs = (0..64).any(|i| a.surface_height(i * 37, i * 11) != b.surface_height(i * 37, i * 11));
        assert!(differs);
    }

    #[test]
    fn heights_stay_within_octave_bounds() {
        let generator = ValueNoiseLandGenerator::new(7);
        for x in (-500..500).step_by(13) {
            for z in (-500..500).step_by(17) {
                let h = generator.surface_height(x, z);
                assert!((10..=94).contains(&h), "height {} at ({}, {})", h, x, z);
            }
        }
    }

    #[test]
    fn adjacent_columns_are_continuous() {
        // Each octave's slope is at most 1.5 · amplitude / grid size, summed over octaves
        // that is under 4 blocks per column; truncation adds at most one more.
        let generator = ValueNoiseLandGenerator::new(42);
        for x in -200..200 {
            for z in [-130, -3, 0, 64, 127] {
                let h = generator.surface_height(x, z);
                let dx = (h - generator.surface_height(x + 1, z)).abs();
                let dz = (h - generator.surface_height(x, z + 1)).abs();
                assert!(dx <= 5 && dz <= 5, "cliff at ({}, {}): {} {}", x, z, dx, dz);
            }
        }
    }
}
