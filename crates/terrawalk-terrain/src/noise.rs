//! Seeded 3D simplex gradient noise over a fixed permutation table.
//!
//! Two skew constant pairs are supported. [`SimplexSkew::Reference`] is the
//! 2D `(√3−1)/2`, `(3−√3)/6` pair applied in 3D. It is kept bit-exact so
//! existing seeds reproduce the same terrain, but it leaves flat zero
//! plateaus and jumps across cell boundaries in the `y = 0` slice.
//! [`SimplexSkew::Tetrahedral`] is the regular 3-simplex pair `1/3`, `1/6`
//! and is continuous everywhere.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Number of distinct lattice hashes in the base table.
pub const PERMUTATION_SIZE: usize = 256;

/// Normalises the summed corner contributions into roughly `[-1, 1]`.
const OUTPUT_SCALE: f64 = 32.0;

/// Skew/unskew constant pair used to map points onto the simplex lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimplexSkew {
    /// `F = (√3 − 1) / 2`, `G = (3 − √3) / 6`.
    ///
    /// Required for bit-compatible output with other generators that use
    /// these constants in 3D. The field is not continuous across cells.
    Reference,
    /// `F = 1/3`, `G = 1/6`. Continuous across cell boundaries.
    #[default]
    Tetrahedral,
}

impl SimplexSkew {
    /// `(skew, unskew)` factors.
    pub const fn factors(self) -> (f64, f64) {
        match self {
            Self::Reference => (0.366_025_403_784_438_6, 0.211_324_865_405_187_13),
            Self::Tetrahedral => (1.0 / 3.0, 1.0 / 6.0),
        }
    }
}

/// The twelve cube-edge gradient directions.
const GRADIENTS: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Doubled lattice hash table. Entry `i` and `i + 256` are always equal, so
/// chained lookups of the form `perm[a + perm[b]]` never need a modulo.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; PERMUTATION_SIZE * 2],
}

impl PermutationTable {
    fn from_base(base: &[u8; PERMUTATION_SIZE]) -> Self {
        let mut perm = [0u8; PERMUTATION_SIZE * 2];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = base[i & 255];
        }
        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// The full 512-entry table.
    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

/// Deterministic simplex noise generator.
///
/// All output is fixed by the permutation table built at construction; the
/// generator holds no other state and can be shared freely across threads.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    table: PermutationTable,
    skew: SimplexSkew,
}

impl SimplexNoise {
    /// Build a generator by drawing one uniform integer in `[0, 256)` per base
    /// table slot from `rng`. Duplicate entries are allowed.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut base = [0u8; PERMUTATION_SIZE];
        for slot in base.iter_mut() {
            *slot = rng.random_range(0..=255u8);
        }
        Self {
            table: PermutationTable::from_base(&base),
            skew: SimplexSkew::default(),
        }
    }

    /// Build a generator from a world seed via a `ChaCha8Rng` stream.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::new(&mut rng)
    }

    /// Build a generator from an explicit 256-entry base table.
    pub fn from_permutation(base: &[u8]) -> Result<Self, TerrainError> {
        let base: &[u8; PERMUTATION_SIZE] = base
            .try_into()
            .map_err(|_| TerrainError::Construction { got: base.len() })?;
        Ok(Self {
            table: PermutationTable::from_base(base),
            skew: SimplexSkew::default(),
        })
    }

    /// Switch the lattice skew. The permutation table is unchanged.
    #[must_use]
    pub fn with_skew(mut self, skew: SimplexSkew) -> Self {
        self.skew = skew;
        self
    }

    /// Skew constants in use.
    pub fn skew(&self) -> SimplexSkew {
        self.skew
    }

    /// The permutation table backing this generator.
    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Sample the noise field at a 3D point. Output lies within `[-1, 1]`.
    pub fn sample3(&self, xin: f64, yin: f64, zin: f64) -> f64 {
        let (skew, unskew) = self.skew.factors();
        let s = (xin + yin + zin) * skew;
        let i = (xin + s).floor();
        let j = (yin + s).floor();
        let k = (zin + s).floor();

        let t = (i + j + k) * unskew;
        let x0 = xin - (i - t);
        let y0 = yin - (j - t);
        let z0 = zin - (k - t);

        // Offsets of the second and third simplex corners.
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f64 + unskew;
        let y1 = y0 - j1 as f64 + unskew;
        let z1 = z0 - k1 as f64 + unskew;
        let x2 = x0 - i2 as f64 + 2.0 * unskew;
        let y2 = y0 - j2 as f64 + 2.0 * unskew;
        let z2 = z0 - k2 as f64 + 2.0 * unskew;
        let x3 = x0 - 1.0 + 3.0 * unskew;
        let y3 = y0 - 1.0 + 3.0 * unskew;
        let z3 = z0 - 1.0 + 3.0 * unskew;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let kk = (k as i64 & 255) as usize;

        let gi0 = self.gradient_index(ii, jj, kk);
        let gi1 = self.gradient_index(ii + i1, jj + j1, kk + k1);
        let gi2 = self.gradient_index(ii + i2, jj + j2, kk + k2);
        let gi3 = self.gradient_index(ii + 1, jj + 1, kk + 1);

        let n0 = corner(gi0, x0, y0, z0);
        let n1 = corner(gi1, x1, y1, z1);
        let n2 = corner(gi2, x2, y2, z2);
        let n3 = corner(gi3, x3, y3, z3);

        OUTPUT_SCALE * (n0 + n1 + n2 + n3)
    }

    /// Sample the `y = 0` slice of the field, used for heightfields.
    #[inline]
    pub fn sample2(&self, x: f64, z: f64) -> f64 {
        self.sample3(x, z, 0.0)
    }

    #[inline]
    fn gradient_index(&self, i: usize, j: usize, k: usize) -> usize {
        let t = &self.table;
        t.get(i + t.get(j + t.get(k))) % GRADIENTS.len()
    }
}

/// Contribution of one simplex corner: `t⁴ · (g · d)` inside the kernel radius.
#[inline]
fn corner(gi: usize, x: f64, y: f64, z: f64) -> f64 {
    let mut t = 0.5 - x * x - y * y - z * z;
    if t < 0.0 {
        return 0.0;
    }
    t *= t;
    let g = GRADIENTS[gi];
    t * t * (g[0] * x + g[1] * y + g[2] * z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strided_base() -> Vec<u8> {
        (0..256u32).map(|i| ((i * 7 + 3) % 256) as u8).collect()
    }

    #[test]
    fn test_known_values_for_fixed_table() {
        let noise = SimplexNoise::from_permutation(&strided_base())
            .unwrap()
            .with_skew(SimplexSkew::Reference);
        let cases = [
            ((0.3, 0.0, 0.7), -0.139_201_111_917_139_4),
            ((1.25, -2.5, 3.75), -0.304_986_044_205_818_5),
            ((-7.1, 0.0, 4.2), 0.070_741_431_775_726_42),
        ];
        for ((x, y, z), expected) in cases {
            let got = noise.sample3(x, y, z);
            assert!(
                (got - expected).abs() < 1e-12,
                "sample3({x}, {y}, {z}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = SimplexNoise::from_seed(42);
        let b = SimplexNoise::from_seed(42);
        assert_eq!(a.table(), b.table());
        for i in 0..500 {
            let p = i as f64 * 0.173;
            assert_eq!(
                a.sample3(p, -p * 0.5, p * 1.7).to_bits(),
                b.sample3(p, -p * 0.5, p * 1.7).to_bits(),
                "Same seed must be bit-identical at step {i}"
            );
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SimplexNoise::from_seed(1);
        let b = SimplexNoise::from_seed(2);
        let differs = (0..100).any(|i| {
            let p = 0.37 + i as f64 * 0.61;
            a.sample3(p, 0.0, p * 0.3) != b.sample3(p, 0.0, p * 0.3)
        });
        assert!(differs, "Different seeds should produce different fields");
    }

    #[test]
    fn test_output_bounded() {
        let noise = SimplexNoise::from_seed(99);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50_000 {
            let x = rng.random_range(-300.0..300.0);
            let y = rng.random_range(-300.0..300.0);
            let z = rng.random_range(-300.0..300.0);
            let n = noise.sample3(x, y, z);
            assert!(n.abs() <= 1.0 + 1e-9, "|noise({x}, {y}, {z})| = {n} > 1");
        }
    }

    #[test]
    fn test_negative_coordinates_wrap_table() {
        let noise = SimplexNoise::from_seed(3);
        // Far negative lattice cells must mask into the table, not panic.
        let n = noise.sample3(-1.0e6 + 0.25, -4096.5, -77.125);
        assert!(n.is_finite());
    }

    #[test]
    fn test_sample2_is_zero_y_slice() {
        let noise = SimplexNoise::from_seed(11);
        for i in 0..100 {
            let x = i as f64 * 0.31 - 15.0;
            let z = i as f64 * -0.17 + 4.0;
            assert_eq!(noise.sample2(x, z), noise.sample3(x, z, 0.0));
        }
    }

    #[test]
    fn test_table_is_doubled() {
        let noise = SimplexNoise::from_seed(123);
        let perm = noise.table().as_slice();
        assert_eq!(perm.len(), 512);
        for i in 0..256 {
            assert_eq!(perm[i], perm[i + 256], "Entry {i} not mirrored");
        }
    }

    #[test]
    fn test_wrong_table_length_rejected() {
        let err = SimplexNoise::from_permutation(&[0u8; 100]).unwrap_err();
        assert_eq!(err, TerrainError::Construction { got: 100 });
    }

    #[test]
    fn test_reference_skew_factors_exact() {
        let (f, g) = SimplexSkew::Reference.factors();
        assert_eq!(f, 0.5 * (3.0_f64.sqrt() - 1.0));
        assert_eq!(g, (3.0 - 3.0_f64.sqrt()) / 6.0);
    }

    #[test]
    fn test_reference_skew_is_opt_in() {
        assert_eq!(SimplexSkew::default(), SimplexSkew::Tetrahedral);
        let noise = SimplexNoise::from_seed(42);
        assert_eq!(noise.skew(), SimplexSkew::Tetrahedral);
        let reference = noise.clone().with_skew(SimplexSkew::Reference);
        assert_eq!(reference.table(), noise.table(), "Switching skew keeps the table");
        let differs = (0..50).any(|i| {
            let x = f64::from(i) * 0.37;
            reference.sample2(x, 1.3) != noise.sample2(x, 1.3)
        });
        assert!(differs, "Skews must produce different fields");
    }

    #[test]
    fn test_reference_skew_bounded() {
        let noise = SimplexNoise::from_seed(4).with_skew(SimplexSkew::Reference);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..20_000 {
            let x = rng.random_range(-50.0..50.0);
            let z = rng.random_range(-50.0..50.0);
            assert!(noise.sample2(x, z).abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_continuous_along_line() {
        let noise = SimplexNoise::from_seed(8);
        let step = 1e-3;
        for i in 0..20_000 {
            let x = i as f64 * step;
            let a = noise.sample2(x, 0.4);
            let b = noise.sample2(x + step, 0.4);
            assert!(
                (b - a).abs() < 0.05,
                "Jump of {} between x={x} and x+{step}",
                (b - a).abs()
            );
        }
    }
}
