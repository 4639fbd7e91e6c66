//! Terrain generation error types.

/// Errors raised while building the terrain world.
///
/// Sampling the noise field or querying heights never fails; only
/// construction and placement can.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// The seed source did not provide a usable permutation table.
    #[error("invalid seed source: expected 256 permutation entries, got {got}")]
    Construction {
        /// Number of entries actually supplied.
        got: usize,
    },

    /// World parameters that cannot produce a terrain (zero subdivisions,
    /// non-positive size or scale).
    #[error("invalid world parameters: {reason}")]
    InvalidWorld {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// A placement rule is internally inconsistent.
    #[error("invalid placement rule `{category}`: {reason}")]
    InvalidRule {
        /// Category name of the offending rule.
        category: String,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Rejection sampling hit the retry cap without finding ground in the height band.
    #[error(
        "placement exhausted for `{category}` instance {index} after {attempts} attempts"
    )]
    PlacementExhausted {
        /// Category name of the rule being placed.
        category: String,
        /// Zero-based index of the instance that could not be placed.
        index: usize,
        /// Number of candidate draws made before giving up.
        attempts: u32,
    },
}
