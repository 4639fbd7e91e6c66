//! One-shot world generation from a seed.
//!
//! [`TerrainWorld`] owns the single [`Heightfield`] every consumer reads. The
//! mesh, the placements and (through [`TerrainWorld::heightfield`]) the
//! locomotion controller all see the same `Arc`, so visual ground and
//! gameplay ground cannot drift apart.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TerrainError;
use crate::heightfield::{Heightfield, HeightfieldParams};
use crate::mesh::{MAX_SUBDIVISIONS, TerrainMesh};
use crate::placement::{ExhaustionPolicy, Placement, PlacementEngine, PlacementRule};

/// Mixed into the world seed for the placement RNG so scatter draws are
/// independent of the permutation-table draws.
const PLACEMENT_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything needed to generate a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldParams {
    /// World seed.
    pub seed: u64,
    /// Side length of the square terrain.
    pub terrain_size: f64,
    /// Mesh cells per side.
    pub subdivisions: u32,
    /// Noise-to-world mapping.
    pub heightfield: HeightfieldParams,
    /// Scenery categories, placed in order.
    pub rules: Vec<PlacementRule>,
    /// Behaviour when a rule cannot place an instance.
    pub exhaustion: ExhaustionPolicy,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain_size: 256.0,
            subdivisions: 100,
            heightfield: HeightfieldParams::default(),
            rules: vec![PlacementRule::trees(), PlacementRule::houses()],
            exhaustion: ExhaustionPolicy::Abort,
        }
    }
}

/// A generated world: heightfield, surface mesh and scenery.
#[derive(Clone, Debug)]
pub struct TerrainWorld {
    seed: u64,
    terrain_size: f64,
    heightfield: Arc<Heightfield>,
    mesh: TerrainMesh,
    placements: Vec<Placement>,
}

impl WorldParams {
    /// Check the parameters the mesh builder and heightfield rely on.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let invalid = |reason: &str| TerrainError::InvalidWorld {
            reason: reason.to_string(),
        };
        if self.subdivisions == 0 {
            return Err(invalid("subdivisions must be positive"));
        }
        if self.subdivisions > MAX_SUBDIVISIONS {
            return Err(invalid(&format!(
                "subdivisions must be at most {MAX_SUBDIVISIONS} so vertex indices fit in u32"
            )));
        }
        if !(self.terrain_size.is_finite() && self.terrain_size > 0.0) {
            return Err(invalid("terrain size must be positive and finite"));
        }
        let hf = &self.heightfield;
        if !(hf.horizontal_scale.is_finite() && hf.horizontal_scale > 0.0) {
            return Err(invalid("horizontal scale must be positive and finite"));
        }
        if !hf.vertical_amplitude.is_finite() {
            return Err(invalid("vertical amplitude must be finite"));
        }
        Ok(())
    }
}

impl TerrainWorld {
    /// Generate the heightfield, mesh and every placement rule.
    pub fn generate(params: &WorldParams) -> Result<Self, TerrainError> {
        params.validate()?;
        let start = Instant::now();

        let heightfield = Arc::new(Heightfield::from_seed(params.seed, params.heightfield));
        let mesh = TerrainMesh::build(&heightfield, params.terrain_size, params.subdivisions);
        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "Terrain mesh built"
        );

        let engine = PlacementEngine::new(Arc::clone(&heightfield), params.terrain_size);
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed ^ PLACEMENT_STREAM);
        let placements = params
            .rules
            .iter()
            .map(|rule| engine.place_with_policy(rule, &mut rng, params.exhaustion))
            .collect::<Result<Vec<_>, _>>()?;

        let (lo, hi) = mesh.height_range();
        info!(
            seed = params.seed,
            objects = placements.iter().map(Placement::len).sum::<usize>(),
            "World generated in {:.1} ms, relief {lo:.2}..{hi:.2}",
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self {
            seed: params.seed,
            terrain_size: params.terrain_size,
            heightfield,
            mesh,
            placements,
        })
    }

    /// Seed the world was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Side length of the terrain square.
    pub fn terrain_size(&self) -> f64 {
        self.terrain_size
    }

    /// The shared heightfield. Clone the `Arc` to hand it to other consumers.
    pub fn heightfield(&self) -> &Arc<Heightfield> {
        &self.heightfield
    }

    /// Ground height at `(x, z)`.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.heightfield.height(x, z)
    }

    /// Terrain surface mesh.
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    /// Placements in rule order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placement for `category`, if a rule produced one.
    pub fn placement(&self, category: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(seed: u64) -> WorldParams {
        WorldParams {
            seed,
            subdivisions: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_reference_world() {
        let world = TerrainWorld::generate(&small_params(42)).unwrap();
        assert_eq!(world.placement("tree").map(Placement::len), Some(300));
        assert_eq!(world.placement("house").map(Placement::len), Some(50));
        assert!(world.placement("boulder").is_none());
        assert_eq!(world.mesh().vertex_count(), 17 * 17);
    }

    #[test]
    fn test_mesh_and_placements_share_heightfield() {
        let world = TerrainWorld::generate(&small_params(9)).unwrap();
        for p in world.mesh().positions() {
            let h = world.height(f64::from(p[0]), f64::from(p[2])) as f32;
            assert!((p[1] - h).abs() < 1e-4);
        }
        for placement in world.placements() {
            for inst in &placement.instances {
                assert_eq!(inst.position.y, world.height(inst.position.x, inst.position.z));
            }
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = TerrainWorld::generate(&small_params(5)).unwrap();
        let b = TerrainWorld::generate(&small_params(5)).unwrap();
        assert_eq!(a.placements(), b.placements());
        assert_eq!(a.mesh().positions(), b.mesh().positions());
    }

    #[test]
    fn test_different_seed_different_world() {
        let a = TerrainWorld::generate(&small_params(5)).unwrap();
        let b = TerrainWorld::generate(&small_params(6)).unwrap();
        assert_ne!(a.placements(), b.placements());
    }

    #[test]
    fn test_exhausted_rule_fails_generation() {
        let mut params = small_params(1);
        params.rules.push(PlacementRule {
            category: "peak".to_string(),
            min_height: 100.0,
            max_height: 200.0,
            max_attempts: 50,
            ..PlacementRule::houses()
        });
        let err = TerrainWorld::generate(&params).unwrap_err();
        assert!(matches!(err, TerrainError::PlacementExhausted { ref category, .. } if category == "peak"));
    }

    #[test]
    fn test_invalid_world_rejected() {
        let zero = WorldParams {
            subdivisions: 0,
            ..small_params(1)
        };
        assert!(matches!(
            TerrainWorld::generate(&zero),
            Err(TerrainError::InvalidWorld { .. })
        ));
        let dense = WorldParams {
            subdivisions: MAX_SUBDIVISIONS + 1,
            ..small_params(1)
        };
        assert!(
            matches!(dense.validate(), Err(TerrainError::InvalidWorld { .. })),
            "Vertex indices past u32 must be rejected before meshing"
        );
        let mut flat_scale = small_params(1);
        flat_scale.heightfield.horizontal_scale = 0.0;
        assert!(flat_scale.validate().is_err());
        assert!(small_params(1).validate().is_ok());
    }

    #[test]
    fn test_skip_policy_keeps_generating() {
        let mut params = small_params(1);
        params.exhaustion = ExhaustionPolicy::Skip;
        params.rules.push(PlacementRule {
            category: "peak".to_string(),
            count: 3,
            min_height: 100.0,
            max_height: 200.0,
            max_attempts: 50,
            ..PlacementRule::houses()
        });
        let world = TerrainWorld::generate(&params).unwrap();
        let peak = world.placement("peak").unwrap();
        assert!(peak.is_empty());
        assert_eq!(peak.skipped, 3);
        assert_eq!(world.placement("tree").map(Placement::len), Some(300));
    }
}
