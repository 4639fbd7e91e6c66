//! Procedural terrain: seeded simplex noise, the shared heightfield, scenery
//! placement and the displaced surface mesh.

mod error;
mod heightfield;
mod mesh;
mod noise;
mod placement;
mod world;

pub use error::TerrainError;
pub use heightfield::{Heightfield, HeightfieldParams};
pub use mesh::{MAX_SUBDIVISIONS, TerrainMesh};
pub use noise::{PERMUTATION_SIZE, PermutationTable, SimplexNoise, SimplexSkew};
pub use placement::{
    DEFAULT_MAX_ATTEMPTS, ExhaustionPolicy, PartOffset, PartTransform, Placement, PlacementEngine,
    PlacementRule, RotationPolicy, ScalePolicy, SceneObjectInstance,
};
pub use world::{TerrainWorld, WorldParams};
