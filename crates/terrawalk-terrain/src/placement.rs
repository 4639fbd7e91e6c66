//! Scenery placement by rejection sampling against the heightfield.
//!
//! Each instance draws uniform `(x, z)` candidates inside the rule's square
//! extent until the ground height falls within the rule's band. The number of
//! draws per instance is capped; hitting the cap is reported as
//! [`TerrainError::PlacementExhausted`] instead of looping forever.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

use glam::{DMat4, DQuat, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TerrainError;
use crate::heightfield::Heightfield;

/// Default cap on candidate draws per instance.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Instances reserved up front; larger rules grow as they place.
const PREALLOCATED_INSTANCES: usize = 4096;

/// A named sub-part stacked on top of the ground point (trunk, roof, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartOffset {
    /// Part name, used to pick the mesh for instanced submission.
    pub name: String,
    /// Height of the part's origin above the ground.
    pub offset: f64,
    /// Multiply `offset` by the instance scale.
    pub scaled: bool,
}

impl PartOffset {
    /// Offset that grows with the instance scale.
    pub fn scaled(name: &str, offset: f64) -> Self {
        Self {
            name: name.to_string(),
            offset,
            scaled: true,
        }
    }

    /// Offset independent of the instance scale.
    pub fn fixed(name: &str, offset: f64) -> Self {
        Self {
            name: name.to_string(),
            offset,
            scaled: false,
        }
    }

    fn lift(&self, scale: f64) -> f64 {
        if self.scaled {
            self.offset * scale
        } else {
            self.offset
        }
    }
}

/// How an accepted instance is sized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScalePolicy {
    /// Every instance uses this scale.
    Fixed(f64),
    /// `base + U[0, 1) * spread`.
    Jitter {
        /// Smallest scale.
        base: f64,
        /// Width of the jitter band.
        spread: f64,
    },
}

/// How an accepted instance is turned about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPolicy {
    /// Any yaw in `[0, 2π)`.
    Free,
    /// Yaw snapped to a multiple of 90°.
    QuarterTurns,
}

/// Declarative description of one scenery category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    /// Category name (`"tree"`, `"house"`, ...).
    pub category: String,
    /// Number of instances to place.
    pub count: usize,
    /// Side of the sampling square as a fraction of the terrain size.
    pub extent_fraction: f64,
    /// Lowest accepted ground height.
    pub min_height: f64,
    /// Highest accepted ground height.
    pub max_height: f64,
    /// Sub-parts stacked above the ground point.
    pub parts: Vec<PartOffset>,
    /// Instance sizing.
    pub scale: ScalePolicy,
    /// Instance yaw.
    pub rotation: RotationPolicy,
    /// Candidate draws allowed per instance.
    pub max_attempts: u32,
}

impl PlacementRule {
    /// 300 trees on gentle high ground: trunk plus foliage, jittered size, free yaw.
    pub fn trees() -> Self {
        Self {
            category: "tree".to_string(),
            count: 300,
            extent_fraction: 0.9,
            min_height: 1.0,
            max_height: 10.0,
            parts: vec![
                PartOffset::scaled("trunk", 1.0),
                PartOffset::scaled("foliage", 2.5),
            ],
            scale: ScalePolicy::Jitter {
                base: 0.9,
                spread: 0.2,
            },
            rotation: RotationPolicy::Free,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// 50 houses on low, dry ground: base plus roof, unit size, grid-aligned.
    pub fn houses() -> Self {
        Self {
            category: "house".to_string(),
            count: 50,
            extent_fraction: 0.8,
            min_height: 0.5,
            max_height: 5.0,
            parts: vec![PartOffset::fixed("base", 1.0), PartOffset::fixed("roof", 2.75)],
            scale: ScalePolicy::Fixed(1.0),
            rotation: RotationPolicy::QuarterTurns,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Half the side length of the sampling square for a terrain of `terrain_size`.
    pub fn half_extent(&self, terrain_size: f64) -> f64 {
        terrain_size * self.extent_fraction / 2.0
    }

    /// Reject rules that cannot be sampled meaningfully.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let invalid = |reason: &str| TerrainError::InvalidRule {
            category: self.category.clone(),
            reason: reason.to_string(),
        };
        if !(self.extent_fraction > 0.0 && self.extent_fraction <= 1.0) {
            return Err(invalid("extent fraction must be in (0, 1]"));
        }
        if !self.min_height.is_finite() || !self.max_height.is_finite() {
            return Err(invalid("height band must be finite"));
        }
        if self.min_height > self.max_height {
            return Err(invalid("min height exceeds max height"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max attempts must be positive"));
        }
        let scale_ok = match self.scale {
            ScalePolicy::Fixed(s) => s.is_finite() && s > 0.0,
            ScalePolicy::Jitter { base, spread } => {
                base.is_finite() && spread.is_finite() && base > 0.0 && spread >= 0.0
            }
        };
        if !scale_ok {
            return Err(invalid("scale must be positive and finite"));
        }
        Ok(())
    }
}

/// One placed object: ground anchor, yaw and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectInstance {
    /// Ground point the object stands on; `y` is the terrain height there.
    pub position: DVec3,
    /// Rotation about +Y in radians.
    pub yaw: f64,
    /// Uniform scale.
    pub scale: f64,
}

/// World transform of one sub-part of an instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartTransform {
    /// Part origin in world space.
    pub position: DVec3,
    /// Rotation about +Y in radians.
    pub yaw: f64,
    /// Uniform scale.
    pub scale: f64,
}

impl PartTransform {
    /// Scale, then rotate about Y, then translate.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            DVec3::splat(self.scale),
            DQuat::from_rotation_y(self.yaw),
            self.position,
        )
    }
}

/// What to do when an instance exhausts its retry budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Fail the whole rule.
    #[default]
    Abort,
    /// Drop the instance and keep going.
    Skip,
}

/// All instances produced for one rule, in placement order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Category of the rule that produced this placement.
    pub category: String,
    /// Sub-parts of every instance.
    pub parts: Vec<PartOffset>,
    /// Accepted instances.
    pub instances: Vec<SceneObjectInstance>,
    /// Instances dropped under [`ExhaustionPolicy::Skip`].
    pub skipped: usize,
    /// Total candidate draws, accepted or not.
    pub attempts: u64,
}

impl Placement {
    /// Number of placed instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Transforms of the part at `part_index` for every instance, in order.
    pub fn part_transforms(&self, part_index: usize) -> impl Iterator<Item = PartTransform> + '_ {
        let part = self.parts.get(part_index);
        self.instances.iter().filter_map(move |inst| {
            let part = part?;
            Some(PartTransform {
                position: inst.position + DVec3::Y * part.lift(inst.scale),
                yaw: inst.yaw,
                scale: inst.scale,
            })
        })
    }

    /// Transforms of the part named `name`, or `None` if the rule has no such part.
    pub fn part_transforms_by_name(
        &self,
        name: &str,
    ) -> Option<impl Iterator<Item = PartTransform> + '_> {
        let index = self.parts.iter().position(|p| p.name == name)?;
        Some(self.part_transforms(index))
    }
}

/// Scatters instances over the shared heightfield.
#[derive(Clone, Debug)]
pub struct PlacementEngine {
    heightfield: Arc<Heightfield>,
    terrain_size: f64,
}

impl PlacementEngine {
    /// Create an engine sampling a square terrain of side `terrain_size`.
    pub fn new(heightfield: Arc<Heightfield>, terrain_size: f64) -> Self {
        Self {
            heightfield,
            terrain_size,
        }
    }

    /// The heightfield candidates are tested against.
    pub fn heightfield(&self) -> &Arc<Heightfield> {
        &self.heightfield
    }

    /// Place every instance of `rule`, failing on the first exhausted instance.
    pub fn place<R: Rng + ?Sized>(
        &self,
        rule: &PlacementRule,
        rng: &mut R,
    ) -> Result<Placement, TerrainError> {
        self.place_with_policy(rule, rng, ExhaustionPolicy::Abort)
    }

    /// Place every instance of `rule`, handling exhaustion per `policy`.
    pub fn place_with_policy<R: Rng + ?Sized>(
        &self,
        rule: &PlacementRule,
        rng: &mut R,
        policy: ExhaustionPolicy,
    ) -> Result<Placement, TerrainError> {
        rule.validate()?;

        let mut placement = Placement {
            category: rule.category.clone(),
            parts: rule.parts.clone(),
            instances: Vec::with_capacity(rule.count.min(PREALLOCATED_INSTANCES)),
            skipped: 0,
            attempts: 0,
        };

        for index in 0..rule.count {
            match self.sample_ground(rule, rng) {
                (Some(ground), attempts) => {
                    placement.attempts += u64::from(attempts);
                    let scale = match rule.scale {
                        ScalePolicy::Fixed(s) => s,
                        ScalePolicy::Jitter { base, spread } => {
                            base + rng.random::<f64>() * spread
                        }
                    };
                    let yaw = match rule.rotation {
                        RotationPolicy::Free => rng.random::<f64>() * TAU,
                        RotationPolicy::QuarterTurns => {
                            ((rng.random::<f64>() * 4.0).round() % 4.0) * FRAC_PI_2
                        }
                    };
                    placement.instances.push(SceneObjectInstance {
                        position: ground,
                        yaw,
                        scale,
                    });
                }
                (None, attempts) => {
                    placement.attempts += u64::from(attempts);
                    match policy {
                        ExhaustionPolicy::Abort => {
                            return Err(TerrainError::PlacementExhausted {
                                category: rule.category.clone(),
                                index,
                                attempts,
                            });
                        }
                        ExhaustionPolicy::Skip => {
                            warn!(
                                category = %rule.category,
                                index,
                                attempts,
                                "Dropping instance: no ground in height band"
                            );
                            placement.skipped += 1;
                        }
                    }
                }
            }
        }

        debug!(
            category = %rule.category,
            placed = placement.instances.len(),
            skipped = placement.skipped,
            attempts = placement.attempts,
            "Placement finished"
        );
        Ok(placement)
    }

    /// Draw candidates until one lands in the height band or the cap is hit.
    fn sample_ground<R: Rng + ?Sized>(
        &self,
        rule: &PlacementRule,
        rng: &mut R,
    ) -> (Option<DVec3>, u32) {
        let extent = self.terrain_size * rule.extent_fraction;
        let half = extent / 2.0;
        for attempt in 1..=rule.max_attempts {
            let x = rng.random::<f64>() * extent - half;
            let z = rng.random::<f64>() * extent - half;
            let y = self.heightfield.height(x, z);
            if (rule.min_height..=rule.max_height).contains(&y) {
                return (Some(DVec3::new(x, y, z)), attempt);
            }
        }
        (None, rule.max_attempts)
    }
}
