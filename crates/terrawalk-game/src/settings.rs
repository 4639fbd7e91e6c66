//! Config sections to engine parameters.

use glam::DVec3;
use terrawalk_config::{Config, ScatterConfig};
use terrawalk_player::LocomotionParams;
use terrawalk_terrain::{
    ExhaustionPolicy, HeightfieldParams, PlacementRule, SimplexSkew, WorldParams,
};

/// World generation parameters from the `world`, `trees` and `houses` sections.
pub fn world_params(config: &Config) -> WorldParams {
    let world = &config.world;
    WorldParams {
        seed: world.seed,
        terrain_size: world.terrain_size,
        subdivisions: world.subdivisions,
        heightfield: HeightfieldParams {
            horizontal_scale: world.horizontal_scale,
            vertical_amplitude: world.vertical_amplitude,
            skew: if world.reference_skew {
                SimplexSkew::Reference
            } else {
                SimplexSkew::Tetrahedral
            },
        },
        rules: vec![
            scatter_rule(PlacementRule::trees(), &config.trees),
            scatter_rule(PlacementRule::houses(), &config.houses),
        ],
        exhaustion: if world.skip_exhausted {
            ExhaustionPolicy::Skip
        } else {
            ExhaustionPolicy::Abort
        },
    }
}

/// Locomotion tunables from the `locomotion` section.
pub fn locomotion_params(config: &Config) -> LocomotionParams {
    let loco = &config.locomotion;
    LocomotionParams {
        movement_speed: loco.movement_speed,
        turn_speed: loco.turn_speed,
        entity_radius: loco.entity_radius,
        camera_offset: DVec3::from_array(loco.camera_offset),
    }
}

fn scatter_rule(base: PlacementRule, scatter: &ScatterConfig) -> PlacementRule {
    PlacementRule {
        count: scatter.count,
        extent_fraction: scatter.extent_fraction,
        min_height: scatter.min_height,
        max_height: scatter.max_height,
        max_attempts: scatter.max_attempts,
        ..base
    }
}
