//! terrawalk: generate a seeded terrain world and walk a player across it.
//!
//! Runs headless. The world is generated once from the config, then the
//! locomotion controller is ticked with scripted keyboard input and the
//! camera pose is logged. Placements and a heightmap preview can be exported.
//!
//! Run with: `cargo run -p terrawalk-game -- --seed 42 --frames 300`

mod export;
mod script;
mod settings;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use terrawalk_config::{CliArgs, Config};
use terrawalk_input::{ControlBindings, KeyboardState};
use terrawalk_player::{LocomotionController, ViewMode};
use terrawalk_terrain::TerrainWorld;
use tracing::{debug, info};

use crate::script::InputScript;

/// Orbit drift around the target, in radians per second.
const ORBIT_DRIFT_RATE: f64 = 0.1;

/// Fraction of the orbit distance closed per second while drifting.
const ORBIT_PUSH_IN_RATE: f64 = 0.05;

/// Spacing of the central differences behind the logged slope.
const SLOPE_EPS: f64 = 0.5;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => terrawalk_config::default_config_dir()?,
    };
    let mut config = Config::load_or_create(&config_dir)
        .with_context(|| format!("loading config from {}", config_dir.display()))?;
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terrawalk_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "terrawalk: seed {} | terrain {} x {} cells over {} units",
        config.world.seed,
        config.world.subdivisions,
        config.world.subdivisions,
        config.world.terrain_size
    );

    let world = TerrainWorld::generate(&settings::world_params(&config))
        .context("world generation failed")?;
    for placement in world.placements() {
        info!(
            category = %placement.category,
            placed = placement.len(),
            skipped = placement.skipped,
            "Scenery placed"
        );
    }

    if let Some(path) = &args.export {
        export::write_placements(&world, path)?;
    }
    if let Some(path) = &args.heightmap {
        export::write_heightmap(&world, path)?;
    }

    simulate(&world, &config);
    Ok(())
}

/// Tick the controller with scripted input for `simulation.frames` frames.
fn simulate(world: &TerrainWorld, config: &Config) {
    let mut bindings = ControlBindings::default();
    bindings.apply_overrides(&config.input.keybindings);

    let mut controller = LocomotionController::new(
        Arc::clone(world.heightfield()),
        settings::locomotion_params(config),
    );
    let frames = config.simulation.frames;
    let dt = config.simulation.frame_dt;
    let interval = config.debug.pose_log_interval;
    let script = InputScript::new(frames, &bindings);
    let mut keyboard = KeyboardState::new();

    for frame in 0..frames {
        keyboard.clear_transients();
        script.drive(frame, &mut keyboard);
        let intent = bindings.intent(&keyboard);
        let pose = controller.tick(dt, &intent);
        orbit_drift(&mut controller, dt);

        if interval > 0 && frame % interval == 0 {
            let state = controller.state();
            let slope = controller
                .heightfield()
                .normal(state.position.x, state.position.z, SLOPE_EPS)
                .angle_between(glam::DVec3::Y)
                .to_degrees();
            debug!(
                frame,
                mode = ?state.mode,
                slope,
                x = state.position.x,
                y = state.position.y,
                z = state.position.z,
                yaw = state.yaw,
                "Camera at ({:.2}, {:.2}, {:.2})",
                pose.position.x,
                pose.position.y,
                pose.position.z
            );
        }
    }

    let state = controller.state();
    info!(
        frames,
        mode = ?state.mode,
        "Finished at ({:.2}, {:.2}, {:.2}) facing {:.1} deg",
        state.position.x,
        state.position.y,
        state.position.z,
        state.yaw.to_degrees()
    );
}

/// Slowly circle and push in the orbit camera. Does nothing in Follow view.
fn orbit_drift(controller: &mut LocomotionController, dt: f64) {
    if controller.mode() != ViewMode::Orbit || !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let orbit = controller.orbit_camera_mut();
    orbit.rotate(ORBIT_DRIFT_RATE * dt, 0.0);
    orbit.zoom(1.0 - ORBIT_PUSH_IN_RATE * dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrawalk_player::LocomotionParams;
    use terrawalk_terrain::WorldParams;

    fn controller() -> LocomotionController {
        let world = TerrainWorld::generate(&WorldParams {
            seed: 5,
            subdivisions: 4,
            ..Default::default()
        })
        .unwrap();
        LocomotionController::new(Arc::clone(world.heightfield()), LocomotionParams::default())
    }

    #[test]
    fn test_orbit_drift_circles_and_pushes_in() {
        let mut controller = controller();
        let before = controller.orbit_camera().clone();
        orbit_drift(&mut controller, 1.0);
        let after = controller.orbit_camera();
        assert!((after.azimuth - before.azimuth - ORBIT_DRIFT_RATE).abs() < 1e-12);
        assert!(after.distance < before.distance);
        assert_eq!(after.target, before.target);

        for _ in 0..10_000 {
            orbit_drift(&mut controller, 1.0);
        }
        let cam = controller.orbit_camera();
        assert_eq!(cam.distance, cam.min_distance);
    }

    #[test]
    fn test_orbit_drift_idle_in_follow_view() {
        let mut controller = controller();
        controller.toggle_view();
        assert_eq!(controller.mode(), ViewMode::Follow);
        let before = controller.orbit_camera().clone();
        orbit_drift(&mut controller, 1.0);
        assert_eq!(controller.orbit_camera(), &before);
    }

    #[test]
    fn test_orbit_drift_ignores_bad_dt() {
        let mut controller = controller();
        let before = controller.orbit_camera().clone();
        orbit_drift(&mut controller, f64::NAN);
        orbit_drift(&mut controller, -1.0);
        assert_eq!(controller.orbit_camera(), &before);
    }
}
