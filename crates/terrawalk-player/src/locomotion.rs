//! Ground-following locomotion with orbit and follow views.
//!
//! The controlled entity lives on the shared [`Heightfield`]. Each
//! [`LocomotionController::tick`] first handles a view toggle, then (in
//! follow view only) turns, walks and re-snaps the entity to the ground.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{DQuat, DVec3};
use terrawalk_input::MovementIntent;
use terrawalk_terrain::Heightfield;
use tracing::debug;

use crate::orbit_camera::{CameraPose, OrbitCamera};

/// Tunables for walking and the follow camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionParams {
    /// Walk speed in units per second.
    pub movement_speed: f64,
    /// Turn rate in radians per second.
    pub turn_speed: f64,
    /// Height of the entity centre above the ground.
    pub entity_radius: f64,
    /// Follow-camera offset in the entity's local frame (+Z is behind).
    pub camera_offset: DVec3,
}

impl Default for LocomotionParams {
    fn default() -> Self {
        Self {
            movement_speed: 8.0,
            turn_speed: FRAC_PI_2,
            entity_radius: 0.5,
            camera_offset: DVec3::new(0.0, 5.0, 12.0),
        }
    }
}

/// Which camera drives the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Free orbit around a target. The entity is hidden and input does not move it.
    #[default]
    Orbit,
    /// Third-person camera locked behind the entity.
    Follow,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Orbit => Self::Follow,
            Self::Follow => Self::Orbit,
        }
    }
}

/// Entity pose and current view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionState {
    /// Entity centre. `y` is always ground height plus the radius.
    pub position: DVec3,
    /// Heading in radians around +Y. Zero faces `-Z`.
    pub yaw: f64,
    /// Active view.
    pub mode: ViewMode,
}

/// Drives the entity across the heightfield and owns both cameras.
#[derive(Clone, Debug)]
pub struct LocomotionController {
    heightfield: Arc<Heightfield>,
    params: LocomotionParams,
    state: LocomotionState,
    orbit: OrbitCamera,
}

impl LocomotionController {
    /// Spawn at the origin, resting on the ground, in orbit view.
    pub fn new(heightfield: Arc<Heightfield>, params: LocomotionParams) -> Self {
        let ground = heightfield.height(0.0, 0.0);
        let state = LocomotionState {
            position: DVec3::new(0.0, ground + params.entity_radius, 0.0),
            yaw: 0.0,
            mode: ViewMode::Orbit,
        };
        Self {
            heightfield,
            params,
            state,
            orbit: OrbitCamera::default(),
        }
    }

    /// Replace the orbit camera, e.g. to apply custom limits.
    #[must_use]
    pub fn with_orbit_camera(mut self, orbit: OrbitCamera) -> Self {
        self.orbit = orbit;
        self
    }

    /// Current entity pose and view.
    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// Active view mode.
    pub fn mode(&self) -> ViewMode {
        self.state.mode
    }

    /// Walking parameters.
    pub fn params(&self) -> &LocomotionParams {
        &self.params
    }

    /// The heightfield the entity walks on.
    pub fn heightfield(&self) -> &Arc<Heightfield> {
        &self.heightfield
    }

    /// The orbit camera (active in [`ViewMode::Orbit`]).
    pub fn orbit_camera(&self) -> &OrbitCamera {
        &self.orbit
    }

    /// Mutable orbit camera for mouse rotate and zoom.
    pub fn orbit_camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.orbit
    }

    /// `true` when the entity should be drawn.
    pub fn entity_visible(&self) -> bool {
        self.state.mode == ViewMode::Follow
    }

    /// Unit facing direction in the XZ plane.
    pub fn forward(&self) -> DVec3 {
        self.rotation() * DVec3::NEG_Z
    }

    /// Ground point directly below the entity.
    pub fn ground_position(&self) -> DVec3 {
        let p = self.state.position;
        DVec3::new(p.x, self.heightfield.height(p.x, p.z), p.z)
    }

    /// Camera pose for the active view.
    pub fn camera_pose(&self) -> CameraPose {
        match self.state.mode {
            ViewMode::Orbit => self.orbit.pose(),
            ViewMode::Follow => self.follow_pose(),
        }
    }

    /// Switch views. Entering orbit view re-targets the orbit camera on the
    /// entity's ground point, starting from where the follow camera was.
    pub fn toggle_view(&mut self) {
        let next = self.state.mode.toggled();
        if next == ViewMode::Orbit {
            let eye = self.follow_pose().position;
            self.orbit.look_from(eye, self.ground_position());
        }
        debug!(from = ?self.state.mode, to = ?next, "View mode changed");
        self.state.mode = next;
    }

    /// Advance by `dt` seconds. Negative or non-finite `dt` is treated as zero.
    pub fn tick(&mut self, dt: f64, intent: &MovementIntent) -> CameraPose {
        if intent.toggle_view {
            self.toggle_view();
        }
        if self.state.mode == ViewMode::Follow {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            self.step(dt, intent);
        }
        self.camera_pose()
    }

    fn step(&mut self, dt: f64, intent: &MovementIntent) {
        let turn = self.params.turn_speed * dt;
        if intent.turn_left {
            self.state.yaw += turn;
        }
        if intent.turn_right {
            self.state.yaw -= turn;
        }

        let stride = self.forward() * (self.params.movement_speed * dt);
        if intent.move_forward {
            self.state.position += stride;
        }
        if intent.move_backward {
            self.state.position -= stride;
        }

        let p = &mut self.state.position;
        p.y = self.heightfield.height(p.x, p.z) + self.params.entity_radius;
    }

    fn follow_pose(&self) -> CameraPose {
        CameraPose {
            position: self.state.position + self.rotation() * self.params.camera_offset,
            target: self.state.position,
        }
    }

    fn rotation(&self) -> DQuat {
        DQuat::from_rotation_y(self.state.yaw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrawalk_terrain::HeightfieldParams;

    const EPS: f64 = 1e-9;

    fn controller(seed: u64) -> LocomotionController {
        let hf = Arc::new(Heightfield::from_seed(seed, HeightfieldParams::default()));
        LocomotionController::new(hf, LocomotionParams::default())
    }

    fn follow(seed: u64) -> LocomotionController {
        let mut c = controller(seed);
        c.toggle_view();
        c
    }

    const FORWARD: MovementIntent = MovementIntent {
        move_forward: true,
        ..MovementIntent::IDLE
    };

    #[test]
    fn test_spawns_on_ground_in_orbit() {
        let c = controller(3);
        let s = c.state();
        assert_eq!(s.mode, ViewMode::Orbit);
        assert_eq!(s.yaw, 0.0);
        assert_eq!(s.position.x, 0.0);
        assert_eq!(s.position.z, 0.0);
        assert_eq!(s.position.y, c.heightfield().height(0.0, 0.0) + 0.5);
        assert!(!c.entity_visible());
    }

    #[test]
    fn test_orbit_ignores_movement() {
        let mut c = controller(3);
        let before = *c.state();
        let pose = c.tick(1.0, &FORWARD);
        assert_eq!(*c.state(), before, "Orbit view must not move the entity");
        assert_eq!(pose, c.orbit_camera().pose());
    }

    #[test]
    fn test_forward_at_zero_yaw_is_negative_z() {
        let mut c = follow(4);
        c.tick(0.5, &FORWARD);
        let p = c.state().position;
        assert!(p.x.abs() < EPS);
        assert!((p.z + 4.0).abs() < EPS, "Expected z = -4, got {}", p.z);
    }

    #[test]
    fn test_turn_left_increases_yaw() {
        let mut c = follow(4);
        let intent = MovementIntent {
            turn_left: true,
            ..MovementIntent::IDLE
        };
        c.tick(1.0, &intent);
        assert!((c.state().yaw - FRAC_PI_2).abs() < EPS);
        let f = c.forward();
        assert!((f - DVec3::NEG_X).length() < EPS, "Facing -X after a left quarter turn");
    }

    #[test]
    fn test_opposite_inputs_cancel() {
        let mut c = follow(4);
        let start = *c.state();
        let intent = MovementIntent {
            turn_left: true,
            turn_right: true,
            move_forward: true,
            move_backward: true,
            toggle_view: false,
        };
        c.tick(0.25, &intent);
        assert!((c.state().position - start.position).length() < EPS);
        assert!((c.state().yaw - start.yaw).abs() < EPS);
    }

    #[test]
    fn test_bad_dt_is_zero() {
        for dt in [-1.0, f64::NAN, f64::INFINITY] {
            let mut c = follow(4);
            let before = *c.state();
            c.tick(dt, &FORWARD);
            assert_eq!(*c.state(), before, "dt {dt} moved the entity");
        }
    }

    #[test]
    fn test_stays_on_ground_while_walking() {
        let mut c = follow(12);
        let intent = MovementIntent {
            move_forward: true,
            turn_right: true,
            ..MovementIntent::IDLE
        };
        for _ in 0..240 {
            c.tick(1.0 / 60.0, &intent);
            let p = c.state().position;
            assert_eq!(p.y, c.heightfield().height(p.x, p.z) + 0.5);
        }
    }

    #[test]
    fn test_follow_camera_behind_and_above() {
        let mut c = follow(7);
        let pose = c.tick(0.0, &MovementIntent::IDLE);
        let p = c.state().position;
        assert_eq!(pose.target, p);
        assert!((pose.position - (p + DVec3::new(0.0, 5.0, 12.0))).length() < EPS);
    }

    #[test]
    fn test_toggle_in_tick_applies_before_movement() {
        let mut c = controller(2);
        let intent = MovementIntent {
            toggle_view: true,
            ..FORWARD
        };
        c.tick(1.0, &intent);
        assert_eq!(c.mode(), ViewMode::Follow);
        assert!((c.state().position.z + 8.0).abs() < EPS);
    }

    #[test]
    fn test_view_mode_toggled() {
        assert_eq!(ViewMode::Orbit.toggled(), ViewMode::Follow);
        assert_eq!(ViewMode::Follow.toggled(), ViewMode::Orbit);
    }
}
