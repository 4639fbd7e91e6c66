//! Player locomotion over the terrain and the two camera views.

pub mod locomotion;
pub mod orbit_camera;

pub use locomotion::{LocomotionController, LocomotionParams, LocomotionState, ViewMode};
pub use orbit_camera::{CameraPose, OrbitCamera};
