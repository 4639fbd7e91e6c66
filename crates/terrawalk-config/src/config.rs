//! Settings structs, their defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain generation.
    pub world: WorldConfig,
    /// Tree scatter. Unset fields take [`ScatterConfig::trees`] values.
    #[serde(deserialize_with = "tree_section")]
    pub trees: ScatterConfig,
    /// House scatter. Unset fields take [`ScatterConfig::houses`] values.
    #[serde(deserialize_with = "house_section")]
    pub houses: ScatterConfig,
    /// Walking and follow camera.
    pub locomotion: LocomotionConfig,
    /// Key binding overrides.
    pub input: InputConfig,
    /// Headless tick loop.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed. The same seed always yields the same terrain and scenery.
    pub seed: u64,
    /// Side length of the square terrain.
    pub terrain_size: f64,
    /// Mesh cells per side.
    pub subdivisions: u32,
    /// World units per noise unit.
    pub horizontal_scale: f64,
    /// Peak height multiplier.
    pub vertical_amplitude: f64,
    /// Use the 2D skew constants in 3D noise (bit-compatible, less smooth).
    pub reference_skew: bool,
    /// Drop unplaceable scenery instead of failing generation.
    pub skip_exhausted: bool,
}

/// Per-category scatter settings. Part offsets, scale and yaw policy stay
/// fixed per category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScatterConfig {
    /// Number of instances.
    pub count: usize,
    /// Sampling square side as a fraction of the terrain size.
    pub extent_fraction: f64,
    /// Lowest accepted ground height.
    pub min_height: f64,
    /// Highest accepted ground height.
    pub max_height: f64,
    /// Candidate draws allowed per instance.
    pub max_attempts: u32,
}

/// Walking and follow-camera settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Units per second.
    pub movement_speed: f64,
    /// Radians per second.
    pub turn_speed: f64,
    /// Entity centre height above ground.
    pub entity_radius: f64,
    /// Follow camera offset in the entity frame: up, back.
    pub camera_offset: [f64; 3],
}

/// Input configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Keybinding overrides (action name -> key name), e.g. `"toggle_view": "KeyV"`.
    pub keybindings: HashMap<String, String>,
}

/// Headless simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of ticks to run.
    pub frames: u32,
    /// Seconds per tick.
    pub frame_dt: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log the camera pose every this many ticks (0 disables).
    pub pose_log_interval: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain_size: 256.0,
            subdivisions: 100,
            horizontal_scale: 50.0,
            vertical_amplitude: 10.0,
            reference_skew: false,
            skip_exhausted: false,
        }
    }
}

impl ScatterConfig {
    /// Tree defaults: 300 on ground between 1 and 10.
    pub fn trees() -> Self {
        Self {
            count: 300,
            extent_fraction: 0.9,
            min_height: 1.0,
            max_height: 10.0,
            max_attempts: 10_000,
        }
    }

    /// House defaults: 50 on ground between 0.5 and 5.
    pub fn houses() -> Self {
        Self {
            count: 50,
            extent_fraction: 0.8,
            min_height: 0.5,
            max_height: 5.0,
            max_attempts: 10_000,
        }
    }
}

/// A scatter section as written in the file, where every field is optional.
#[derive(Deserialize)]
struct ScatterSection {
    count: Option<usize>,
    extent_fraction: Option<f64>,
    min_height: Option<f64>,
    max_height: Option<f64>,
    max_attempts: Option<u32>,
}

impl ScatterSection {
    fn over(self, preset: ScatterConfig) -> ScatterConfig {
        ScatterConfig {
            count: self.count.unwrap_or(preset.count),
            extent_fraction: self.extent_fraction.unwrap_or(preset.extent_fraction),
            min_height: self.min_height.unwrap_or(preset.min_height),
            max_height: self.max_height.unwrap_or(preset.max_height),
            max_attempts: self.max_attempts.unwrap_or(preset.max_attempts),
        }
    }
}

fn tree_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ScatterConfig, D::Error> {
    ScatterSection::deserialize(deserializer).map(|s| s.over(ScatterConfig::trees()))
}

fn house_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ScatterConfig, D::Error> {
    ScatterSection::deserialize(deserializer).map(|s| s.over(ScatterConfig::houses()))
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            movement_speed: 8.0,
            turn_speed: std::f64::consts::FRAC_PI_2,
            entity_radius: 0.5,
            camera_offset: [0.0, 5.0, 12.0],
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_dt: 1.0 / 60.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pose_log_interval: 60,
        }
    }
}

/// `<platform config dir>/terrawalk`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("terrawalk"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load `config.ron` from `config_dir`, or write and return the defaults.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| ConfigError::WriteError { path, source }
        };
        std::fs::create_dir_all(config_dir).map_err(write_err(config_dir))?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(write_err(&config_path))?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Parse RON text. Absent sections and fields take their defaults.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&contents)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            trees: ScatterConfig::trees(),
            houses: ScatterConfig::houses(),
            locomotion: LocomotionConfig::default(),
            input: InputConfig::default(),
            simulation: SimulationConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}
