//! Runtime settings for terrawalk.
//!
//! Settings persist to `config.ron` and tolerate missing or unknown fields, so
//! old files keep loading as sections grow. Command-line flags override
//! whatever was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, InputConfig, LocomotionConfig, ScatterConfig, SimulationConfig,
    WorldConfig, default_config_dir,
};
pub use error::ConfigError;
