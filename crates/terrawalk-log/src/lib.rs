//! Structured logging for terrawalk.
//!
//! Installs a `tracing` subscriber with a console layer and, in debug builds,
//! a JSON file layer for post-mortem analysis. The level comes from `RUST_LOG`
//! when set, otherwise from `debug.log_level` in the config.

use std::fs::File;
use std::path::{Path, PathBuf};

use terrawalk_config::Config;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config set a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log written in debug builds.
pub const LOG_FILE: &str = "terrawalk.log";

/// Filter directives from the config, or [`DEFAULT_FILTER`] if it has none.
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - source of the log level when `RUST_LOG` is unset
///
/// Returns the path of the JSON log if one was opened. Calling this a second
/// time leaves the first subscriber in place.
///
/// ```no_run
/// use terrawalk_config::Config;
/// use terrawalk_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Option<PathBuf> {
    let directives = filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = File::create(log_dir.join(LOG_FILE))
    {
        let installed = subscriber.with(json_layer(log_file)).try_init().is_ok();
        return installed.then(|| log_dir.join(LOG_FILE));
    }

    let _ = subscriber.try_init();
    None
}

/// JSON lines layer writing to `writer`, without ANSI codes.
pub fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

/// An `EnvFilter` for [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_directives_from_config() {
        let mut config = Config::default();
        config.debug.log_level = "debug,terrawalk_terrain=trace".to_string();
        assert_eq!(filter_directives(Some(&config)), "debug,terrawalk_terrain=trace");
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid = [
            "info",
            "debug,terrawalk_player=trace",
            "warn,terrawalk_terrain=debug",
        ];
        for directives in valid {
            assert!(
                EnvFilter::try_new(directives).is_ok(),
                "Failed to parse filter: {directives}"
            );
        }
    }

    #[test]
    fn test_json_layer_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE);
        let file = File::create(&path).unwrap();

        let subscriber = tracing_subscriber::registry().with(json_layer(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(seed = 42, "World generated");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().expect("one JSON line");
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["fields"]["message"], "World generated");
        assert_eq!(value["fields"]["seed"], 42);
    }
}
