//! tracing subscriber setup: console layer plus optional rolling JSON file.

use std::path::Path;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry, fmt};

use crate::cli::FILE_GUARD;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` wins over `console_level`.
///
/// Console output goes to stderr so stdout stays clean for results.
pub fn init(json: bool, console_level: &str, logging: Option<&drill_config::Logging>) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(cfg) = logging
        && let Some(path) = cfg.file.as_deref()
    {
        let level = cfg.level.as_deref().unwrap_or("info");
        let appender = rolling_appender(Path::new(path), cfg.rotation.as_deref());
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(level))
                .boxed(),
        );
    }

    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(layers).try_init();
}

fn rolling_appender(path: &Path, rotation: Option<&str>) -> tracing_appender::rolling::RollingFileAppender {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drill.log".to_string());
    match rotation.unwrap_or("never") {
        "daily" => tracing_appender::rolling::daily(dir, file),
        "hourly" => tracing_appender::rolling::hourly(dir, file),
        _ => tracing_appender::rolling::never(dir, file),
    }
}
