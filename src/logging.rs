use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

/// Sends tracing output to a file, since the terminal belongs to the UI.
///
/// Log path: `WRANGLE_LOG` env var, then `default_path`. If the file cannot
/// be opened nothing is logged; writing to stderr would corrupt the screen.
pub fn init_tracing(default_path: &Path, verbose: bool) {
    let log_path = std::env::var_os("WRANGLE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path.to_path_buf());

    let log_file = log_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or(Some(()), |parent| fs::create_dir_all(parent).ok())
        .and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .ok()
        });

    let Some(file) = log_file else {
        return;
    };

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::from_level(level));

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}
