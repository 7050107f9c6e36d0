use std::path::PathBuf;

use clap::Parser;

use crate::lists::{FileCache, LegacyStorage, SeedSource};

const APP_DIR: &str = "wrangle";
const LEGACY_FILE: &str = "local_storage.json";
const LOG_FILE: &str = "wrangle.log";
const CACHE_DIR: &str = "cache";

#[derive(Parser, Debug)]
#[command(name = "wrangle")]
#[command(version)]
#[command(about = "Terminal prompt editor with reusable option lists")]
pub struct Cli {
    /// Directory holding the list cache, legacy storage and log file
    #[arg(long, env = "WRANGLE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Seed lists used when nothing is cached: a path or an http(s) URL
    #[arg(long, env = "WRANGLE_SEED")]
    pub seed: Option<String>,

    /// Write the composed output here on quit instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolved runtime settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub seed: SeedSource,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            data_dir: cli.data_dir.unwrap_or_else(default_data_dir),
            seed: cli
                .seed
                .as_deref()
                .map(SeedSource::parse)
                .unwrap_or(SeedSource::Bundled),
            output: cli.output,
            verbose: cli.verbose,
        }
    }

    pub fn cache(&self) -> FileCache {
        FileCache::new(self.data_dir.join(CACHE_DIR))
    }

    pub fn legacy_storage(&self) -> LegacyStorage {
        LegacyStorage::new(self.data_dir.join(LEGACY_FILE))
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

/// `<platform data dir>/wrangle`, or `./.wrangle` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}
