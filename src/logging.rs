//! Logger setup.
//!
//! One-shot commands log to stderr. The terminal UI owns the screen, so it logs to a
//! file next to the store instead.

use std::fs::{self, OpenOptions};

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::config::Config;
use crate::error::{AppError, AppResult};

fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the global logger. `RUST_LOG` overrides the default level.
pub fn init(config: &Config, to_file: bool) -> AppResult<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level(config.verbose).as_str()));

    if to_file {
        if let Some(dir) = config.log_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;
        builder.target(Target::Pipe(Box::new(file))).write_style(env_logger::WriteStyle::Never);
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| AppError::Logger(e.to_string()))?;
    log::debug!("Logging initialized (verbose: {})", config.verbose);
    Ok(())
}
