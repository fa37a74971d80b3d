//! File logging for the TUI.
//!
//! The terminal belongs to ratatui, so log records go to
//! `<config dir>/covergen/covergen.log` (or `./covergen.log` when the config
//! directory can't be used).

use std::fs::{self, File};
use std::path::PathBuf;

use covergen_core::Config;
use log::LevelFilter;
use simplelog::{Config as LogConfig, ConfigBuilder, WriteLogger};

const LOG_FILE: &str = "covergen.log";

pub fn initialize() {
    // Debug detail in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let Some(file) = create_log_file() else {
        return;
    };

    // Ignore the error if a logger is already installed.
    let _ = WriteLogger::init(level, build_config(), file);
}

fn build_config() -> LogConfig {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // Connection-pool chatter from the HTTP stack drowns the useful lines
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build()
}

fn log_path() -> PathBuf {
    Config::config_dir()
        .ok()
        .filter(|dir| fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join(LOG_FILE))
        .unwrap_or_else(|| PathBuf::from(".").join(LOG_FILE))
}

fn create_log_file() -> Option<File> {
    let path = log_path();
    match File::create(&path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
