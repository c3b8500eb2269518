//! pixelpen demo: one keyboard-driven sprite and a bitmap-text overlay.

mod app;
mod config;

use std::process::ExitCode;

use anyhow::Result;

use pixelpen_engine::device::GpuInit;
use pixelpen_engine::logging::{init_logging, LoggingConfig};
use pixelpen_engine::window::Runtime;

use crate::app::{load_atlas, DemoApp};
use crate::config::DemoConfig;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = DemoConfig::from_env();
    log::debug!("{config:?}");

    // The atlas only needs the CPU; fail before a window ever opens.
    let atlas = load_atlas(&config)?;

    let runtime = config.runtime();
    Runtime::run(runtime, GpuInit::default(), DemoApp::new(config, atlas))
}
