mod assets;
mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use starflight_engine::device::GpuInit;
use starflight_engine::logging::init_logging;
use starflight_engine::window::Runtime;
use starflight_porthole::Porthole;

use crate::cli::CliArgs;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.logging_config());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("starflight: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let foreground = assets::load_foreground().context("viewport overlay")?;
    let shaders = assets::load_shaders()?;
    log::info!("shaders: {}", shaders.names().collect::<Vec<_>>().join(", "));

    let porthole = Porthole::new(args.porthole_config(), &shaders, Some(foreground));
    Runtime::run(args.runtime_config(), GpuInit::default(), porthole)
}
