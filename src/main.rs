//! Entry point for the IceTrend application.
//! Handles CLI parsing, configuration validation, and runs the diagnostic pipeline.

use clap::Parser;
use ice_trend::prelude::*;
use ice_trend::Args;
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(Some(paths)) => {
            println!("✅ Extent chart: {}", paths.extent.display());
            println!("✅ Area chart:   {}", paths.area.display());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("No charts produced (time axis too short)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Option<PlotPaths>> {
    // Fatal validation happens before any file is touched
    let config = args.to_config().validated()?;
    info!(
        "Sea-ice {} diagnostic, {} aggregation, {} input file(s)",
        config.region,
        config.month.label(),
        args.files.len()
    );

    let aux_areas: HashMap<String, PathBuf> = args.aux_areas.iter().cloned().collect();
    run_diagnostic(&args.files, &aux_areas, &config)
}
