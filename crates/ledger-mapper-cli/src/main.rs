mod commands;
mod logging;
mod progress;
mod report;

use std::path::Path;
use std::process;

use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use ledger_mapper_core::{export, AppConfig, PlanEngine, PlanResult};
use progress::CliReporter;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match ledger_mapper_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(root) = args.root {
        config.root_path = root;
    }

    let result = match run_plan(&config) {
        Ok(result) => result,
        Err(err) => {
            error!("Error: {}", err);
            process::exit(1);
        }
    };

    report::print_report(&result);
    write_exports(&config, &result);

    Ok(())
}

fn run_plan(config: &AppConfig) -> Result<PlanResult, Box<dyn std::error::Error>> {
    let engine = PlanEngine::new(config.clone());
    logging::log_run_header(engine.config());
    let reporter = CliReporter::new();
    let result = engine.run(&reporter)?;

    info!(
        "Scan: {}, Plan: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.plan_duration.as_secs_f64()).green(),
    );

    Ok(result)
}

/// A failed export is logged; the console report has already been printed.
fn write_exports(config: &AppConfig, result: &PlanResult) {
    if let Some(path) = &config.csv_output {
        match export::write_csv(result, Path::new(path)) {
            Ok(()) => println!("CSV:  {}", path.cyan()),
            Err(err) => error!("Error writing {}: {}", path, err),
        }
    }
    if let Some(path) = &config.json_output {
        match export::write_json(result, Path::new(path)) {
            Ok(()) => println!("JSON: {}", path.cyan()),
            Err(err) => error!("Error writing {}: {}", path, err),
        }
    }
}
