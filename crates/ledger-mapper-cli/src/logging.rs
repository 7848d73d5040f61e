use ledger_mapper_core::{AppConfig, UnclassifiedPolicy};
use std::env;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/ledger-mapper.log".to_string());

    let file_appender = tracing_appender::rolling::never("./", &log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    info!("Logging to stdout and {}", log_file_path);

    guard
}

/// Log where this run reads from and where its plan points.
pub fn log_run_header(config: &AppConfig) {
    info!("Planning {} into {}", config.root_path, config.destination_root);
    match config.unclassified {
        UnclassifiedPolicy::Exclude => info!("Unclassified files are excluded from the plan"),
        UnclassifiedPolicy::CatchAll => {
            info!("Unclassified files go to {}", config.catch_all_folder)
        }
    }
    if !config.ignore_patterns.is_empty() {
        info!("Ignoring {}", config.ignore_patterns.join(", "));
    }
}
