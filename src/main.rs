//! # Task Consumer - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y delega en el
//! coordinador del ciclo de vida.

use std::process::ExitCode;
use task_consumer::config::Config;
use task_consumer::lifecycle;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let config = Config::new();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::from(2);
    }
    config.log_summary();

    lifecycle::run(config)
}
