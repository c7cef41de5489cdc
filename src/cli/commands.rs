//! CLI command implementations
//!
//! `serve` boots a session end to end: load config, load the dataset
//! bundle, connect the backend client, bind the HTTP server. `check`
//! stops after the load and prints what it found, so a bundle can be
//! validated without serving it.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::backend::HttpStatisticsBackend;
use crate::config::AppConfig;
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::rules::RuleFlavor;
use crate::server::HttpServer;
use crate::session::{load_bundle, Session};

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command).await
}

/// Run the appropriate command based on CLI args
pub async fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve { config } => serve(&config).await,
        Command::Check { config } => check(&config),
    }
}

/// Boot a session and serve it over HTTP
pub async fn serve(config_path: &Path) -> CliResult<()> {
    log_event_with_fields(
        Event::BootStart,
        &[("version", env!("CARGO_PKG_VERSION"))],
    );
    let timer = Timer::new();

    let config = AppConfig::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("backend", config.backend_url.as_str()),
            ("dataset", config.data_name.as_str()),
        ],
    );

    let bundle = load_bundle(&config.data_dir, &config.data_name, &config.mining)?;
    let backend = Arc::new(HttpStatisticsBackend::new(&config.backend_url));
    let session = Arc::new(Session::new(Arc::new(bundle), backend));

    log_event_with_fields(
        Event::BootComplete,
        &[
            ("elapsed_ms", timer.elapsed_ms().as_str()),
            ("session_id", session.id().to_string().as_str()),
        ],
    );

    let server = HttpServer::new(session, config.server.clone());
    server.start().await?;

    Ok(())
}

/// Load and verify the configured bundle, printing a JSON summary
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let bundle = load_bundle(&config.data_dir, &config.data_name, &config.mining)?;

    let summary = json!({
        "dataset": bundle.descriptor().name,
        "doc_kind": bundle.descriptor().doc_kind,
        "model": bundle.descriptor().model_name,
        "labels": bundle.descriptor().labels,
        "documents": bundle.document_count(),
        "errors": bundle.error_count(),
        "observed_accuracy": bundle.observed_accuracy(),
        "token_rules": bundle.rule_set(RuleFlavor::TokenBinary).len(),
        "high_level_rules": bundle.rule_set(RuleFlavor::HighLevel).len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
