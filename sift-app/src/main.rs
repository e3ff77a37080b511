use anyhow::Result;
use clap::Parser;
use sift_common::observability::{LogConfig, init_logging};
use sift_config::{SiftConfig, SiftConfigLoader};
use sift_search::{SearchView, TitleCell};
use sift_tui::SearchTui;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod headless;
mod wiring;

use cli::Cli;

const DEFAULT_CONFIG: &str = "sift.yaml";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Config: explicit file is required, the default one is optional; env wins
    let loader = match &cli.config {
        Some(path) => SiftConfigLoader::new().with_file(path),
        None => SiftConfigLoader::new().with_optional_file(DEFAULT_CONFIG),
    };
    let cfg: SiftConfig = loader.load()?;

    // 2) Logging; stderr only when nothing else owns the terminal
    let log_path = init_logging(LogConfig {
        app_name: "sift",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cli.json && cli.verbose,
        format: cfg.logging.format,
        default_filter: if cli.verbose {
            "debug".to_string()
        } else {
            cfg.logging.filter.clone()
        },
    })?;

    let title = TitleCell::new();
    let orchestrator = wiring::build_orchestrator(&cfg, Arc::new(title.clone()))?;
    tracing::info!(
        target: "app",
        provider = orchestrator.provider_name(),
        log = %log_path.display(),
        headless = cli.json,
        "app.start"
    );
    let view = SearchView::new(Arc::new(orchestrator));

    if cli.json {
        return headless::run(view, cli.entry()).await;
    }

    SearchTui::new(view, title)?.run(cli.entry()).await?;
    Ok(ExitCode::SUCCESS)
}
