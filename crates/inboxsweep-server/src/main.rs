//! InboxSweep
//!
//! Classifies emails with a locally running Ollama model and reports which
//! ones are safe to delete.

use anyhow::{Context, Result};
use clap::Parser;
use inboxsweep_core::types::truncate_chars;
use inboxsweep_core::{Decision, Email, ScanRequest, SessionState};
use inboxsweep_server::{fixture, run_server, Cli, Commands, ScanService, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let mut config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Ollama: {}", config.ollama_url);
    info!("Default model: {}", config.default_model);

    match cli.command {
        Commands::Serve { listen, port } => {
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let metrics_handle = init_metrics()?;
            run_server(config, Some(metrics_handle)).await?;
        }

        Commands::Scan { emails, confirm } => {
            let emails = match emails {
                Some(path) => load_emails(&path)?,
                None => fixture::sample_emails().context("Failed to parse built-in inbox")?,
            };
            run_scan(&config, emails, confirm).await?;
        }

        Commands::Health => {
            let service = ScanService::from_config(&config)?;
            let status = service.health().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

/// Classify once, print the review list, optionally confirm deletions
async fn run_scan(config: &ServerConfig, emails: Vec<Email>, confirm: bool) -> Result<()> {
    let service = ScanService::from_config(config)?;

    let session = SessionState::default().start_scan();
    let outcome = service
        .scan(ScanRequest {
            emails: emails.clone(),
            model: None,
        })
        .await;

    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            let session = session.scan_failed();
            warn!("Scan failed, returning to {:?}", session.page);
            return Err(e.into());
        }
    };
    let session = session.finish_scan(&emails, &response.results);

    println!();
    println!("  Model: {}   Processed: {}", response.model, response.total_processed);
    println!();
    println!("  {:<6} {:<8} {:>5}  {:<24} {}", "ID", "DECISION", "CONF", "FROM", "REASON");
    for item in &session.items {
        let marker = if session.selected.contains(&item.id) { "*" } else { " " };
        println!(
            "{} {:<6} {:<8} {:>5.2}  {:<24} {}",
            marker,
            item.id,
            item.decision,
            item.confidence,
            truncate_chars(&item.from, 24),
            item.reason
        );
    }
    println!();
    let summary: Vec<String> = Decision::ALL
        .iter()
        .map(|decision| format!("{} {}", session.count(*decision), decision))
        .collect();
    println!("  {}", summary.join(", "));
    println!(
        "  {} marked for deletion ({:.0} KB)",
        session.selected.len(),
        session.selected_size_kb()
    );

    if confirm {
        let session = session.confirm_delete();
        println!();
        println!("  Deleted {} emails", session.last_deleted);
        println!("  Storage freed: {:.0} KB", session.impact.storage);
        println!("  CO2 saved:     {:.4}", session.impact.co2);
    }
    println!();

    Ok(())
}

fn load_emails(path: &Path) -> Result<Vec<Email>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid email list in {}", path.display()))
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("inboxsweep=debug,inboxsweep_core=debug,inboxsweep_classifier=debug,inboxsweep_server=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("inboxsweep=info,inboxsweep_classifier=info,inboxsweep_server=info,tower_http=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!("inboxsweep_scans_total", "Total number of scan requests by status");
    metrics::describe_counter!(
        "inboxsweep_classifications_total",
        "Total number of email classifications by decision"
    );
    metrics::describe_counter!(
        "inboxsweep_model_failures_total",
        "Classification calls degraded to REVIEW after a model service failure"
    );
    metrics::describe_histogram!(
        "inboxsweep_scan_latency_ms",
        metrics::Unit::Milliseconds,
        "End-to-end scan latency in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
