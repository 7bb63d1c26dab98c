//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::RangerBlueprint;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut blueprint = super::load_blueprint(args.config.as_deref())?;
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint).context("Invalid configuration")?;

    info!(
        device = %blueprint.device.path.display(),
        byte_order = %blueprint.device.byte_order,
        on_error = ?blueprint.poll.on_error,
        max_readings = ?blueprint.poll.reading_limit(),
        sinks = blueprint.effective_sinks().len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping poller...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting poller...");
    let stats = pipeline.run(shutdown_rx).await?;

    info!(
        readings = stats.readings(),
        duration_secs = stats.duration().as_secs_f64(),
        rate_hz = format!("{:.2}", stats.poll.rate_hz()),
        "Poller finished"
    );
    stats.print_summary();

    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(blueprint: &mut RangerBlueprint, args: &RunArgs) {
    if let Some(ref device) = args.device {
        info!(device = %device.display(), "Overriding device path from CLI");
        blueprint.device.path = device.clone();
    }
    if let Some(byte_order) = args.byte_order {
        blueprint.device.byte_order = byte_order.into();
    }
    if let Some(on_error) = args.on_error {
        blueprint.poll.on_error = on_error.into();
    }
    if let Some(count) = args.count {
        blueprint.poll.max_readings = count;
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &RangerBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Device:");
    println!("  Path: {}", blueprint.device.path.display());
    println!("  Byte order: {}", blueprint.device.byte_order);
    println!("\nPolling:");
    println!("  Interval: {} ms", ingestion::POLL_INTERVAL.as_millis());
    println!("  On error: {:?}", blueprint.poll.on_error);
    match blueprint.poll.reading_limit() {
        Some(max) => println!("  Max readings: {}", max),
        None => println!("  Max readings: unlimited"),
    }

    let sinks = blueprint.effective_sinks();
    println!("\nSinks ({}):", sinks.len());
    for sink in &sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
    }

    println!();
}
