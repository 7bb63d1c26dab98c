//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RangerBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    device: DeviceInfo,
    poll: PollInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct DeviceInfo {
    path: String,
    byte_order: String,
    resolved_byte_order: String,
    record_len: usize,
}

#[derive(Serialize)]
struct PollInfo {
    interval_ms: u128,
    on_error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_readings: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = ?args.config, "Loading configuration info");

    let blueprint = super::load_blueprint(args.config.as_deref())?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &RangerBlueprint) -> ConfigInfo {
    let sinks = blueprint
        .effective_sinks()
        .into_iter()
        .map(|s| SinkInfo {
            name: s.name,
            sink_type: format!("{:?}", s.sink_type),
            params: s.params,
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        device: DeviceInfo {
            path: blueprint.device.path.display().to_string(),
            byte_order: blueprint.device.byte_order.to_string(),
            resolved_byte_order: blueprint.device.byte_order.resolve().to_string(),
            record_len: contracts::RECORD_LEN,
        },
        poll: PollInfo {
            interval_ms: ingestion::POLL_INTERVAL.as_millis(),
            on_error: format!("{:?}", blueprint.poll.on_error),
            max_readings: blueprint.poll.reading_limit(),
        },
        sinks,
    }
}

fn print_config_info(blueprint: &RangerBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               HC-SR04 Ranger Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📟 Device");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Path: {}", blueprint.device.path.display());
    println!(
        "   ├─ Byte order: {} ({})",
        blueprint.device.byte_order,
        blueprint.device.byte_order.resolve()
    );
    println!("   └─ Record: {} bytes, signed mm", contracts::RECORD_LEN);

    println!("\n⏱️  Polling");
    println!("   ├─ Interval: {} ms", ingestion::POLL_INTERVAL.as_millis());
    println!("   ├─ On error: {:?}", blueprint.poll.on_error);
    match blueprint.poll.reading_limit() {
        Some(max) => println!("   └─ Max readings: {}", max),
        None => println!("   └─ Max readings: unlimited"),
    }

    let sinks = blueprint.effective_sinks();
    println!("\n📤 Sinks ({})", sinks.len());
    for (i, sink) in sinks.iter().enumerate() {
        let prefix = if i == sinks.len() - 1 { "└─" } else { "├─" };
        println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
    }

    println!();
}
