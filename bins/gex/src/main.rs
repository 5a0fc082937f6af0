//! Gamma exposure tracker binary
//!
//! Replays archived or dropped option-chain snapshots through the gamma
//! engine, or watches a directory for new ones, printing one report per
//! poll.

mod inputs;
mod report;
mod shutdown;
mod tracker;

use anyhow::{Context, Result};
use cli::{Cli, Commands, OutputFormat};
use config::{
    generate_default_config, get_env_or_default, load_config, save_config, validate_config,
    GexConfig,
};
use gamma_engine::GammaEngine;
use inputs::{load_input, load_snapshot_file, DirectoryScanner};
use observability::{init_logging, init_metrics, EngineMetrics, LogFormat};
use shutdown::ShutdownController;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::JsonLinesArchive;
use tracing::{debug, error, info, warn};
use tracker::Tracker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Run {
            config,
            format,
            inputs,
        } => {
            let config = load_checked_config(&config)?;
            init_observability(&config)?;
            info!("Executing 'run' command");
            run_command(config, format, inputs).await
        }
        Commands::Watch {
            config,
            dir,
            format,
            interval,
        } => {
            let config = load_checked_config(&config)?;
            init_observability(&config)?;
            info!("Executing 'watch' command");
            watch_command(config, dir, format, interval).await
        }
        Commands::Validate { config } => {
            init_logging("gex", LogFormat::Pretty, "warn")?;
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_logging("gex", LogFormat::Pretty, "warn")?;
            init_command(output).await
        }
    }
}

/// Load the config file, falling back to defaults when it does not exist
fn load_checked_config(path: &Path) -> Result<GexConfig> {
    let config = if path.exists() {
        load_config(path)?
    } else {
        eprintln!("Config {:?} not found, using defaults", path);
        generate_default_config()
    };

    let report = validate_config(&config);
    if !report.is_valid() {
        for err in &report.errors {
            eprintln!("  [error] {}", err);
        }
        anyhow::bail!("Cannot start due to configuration errors");
    }

    Ok(config)
}

fn init_observability(config: &GexConfig) -> Result<()> {
    let format_name = get_env_or_default("GEX_LOG_FORMAT", &config.logging.format);
    let format = format_name
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    init_logging("gex", format, &config.logging.filter)?;

    let report = validate_config(config);
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message);
    }

    if config.metrics.enabled {
        init_metrics(config.metrics.port)?;
    }

    debug!(?config, "Configuration loaded");
    Ok(())
}

async fn run_command(config: GexConfig, format: OutputFormat, inputs: Vec<PathBuf>) -> Result<()> {
    let engine = GammaEngine::new(config.analysis.clone());
    let metrics = EngineMetrics::new(&config.source.symbol);
    // Replays never write back to the archive
    let mut tracker = Tracker::new(engine, metrics, format);

    let mut polls = 0usize;
    for path in &inputs {
        let records = load_input(path).await?;
        info!(?path, records = records.len(), "Replaying input");
        for record in records {
            tracker.handle_and_print(record).await?;
            polls += 1;
        }
    }

    info!(
        polls,
        rejected = tracker.failures(),
        history = tracker.engine().exposure_history().len(),
        "Replay finished"
    );
    Ok(())
}

async fn watch_command(
    config: GexConfig,
    dir: PathBuf,
    format: OutputFormat,
    interval: Option<u64>,
) -> Result<()> {
    let interval = Duration::from_secs(interval.unwrap_or(config.source.poll_interval_seconds).max(1));
    let engine = GammaEngine::new(config.analysis.clone());
    let metrics = EngineMetrics::new(&config.source.symbol);
    let mut tracker = Tracker::new(engine, metrics, format);

    if config.archive.enabled {
        let archive = JsonLinesArchive::open(&config.archive.path)
            .await
            .with_context(|| format!("Failed to open archive: {}", config.archive.path))?;
        tracker = tracker.with_archive(Arc::new(archive));
    }

    let mut scanner = DirectoryScanner::new(dir);
    let shutdown = ShutdownController::with_ctrl_c();
    let token = shutdown.token();
    let mut ticker = tokio::time::interval(interval);

    info!(
        symbol = %config.source.symbol,
        dir = ?scanner.dir(),
        interval_secs = interval.as_secs(),
        "Watching for snapshots"
    );

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fresh = match scanner.scan().await {
            Ok(paths) => paths,
            Err(e) => {
                error!(%e, "Directory scan failed");
                continue;
            }
        };

        for path in fresh {
            match load_snapshot_file(&path).await {
                Ok(record) => {
                    scanner.mark_done(&path);
                    tracker.handle_and_print(record).await?;
                }
                Err(e) => {
                    // Possibly still being written; retried next tick
                    warn!(?path, %e, "Snapshot not readable yet");
                }
            }
        }

        if shutdown.is_cancelled() {
            break;
        }
    }

    info!(rejected = tracker.failures(), "Watch stopped");
    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Symbol: {}", config.source.symbol);
    println!("Poll interval: {}s", config.source.poll_interval_seconds);
    println!("Contract size: {}", config.analysis.contract_size);
    println!("Top K: {}", config.analysis.top_k);
    println!("Window capacity: {}", config.analysis.window_capacity);
    println!("Sign convention: {}", config.analysis.sign_convention.as_str());
    if config.archive.enabled {
        println!("Archive: {}", config.archive.path);
    } else {
        println!("Archive: disabled");
    }

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Source symbol ({}) and poll interval", config.source.symbol);
    println!("  - Analysis settings (contract size, top K, rolling window)");
    println!("  - Raw snapshot archive ({})", config.archive.path);
    println!("  - Logging and metrics");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!(
        "  2. Run 'gex validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'gex watch --config {:?} --dir <snapshots>' to start tracking",
        output_path
    );

    Ok(())
}
