///
/// This module implements the CLI interface for rds-log-export: command parsing,
/// construction of the AWS-backed dependencies, and user-visible output.
///
/// All export logic (watermark handling, selection, pagination, the pipeline)
/// lives in the [`rds-log-export-core`] crate.
///
/// ## How To Use
/// - Schedule `rds-log-export sync --config export.yaml` on a timer that never overlaps itself.
/// - Use `rds-log-export pending --config export.yaml` to preview the next run.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`rds-log-export-core`]: ../../rds-log-export-core/
use crate::aws::{load_sdk_config, RdsLogSource, S3ObjectStore};
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use rds_log_export_core::config::ExportConfig;
use rds_log_export_core::job::LogSyncJob;
use rds_log_export_core::sink::BucketLogSink;
use rds_log_export_core::synchronise::plan;
use rds_log_export_core::watermark::BucketWatermarkStore;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for rds-log-export: copy new RDS engine logs into S3.
#[derive(Parser)]
#[clap(
    name = "rds-log-export",
    version,
    about = "Incrementally export RDS database log files to an S3 bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export every log written since the last run, then advance the watermark
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Print the logs the next sync would export, without exporting them
    Pending {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// The AWS-backed dependencies of a job, sharing one S3 client.
pub struct AwsDependencies {
    pub store: BucketWatermarkStore<Arc<S3ObjectStore>>,
    pub source: RdsLogSource,
    pub sink: BucketLogSink<Arc<S3ObjectStore>>,
}

pub async fn build_dependencies(config: &ExportConfig) -> AwsDependencies {
    let sdk_config = load_sdk_config(config.region.as_deref()).await;
    let objects = Arc::new(S3ObjectStore::new(&sdk_config, config.bucket.clone()));
    AwsDependencies {
        store: BucketWatermarkStore::new(
            objects.clone(),
            config.bucket.clone(),
            config.watermark_key.clone(),
        ),
        source: RdsLogSource::new(&sdk_config, config.db_instance_identifier.clone())
            .with_max_list_pages(config.max_portions_per_log),
        sink: BucketLogSink::new(objects, config.bucket.clone()),
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "sync", "Starting log export");
            let deps = build_dependencies(&config).await;
            let job = LogSyncJob::new(config, deps.store, deps.source, deps.sink);
            match job.handle(&serde_json::Value::Null).await {
                Ok(report) => {
                    tracing::info!(command = "sync", ?report, "Log export complete");
                    println!(
                        "Exported {} log file(s); watermark {} -> {}",
                        report.exported.len(),
                        report.previous_watermark,
                        report.watermark
                    );
                    for log in &report.exported {
                        println!("  {} ({} bytes)", log.key, log.bytes);
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Log export failed");
                    Err(anyhow::Error::msg(e))
                }
            }
        }
        Commands::Pending { config } => {
            let config = load_config(config)?;
            let deps = build_dependencies(&config).await;
            let pending = plan(&config, &deps.store, &deps.source).await?;
            println!(
                "{} log file(s) newer than watermark {}",
                pending.candidates.len(),
                pending.watermark
            );
            for log in &pending.candidates {
                println!("  {} (last written {})", log.name, log.last_written);
            }
            Ok(())
        }
    }
}
