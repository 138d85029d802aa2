//! High-level pipeline: read watermark → list logs → export newer logs → advance watermark.
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first error from any dependency aborts the run
//!   and the watermark is left as it was.
//! - Exports strictly one log at a time in ascending `last_written` order, so
//!   the watermark only ever moves to a timestamp whose object has been written.
//! - Logs every step through `tracing`.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Read-only preview: [`plan`]
//! - Supporting types: [`ExportPlan`], [`SynchroniseReport`].

use serde::Serialize;
use tracing::{error, info};

use crate::config::ExportConfig;
use crate::contract::{LogFileDescriptor, LogSink, LogSource, WatermarkStore};
use crate::error::SyncError;
use crate::fetch::fetch_full_content;
use crate::select::select_candidates;

/// What the next run would export, given the current watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub watermark: i64,
    pub candidates: Vec<LogFileDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynchroniseReport {
    pub previous_watermark: i64,
    pub watermark: i64,
    pub exported: Vec<ExportedLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedLog {
    pub name: String,
    pub key: String,
    pub last_written: i64,
    pub bytes: usize,
}

/// Reads the watermark and works out which logs are due, without exporting anything.
pub async fn plan<W, S>(
    config: &ExportConfig,
    store: &W,
    source: &S,
) -> Result<ExportPlan, SyncError>
where
    W: WatermarkStore + ?Sized,
    S: LogSource + ?Sized,
{
    let watermark = store.read().await?;

    info!(
        db_instance = %config.db_instance_identifier,
        log_name_filter = %config.log_name_filter,
        watermark,
        "[SYNC] Retrieving logs later than last written time"
    );
    let logs = source
        .list_logs(&config.log_name_filter)
        .await
        .map_err(|e| {
            error!(error = %e, "[SYNC][ERROR] Listing logs failed");
            SyncError::Source(format!(
                "failed to list logs for '{}': {e}",
                config.db_instance_identifier
            ))
        })?;
    let listed = logs.len();

    let candidates = select_candidates(
        logs,
        watermark,
        config.max_logs_per_run,
        config.selection,
    );
    info!(listed, candidates = candidates.len(), "[SYNC] Selected logs to export");

    Ok(ExportPlan {
        watermark,
        candidates,
    })
}

pub async fn synchronise<W, S, K>(
    config: &ExportConfig,
    store: &W,
    source: &S,
    sink: &K,
) -> Result<SynchroniseReport, SyncError>
where
    W: WatermarkStore + ?Sized,
    S: LogSource + ?Sized,
    K: LogSink + ?Sized,
{
    info!("[SYNC] Starting log export");

    let ExportPlan {
        watermark: previous_watermark,
        candidates,
    } = plan(config, store, source).await?;

    let mut watermark = previous_watermark;
    let mut exported = Vec::with_capacity(candidates.len());

    for log in candidates {
        info!(log = %log.name, last_written = log.last_written, size = ?log.size, "[SYNC] Exporting log");
        let content = fetch_full_content(source, &log, config.max_portions_per_log).await?;
        let key = config.object_key(&log.name);
        let body = content.into_bytes();
        let bytes = body.len();
        sink.put_object(&key, body).await?;

        watermark = watermark.max(log.last_written);
        exported.push(ExportedLog {
            name: log.name,
            key,
            last_written: log.last_written,
            bytes,
        });
    }

    if exported.is_empty() {
        info!(watermark, "[SYNC] No new logs; watermark unchanged");
    } else {
        store.write(watermark).await?;
    }

    info!(
        exported = exported.len(),
        previous_watermark,
        watermark,
        "[SYNC] Log export complete"
    );
    Ok(SynchroniseReport {
        previous_watermark,
        watermark,
        exported,
    })
}
