//! Trigger entry point: one call per timer tick (or CLI invocation).

use tracing::{debug, error, info};

use crate::config::ExportConfig;
use crate::contract::{LogSink, LogSource, WatermarkStore};
use crate::synchronise::{synchronise, SynchroniseReport};

/// The export job with its dependencies, constructed once and reused across triggers.
///
/// Overlapping calls to [`LogSyncJob::handle`] race on the watermark object;
/// schedule triggers so they never overlap.
pub struct LogSyncJob<W, S, K> {
    config: ExportConfig,
    store: W,
    source: S,
    sink: K,
}

impl<W, S, K> LogSyncJob<W, S, K>
where
    W: WatermarkStore,
    S: LogSource,
    K: LogSink,
{
    pub fn new(config: ExportConfig, store: W, source: S, sink: K) -> Self {
        Self {
            config,
            store,
            source,
            sink,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Runs one export. The trigger payload is not interpreted.
    ///
    /// Errors are returned as their human-readable message.
    pub async fn handle(&self, payload: &serde_json::Value) -> Result<SynchroniseReport, String> {
        debug!(%payload, "[JOB] Trigger received");
        match synchronise(&self.config, &self.store, &self.source, &self.sink).await {
            Ok(report) => {
                info!(exported = report.exported.len(), watermark = report.watermark, "[JOB] Run succeeded");
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "[JOB][ERROR] Run failed");
                Err(e.to_string())
            }
        }
    }
}
