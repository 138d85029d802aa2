use tracing::{debug, info};

use crate::error::SyncError;
use crate::select::LogSelection;

/// Object key of the watermark when none is configured.
pub const DEFAULT_WATERMARK_KEY: &str = "last_received_file.txt";

/// Upper bound on download portions fetched for a single log file.
pub const DEFAULT_MAX_PORTIONS_PER_LOG: usize = 10_000;

/// Everything one export run needs to know, validated before the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// AWS region of both the bucket and the database. `None` defers to the SDK's provider chain.
    pub region: Option<String>,
    pub bucket: String,
    /// Prepended verbatim to each log file name to form its object key.
    pub object_prefix: String,
    pub db_instance_identifier: String,
    /// Substring a log file name must contain to be exported. Empty matches all.
    pub log_name_filter: String,
    pub watermark_key: String,
    pub max_logs_per_run: Option<usize>,
    pub selection: LogSelection,
    pub max_portions_per_log: usize,
}

impl ExportConfig {
    /// Rejects configurations that could never produce a meaningful run.
    pub fn validate(&self) -> Result<(), SyncError> {
        let required = [
            ("bucket", &self.bucket),
            ("db_instance_identifier", &self.db_instance_identifier),
            ("watermark_key", &self.watermark_key),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Configuration(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.max_logs_per_run == Some(0) {
            return Err(SyncError::Configuration(
                "max_logs_per_run must be at least 1 when set".to_string(),
            ));
        }
        if self.max_portions_per_log == 0 {
            return Err(SyncError::Configuration(
                "max_portions_per_log must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Object key an exported log file is written under.
    pub fn object_key(&self, log_file_name: &str) -> String {
        format!("{}{}", self.object_prefix, log_file_name)
    }

    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            db_instance = %self.db_instance_identifier,
            log_name_filter = %self.log_name_filter,
            watermark_key = %self.watermark_key,
            max_logs_per_run = ?self.max_logs_per_run,
            selection = ?self.selection,
            "Loaded ExportConfig"
        );
        debug!(?self, "ExportConfig loaded (full debug)");
    }
}
