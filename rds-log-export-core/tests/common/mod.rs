#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use rds_log_export_core::config::{ExportConfig, DEFAULT_MAX_PORTIONS_PER_LOG};
use rds_log_export_core::contract::{LogFileDescriptor, LogPortion, LogSource, ObjectStore};
use rds_log_export_core::error::{BoxError, BucketError};
use rds_log_export_core::select::LogSelection;

pub const BUCKET: &str = "db-logs";
pub const WATERMARK_KEY: &str = "last_received_file.txt";

pub fn export_config() -> ExportConfig {
    ExportConfig {
        region: None,
        bucket: BUCKET.into(),
        object_prefix: "rds/".into(),
        db_instance_identifier: "prod-mysql".into(),
        log_name_filter: ".log".into(),
        watermark_key: WATERMARK_KEY.into(),
        max_logs_per_run: None,
        selection: LogSelection::Oldest,
        max_portions_per_log: DEFAULT_MAX_PORTIONS_PER_LOG,
    }
}

/// Bucket held in memory, recording every write in order.
pub struct InMemoryBucket {
    exists: bool,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    writes: Mutex<Vec<String>>,
    fail_puts_for: Option<String>,
}

impl InMemoryBucket {
    pub fn new() -> Self {
        Self {
            exists: true,
            objects: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_puts_for: None,
        }
    }

    pub fn missing() -> Self {
        Self {
            exists: false,
            ..Self::new()
        }
    }

    pub fn with_watermark(watermark: i64) -> Self {
        let bucket = Self::new();
        bucket
            .objects
            .lock()
            .unwrap()
            .insert(WATERMARK_KEY.to_string(), watermark.to_string().into_bytes());
        bucket
    }

    pub fn failing_puts_for(mut self, key: &str) -> Self {
        self.fail_puts_for = Some(key.to_string());
        self
    }

    pub fn object(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|b| String::from_utf8(b.clone()).unwrap())
    }

    pub fn watermark(&self) -> Option<i64> {
        self.object(WATERMARK_KEY).map(|b| b.parse().unwrap())
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryBucket {
    async fn head_bucket(&self) -> Result<(), BucketError> {
        if self.exists {
            Ok(())
        } else {
            Err(BucketError::NotFound)
        }
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), BoxError> {
        if self.fail_puts_for.as_deref() == Some(key) {
            return Err(format!("AccessDenied writing {key}").into());
        }
        self.writes.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }
}

/// Database log listing where each log is served as a fixed list of chunks.
pub struct InMemoryLogs {
    logs: Vec<LogFileDescriptor>,
    chunks: HashMap<String, Vec<String>>,
    pub downloads: Mutex<Vec<(String, String)>>,
}

impl InMemoryLogs {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            chunks: HashMap::new(),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_log(mut self, name: &str, last_written: i64, chunks: &[&str]) -> Self {
        self.logs.push(LogFileDescriptor {
            name: name.to_string(),
            last_written,
            size: None,
        });
        self.chunks.insert(
            name.to_string(),
            chunks.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn downloaded_logs(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (name, _) in self.downloads.lock().unwrap().iter() {
            if names.last() != Some(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

#[async_trait]
impl LogSource for InMemoryLogs {
    async fn list_logs(&self, name_filter: &str) -> Result<Vec<LogFileDescriptor>, BoxError> {
        Ok(self
            .logs
            .iter()
            .filter(|l| l.name.contains(name_filter))
            .cloned()
            .collect())
    }

    async fn download_portion(
        &self,
        log_file_name: &str,
        marker: &str,
    ) -> Result<LogPortion, BoxError> {
        self.downloads
            .lock()
            .unwrap()
            .push((log_file_name.to_string(), marker.to_string()));
        let chunks = self
            .chunks
            .get(log_file_name)
            .ok_or_else(|| format!("DBLogFileNotFoundFault: {log_file_name}"))?;
        // Markers are "0", "m1", "m2", ... so the index is recoverable from the marker.
        let index: usize = if marker == "0" {
            0
        } else {
            marker.trim_start_matches('m').parse()?
        };
        let pending = index + 1 < chunks.len();
        Ok(LogPortion {
            data: chunks.get(index).cloned().unwrap_or_default(),
            marker: Some(format!("m{}", index + 1)),
            additional_data_pending: pending,
        })
    }
}
