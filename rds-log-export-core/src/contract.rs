#![allow(unused)]

//! # contract: interfaces between the export pipeline and the outside world
//!
//! The pipeline talks to exactly three capabilities:
//! - [`WatermarkStore`]: reads and writes the last exported `last_written` timestamp.
//! - [`LogSource`]: lists database log files and downloads them one portion at a time.
//! - [`LogSink`]: writes one exported log under a key.
//!
//! [`ObjectStore`] is the bucket primitive the watermark store and the sink are
//! built on (see [`crate::watermark::BucketWatermarkStore`] and
//! [`crate::sink::BucketLogSink`]).
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; the generated `Mock*` types are
//!   exported behind the `test-export-mocks` feature so integration tests and
//!   the CLI crate can use them.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

use crate::error::{BoxError, BucketError, SyncError};

/// A log file as listed by the database, before its content is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileDescriptor {
    /// Log file name as reported by the database (e.g. `error/mysql-error.log`).
    pub name: String,
    /// Last write time in epoch milliseconds.
    pub last_written: i64,
    /// Size in bytes, when the database reports it.
    pub size: Option<i64>,
}

/// One page of a log file download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogPortion {
    pub data: String,
    /// Continuation marker for the next portion.
    pub marker: Option<String>,
    pub additional_data_pending: bool,
}

/// Persistent "last exported" timestamp.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Returns the stored watermark, or 0 when none has been written yet.
    ///
    /// Fails with [`SyncError::Configuration`] when the backing bucket itself
    /// is missing or inaccessible.
    async fn read(&self) -> Result<i64, SyncError>;

    /// Overwrites the stored watermark.
    async fn write(&self, watermark: i64) -> Result<(), SyncError>;
}

/// Database log listing and paginated download.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Lists every log file whose name matches `name_filter`, in no particular order.
    async fn list_logs(&self, name_filter: &str) -> Result<Vec<LogFileDescriptor>, BoxError>;

    /// Downloads the portion of `log_file_name` that starts at `marker`.
    async fn download_portion(
        &self,
        log_file_name: &str,
        marker: &str,
    ) -> Result<LogPortion, BoxError>;
}

/// Destination for exported logs. Writes replace any existing object.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), SyncError>;
}

/// Minimal bucket operations.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Checks that the bucket exists and is reachable with the current credentials.
    async fn head_bucket(&self) -> Result<(), BucketError>;

    /// Reads an object. Returns `Ok(None)` when the key does not exist.
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError>;

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), BoxError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn head_bucket(&self) -> Result<(), BucketError> {
        (**self).head_bucket().await
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        (**self).get_object(key).await
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), BoxError> {
        (**self).put_object(key, body).await
    }
}
