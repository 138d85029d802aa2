//! Watermark persisted as a decimal timestamp in a bucket object.

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::contract::{ObjectStore, WatermarkStore};
use crate::error::{BucketError, SyncError};

/// [`WatermarkStore`] backed by a single object in a bucket.
pub struct BucketWatermarkStore<O> {
    objects: O,
    bucket: String,
    key: String,
}

impl<O: ObjectStore> BucketWatermarkStore<O> {
    pub fn new(objects: O, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            objects,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Parses a marker object body: ASCII decimal, surrounding whitespace ignored.
pub fn parse_watermark(key: &str, body: &[u8]) -> Result<i64, SyncError> {
    let corrupt = || SyncError::CorruptWatermark {
        key: key.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    };
    std::str::from_utf8(body)
        .map_err(|_| corrupt())?
        .trim()
        .parse::<i64>()
        .map_err(|_| corrupt())
}

#[async_trait]
impl<O: ObjectStore> WatermarkStore for BucketWatermarkStore<O> {
    async fn read(&self) -> Result<i64, SyncError> {
        // A missing bucket is misconfiguration; a missing marker is a first run.
        if let Err(e) = self.objects.head_bucket().await {
            error!(bucket = %self.bucket, error = %e, "[WATERMARK][ERROR] Bucket check failed");
            return Err(match e {
                BucketError::NotFound => {
                    SyncError::Configuration(format!("bucket '{}' not found", self.bucket))
                }
                BucketError::Inaccessible(message) => SyncError::Configuration(format!(
                    "unable to access bucket '{}': {message}",
                    self.bucket
                )),
            });
        }

        let body = self.objects.get_object(&self.key).await.map_err(|e| {
            error!(bucket = %self.bucket, key = %self.key, error = %e, "[WATERMARK][ERROR] Failed to read watermark object");
            SyncError::Store(format!(
                "failed to read '{}' from bucket '{}': {e}",
                self.key, self.bucket
            ))
        })?;

        match body {
            Some(body) => {
                let watermark = parse_watermark(&self.key, &body)?;
                info!(bucket = %self.bucket, key = %self.key, watermark, "[WATERMARK] Retrieved last written time");
                Ok(watermark)
            }
            None => {
                info!(
                    bucket = %self.bucket,
                    key = %self.key,
                    "[WATERMARK] No watermark object found; first export, all logs will be retrieved"
                );
                Ok(0)
            }
        }
    }

    async fn write(&self, watermark: i64) -> Result<(), SyncError> {
        debug!(key = %self.key, watermark, "[WATERMARK] Writing watermark");
        self.objects
            .put_object(&self.key, watermark.to_string().into_bytes())
            .await
            .map_err(|e| {
                error!(bucket = %self.bucket, key = %self.key, error = %e, "[WATERMARK][ERROR] Failed to write watermark object");
                SyncError::Store(format!(
                    "failed to write '{}' to bucket '{}': {e}",
                    self.key, self.bucket
                ))
            })?;
        info!(bucket = %self.bucket, key = %self.key, watermark, "[WATERMARK] Wrote new last written marker");
        Ok(())
    }
}
