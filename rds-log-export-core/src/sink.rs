use async_trait::async_trait;
use tracing::{error, info};

use crate::contract::{LogSink, ObjectStore};
use crate::error::SyncError;

/// [`LogSink`] writing straight into a bucket.
pub struct BucketLogSink<O> {
    objects: O,
    bucket: String,
}

impl<O: ObjectStore> BucketLogSink<O> {
    pub fn new(objects: O, bucket: impl Into<String>) -> Self {
        Self {
            objects,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl<O: ObjectStore> LogSink for BucketLogSink<O> {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), SyncError> {
        let bytes = body.len();
        match self.objects.put_object(key, body).await {
            Ok(()) => {
                info!(bucket = %self.bucket, key, bytes, "[SINK] Wrote log file to bucket");
                Ok(())
            }
            Err(e) => {
                error!(bucket = %self.bucket, key, error = %e, "[SINK][ERROR] Error writing object to bucket");
                Err(SyncError::Sink {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
