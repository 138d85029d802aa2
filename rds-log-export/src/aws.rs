#![doc = "AWS integration for the CLI: S3 as the object store and RDS as the log source."]
//
//! # AWS clients
//!
//! Implements the core contracts against the AWS SDK:
//! - [`S3ObjectStore`]: [`ObjectStore`] over one S3 bucket. Wrapped by the core's
//!   `BucketWatermarkStore` and `BucketLogSink`.
//! - [`RdsLogSource`]: [`LogSource`] over `DescribeDBLogFiles` and
//!   `DownloadDBLogFilePortion` for one DB instance.
//!
//! Both are built once from a shared [`SdkConfig`] (see [`load_sdk_config`]).
//! Credentials come from the SDK's default provider chain.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use rds_log_export_core::contract::{LogFileDescriptor, LogPortion, LogSource, ObjectStore};
use rds_log_export_core::error::{BoxError, BucketError};

/// Loads the shared SDK configuration, pinning the region when one is configured.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let sdk_config = loader.load().await;
    tracing::info!(region = ?sdk_config.region(), "Loaded AWS SDK configuration");
    sdk_config
}

/// Full error chain of an SDK failure, including the service's own message.
fn describe<E: std::error::Error>(err: E) -> String {
    DisplayErrorContext(err).to_string()
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_bucket(&self) -> Result<(), BucketError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                let not_found = status == Some(404)
                    || err.as_service_error().is_some_and(|e| e.is_not_found());
                if not_found {
                    tracing::error!(bucket = %self.bucket, "Bucket name provided not found");
                    Err(BucketError::NotFound)
                } else {
                    tracing::error!(bucket = %self.bucket, ?status, "Unable to access bucket");
                    let message = match status {
                        Some(status) => format!("HTTP {status}: {}", describe(err)),
                        None => describe(err),
                    };
                    Err(BucketError::Inaccessible(message))
                }
            }
        }
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let body = output.body.collect().await?.into_bytes();
                tracing::debug!(bucket = %self.bucket, key, bytes = body.len(), "Read object");
                Ok(Some(body.to_vec()))
            }
            Err(err) => {
                let missing = err.raw_response().map(|r| r.status().as_u16()) == Some(404)
                    || err.as_service_error().is_some_and(|e| e.is_no_such_key());
                if missing {
                    tracing::debug!(bucket = %self.bucket, key, "Object not found");
                    Ok(None)
                } else {
                    Err(describe(err).into())
                }
            }
        }
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), BoxError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| BoxError::from(describe(err)))?;
        Ok(())
    }
}

/// Upper bound on `DescribeDBLogFiles` pages for one listing.
pub const DEFAULT_MAX_LIST_PAGES: usize = 10_000;

pub struct RdsLogSource {
    client: aws_sdk_rds::Client,
    db_instance_identifier: String,
    max_list_pages: usize,
}

impl RdsLogSource {
    pub fn new(sdk_config: &SdkConfig, db_instance_identifier: impl Into<String>) -> Self {
        Self::from_client(aws_sdk_rds::Client::new(sdk_config), db_instance_identifier)
    }

    pub fn from_client(
        client: aws_sdk_rds::Client,
        db_instance_identifier: impl Into<String>,
    ) -> Self {
        Self {
            client,
            db_instance_identifier: db_instance_identifier.into(),
            max_list_pages: DEFAULT_MAX_LIST_PAGES,
        }
    }

    /// Caps how many listing pages are followed before giving up.
    pub fn with_max_list_pages(mut self, max_list_pages: usize) -> Self {
        self.max_list_pages = max_list_pages;
        self
    }
}

#[async_trait]
impl LogSource for RdsLogSource {
    async fn list_logs(&self, name_filter: &str) -> Result<Vec<LogFileDescriptor>, BoxError> {
        let mut logs = Vec::new();
        let mut marker: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if pages == self.max_list_pages {
                tracing::error!(
                    db_instance = %self.db_instance_identifier,
                    pages,
                    "DescribeDBLogFiles still paging after page limit"
                );
                return Err(format!(
                    "DescribeDBLogFiles for '{}' still returned a marker after {pages} pages",
                    self.db_instance_identifier
                )
                .into());
            }

            let previous = marker.clone();
            let mut request = self
                .client
                .describe_db_log_files()
                .db_instance_identifier(&self.db_instance_identifier)
                .set_marker(marker.take());
            if !name_filter.is_empty() {
                request = request.filename_contains(name_filter);
            }
            let output = request
                .send()
                .await
                .map_err(|err| BoxError::from(describe(err)))?;
            pages += 1;

            for details in output.describe_db_log_files() {
                match (details.log_file_name(), details.last_written()) {
                    (Some(name), Some(last_written)) => logs.push(LogFileDescriptor {
                        name: name.to_string(),
                        last_written,
                        size: details.size(),
                    }),
                    _ => tracing::warn!(?details, "Skipping log file entry without name or timestamp"),
                }
            }

            match output.marker() {
                Some(next) if !next.is_empty() => {
                    // A marker that does not advance would page forever.
                    if previous.as_deref() == Some(next) {
                        return Err(format!(
                            "DescribeDBLogFiles for '{}' repeated marker '{next}'",
                            self.db_instance_identifier
                        )
                        .into());
                    }
                    marker = Some(next.to_string());
                }
                _ => break,
            }
        }

        tracing::info!(
            db_instance = %self.db_instance_identifier,
            name_filter,
            count = logs.len(),
            "Described DB log files"
        );
        Ok(logs)
    }

    async fn download_portion(
        &self,
        log_file_name: &str,
        marker: &str,
    ) -> Result<LogPortion, BoxError> {
        let output = self
            .client
            .download_db_log_file_portion()
            .db_instance_identifier(&self.db_instance_identifier)
            .log_file_name(log_file_name)
            .marker(marker)
            .send()
            .await
            .map_err(|err| BoxError::from(describe(err)))?;

        Ok(LogPortion {
            data: output.log_file_data().unwrap_or_default().to_string(),
            marker: output.marker().map(str::to_string),
            additional_data_pending: output.additional_data_pending().unwrap_or(false),
        })
    }
}
