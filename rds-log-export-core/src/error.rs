//! Error taxonomy for a log export run.
//!
//! Every variant aborts the run it occurs in. The only "failure" that is not
//! an error is an absent watermark object, which the watermark store treats as
//! a first run.

use thiserror::Error;

/// Boxed error returned across the low-level trait seams
/// ([`crate::contract::ObjectStore`], [`crate::contract::LogSource`]).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The bucket is missing or inaccessible, or the configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading or writing the watermark object failed.
    #[error("watermark store error: {0}")]
    Store(String),

    /// The watermark object exists but its body is not a decimal timestamp.
    #[error("watermark object '{key}' does not contain a timestamp: {body:?}")]
    CorruptWatermark { key: String, body: String },

    /// Uploading an exported log failed.
    #[error("failed to write object '{key}': {message}")]
    Sink { key: String, message: String },

    /// Listing or downloading logs from the database failed.
    #[error("log source error: {0}")]
    Source(String),

    /// The database kept reporting pending data for a single log.
    #[error("log '{log}' still had data pending after {portions} portions")]
    PaginationLimitExceeded { log: String, portions: usize },
}

/// Outcome of checking the bucket that backs the watermark and exported logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BucketError {
    #[error("bucket not found")]
    NotFound,
    #[error("unable to access bucket: {0}")]
    Inaccessible(String),
}
