//! Paginated download of a single log file.

use tracing::{debug, error};

use crate::contract::{LogFileDescriptor, LogSource};
use crate::error::SyncError;

/// Marker the database expects for the first portion of a log file.
pub const INITIAL_MARKER: &str = "0";

/// Downloads every portion of `log` and concatenates them in call order.
///
/// Stops once the source reports no additional data pending. Fails with
/// [`SyncError::PaginationLimitExceeded`] rather than fetching more than
/// `max_portions` portions.
pub async fn fetch_full_content<S>(
    source: &S,
    log: &LogFileDescriptor,
    max_portions: usize,
) -> Result<String, SyncError>
where
    S: LogSource + ?Sized,
{
    let mut content = String::new();
    let mut marker = INITIAL_MARKER.to_string();
    let mut portions = 0usize;

    loop {
        if portions == max_portions {
            error!(log = %log.name, portions, "[FETCH][ERROR] Log still pending after portion limit");
            return Err(SyncError::PaginationLimitExceeded {
                log: log.name.clone(),
                portions,
            });
        }

        let portion = source
            .download_portion(&log.name, &marker)
            .await
            .map_err(|e| {
                error!(log = %log.name, marker = %marker, error = %e, "[FETCH][ERROR] Download failed");
                SyncError::Source(format!(
                    "failed to download portion of '{}' at marker '{marker}': {e}",
                    log.name
                ))
            })?;
        portions += 1;
        content.push_str(&portion.data);
        debug!(
            log = %log.name,
            portion = portions,
            bytes = portion.data.len(),
            pending = portion.additional_data_pending,
            "[FETCH] Downloaded log portion"
        );

        if !portion.additional_data_pending {
            return Ok(content);
        }
        marker = portion.marker.ok_or_else(|| {
            SyncError::Source(format!(
                "'{}' reported more data pending without a continuation marker",
                log.name
            ))
        })?;
    }
}
