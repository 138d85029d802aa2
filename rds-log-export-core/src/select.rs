//! Reconciles a log listing against the watermark.

use serde::{Deserialize, Serialize};

use crate::contract::LogFileDescriptor;

/// Which qualifying logs survive when a per-run cap is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSelection {
    /// Keep the oldest N logs newer than the watermark. Later runs pick up the rest.
    #[default]
    Oldest,
    /// Keep the newest N logs. Older qualifying logs are skipped for good,
    /// since the watermark moves past them.
    Newest,
}

impl std::str::FromStr for LogSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => Ok(LogSelection::Oldest),
            "newest" => Ok(LogSelection::Newest),
            other => Err(format!(
                "unknown log selection '{other}', expected 'oldest' or 'newest'"
            )),
        }
    }
}

/// Returns the logs to export, ascending by `last_written`.
///
/// Only logs strictly newer than `watermark` qualify. The cap, when set, is
/// applied after sorting and filtering. Logs sharing a timestamp keep their
/// listing order.
pub fn select_candidates(
    mut logs: Vec<LogFileDescriptor>,
    watermark: i64,
    max_logs: Option<usize>,
    selection: LogSelection,
) -> Vec<LogFileDescriptor> {
    logs.sort_by_key(|log| log.last_written);
    logs.retain(|log| log.last_written > watermark);

    if let Some(max) = max_logs {
        if logs.len() > max {
            match selection {
                LogSelection::Oldest => logs.truncate(max),
                LogSelection::Newest => {
                    logs.drain(..logs.len() - max);
                }
            }
        }
    }
    logs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(name: &str, last_written: i64) -> LogFileDescriptor {
        LogFileDescriptor {
            name: name.to_string(),
            last_written,
            size: None,
        }
    }

    fn names(logs: &[LogFileDescriptor]) -> Vec<&str> {
        logs.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn filters_strictly_newer_and_sorts_ascending() {
        let logs = vec![log("c", 2000), log("a", 900), log("w", 1000), log("b", 1500)];
        let selected = select_candidates(logs, 1000, None, LogSelection::Oldest);
        assert_eq!(names(&selected), ["b", "c"]);
    }

    #[test]
    fn oldest_cap_keeps_first_qualifying() {
        let logs = vec![log("d", 40), log("b", 20), log("c", 30), log("a", 10)];
        let selected = select_candidates(logs, 0, Some(2), LogSelection::Oldest);
        assert_eq!(names(&selected), ["a", "b"]);
    }

    #[test]
    fn newest_cap_keeps_last_qualifying_in_ascending_order() {
        let logs = vec![log("d", 40), log("b", 20), log("c", 30), log("a", 10)];
        let selected = select_candidates(logs, 0, Some(2), LogSelection::Newest);
        assert_eq!(names(&selected), ["c", "d"]);
    }

    #[test]
    fn cap_larger_than_candidates_is_a_no_op() {
        let logs = vec![log("a", 10), log("b", 20)];
        let selected = select_candidates(logs, 5, Some(10), LogSelection::Newest);
        assert_eq!(names(&selected), ["a", "b"]);
    }

    #[test]
    fn equal_timestamps_keep_listing_order() {
        let logs = vec![log("x", 10), log("y", 10), log("z", 5)];
        let selected = select_candidates(logs, 0, None, LogSelection::Oldest);
        assert_eq!(names(&selected), ["z", "x", "y"]);
    }

    #[test]
    fn parses_selection_case_insensitively() {
        assert_eq!("Newest".parse::<LogSelection>(), Ok(LogSelection::Newest));
        assert_eq!(" oldest ".parse::<LogSelection>(), Ok(LogSelection::Oldest));
        assert!("recent".parse::<LogSelection>().is_err());
    }
}
