mod common;

use std::sync::{Arc, Mutex};

use common::{export_config, InMemoryBucket, InMemoryLogs, BUCKET, WATERMARK_KEY};
use rds_log_export_core::job::LogSyncJob;
use rds_log_export_core::sink::BucketLogSink;
use rds_log_export_core::watermark::BucketWatermarkStore;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Collects the debug rendering of every emitted event.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

fn job(
    bucket: Arc<InMemoryBucket>,
    logs: InMemoryLogs,
) -> LogSyncJob<
    BucketWatermarkStore<Arc<InMemoryBucket>>,
    InMemoryLogs,
    BucketLogSink<Arc<InMemoryBucket>>,
> {
    LogSyncJob::new(
        export_config(),
        BucketWatermarkStore::new(bucket.clone(), BUCKET, WATERMARK_KEY),
        logs,
        BucketLogSink::new(bucket, BUCKET),
    )
}

#[tokio::test]
async fn handle_ignores_payload_and_reports_exports() {
    let bucket = Arc::new(InMemoryBucket::new());
    let logs = InMemoryLogs::new().with_log("error.log", 77, &["boom"]);
    let job = job(bucket.clone(), logs);

    let payload = serde_json::json!({ "source": "aws.events", "detail-type": "Scheduled Event" });
    let report = job.handle(&payload).await.expect("run should succeed");

    assert_eq!(report.exported.len(), 1);
    assert_eq!(report.exported[0].key, "rds/error.log");
    assert_eq!(report.exported[0].bytes, 4);
    assert_eq!(bucket.watermark(), Some(77));

    // Second trigger sees the advanced watermark.
    let report = job.handle(&serde_json::Value::Null).await.unwrap();
    assert!(report.exported.is_empty());
}

#[tokio::test]
async fn handle_returns_readable_error_for_missing_bucket() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let job = job(Arc::new(InMemoryBucket::missing()), InMemoryLogs::new());
    let err = job.handle(&serde_json::Value::Null).await.unwrap_err();

    assert_eq!(err, "configuration error: bucket 'db-logs' not found");
    let events = events.lock().unwrap();
    assert!(
        events.iter().any(|e| e.contains("Run failed")),
        "expected a 'Run failed' event, got: {events:?}"
    );
}
