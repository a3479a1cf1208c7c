//! One-shot run mode: replay a single notification and print the report.

use std::path::Path;

use anyhow::Context;
use listener::KeyEncoding;
use pipeline::{process_batch, BatchReport, BuildTrigger, InvocationId};
use tokio::io::AsyncReadExt;

/// Reads a notification from `event` (`-` for stdin), processes it, and prints
/// the per-record report as JSON on stdout.
pub async fn run(
    trigger: &dyn BuildTrigger,
    encoding: KeyEncoding,
    event: &Path,
) -> anyhow::Result<()> {
    let bytes = read_event(event).await?;
    let report = process(&bytes, trigger, encoding).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to render batch report")?
    );
    Ok(())
}

async fn process(
    bytes: &[u8],
    trigger: &dyn BuildTrigger,
    encoding: KeyEncoding,
) -> anyhow::Result<BatchReport> {
    let batch = listener::decode_notification_slice(bytes, encoding)?;
    Ok(process_batch(InvocationId::new_random(), &batch, trigger).await)
}

async fn read_event(event: &Path) -> anyhow::Result<Vec<u8>> {
    if event == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("failed to read notification from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read(event)
            .await
            .with_context(|| format!("failed to read notification from {}", event.display()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pipeline::{EventRecord, TriggerError, TriggerOutcome};

    use super::*;

    struct AlwaysForbidden;

    #[async_trait]
    impl BuildTrigger for AlwaysForbidden {
        async fn trigger(&self, _record: &EventRecord) -> Result<u16, TriggerError> {
            Err(TriggerError::Http {
                status: 403,
                reason: "Forbidden".into(),
            })
        }
    }

    #[tokio::test]
    async fn report_lists_every_record() {
        let bytes = br#"{"Records":[
            {"s3":{"bucket":{"name":"b1"},"object":{"key":"u_output_42.json"}}},
            {"s3":{"bucket":{"name":"b1"},"object":{"key":"readme.md"}}}
        ]}"#;

        let report = process(bytes, &AlwaysForbidden, KeyEncoding::Raw).await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(
            report.records[0].outcome,
            TriggerOutcome::Failed {
                error: TriggerError::Http { status: 403, .. }
            }
        ));
    }

    #[tokio::test]
    async fn missing_event_file_is_reported() {
        let err = read_event(Path::new("/nonexistent/event.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/event.json"));
    }
}
