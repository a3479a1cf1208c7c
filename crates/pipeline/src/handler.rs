//! Batch handler: filter, dispatch, and collect one outcome per record.

use tracing::{info, info_span, warn, Instrument};

use crate::{
    filter, BatchReport, BuildTrigger, EventBatch, EventRecord, InvocationId, RecordReport,
    Timestamp, TriggerOutcome,
};

/// Processes every record in `batch`, strictly in order.
///
/// A failed record never stops the loop: each record ends in exactly one
/// [`TriggerOutcome`] and the returned report lists them in input order.
pub async fn process_batch(
    invocation_id: InvocationId,
    batch: &EventBatch,
    trigger: &dyn BuildTrigger,
) -> BatchReport {
    let span = info_span!(
        "process_batch",
        invocation_id = %invocation_id,
        records = batch.len()
    );

    async move {
        let started_at = Timestamp::now();
        let mut records = Vec::with_capacity(batch.len());

        for record in batch.records() {
            let outcome = process_record(record, trigger).await;
            records.push(RecordReport {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
                outcome,
            });
        }

        let report = BatchReport {
            invocation_id,
            started_at,
            finished_at: Timestamp::now(),
            records,
        };

        info!(
            triggered = report.triggered(),
            skipped = report.skipped(),
            failed = report.failed(),
            started_at = %report.started_at,
            finished_at = %report.finished_at,
            "Batch processed"
        );

        report
    }
    .instrument(span)
    .await
}

async fn process_record(record: &EventRecord, trigger: &dyn BuildTrigger) -> TriggerOutcome {
    if let Err(reason) = filter::check_key(&record.key) {
        info!(
            bucket = %record.bucket,
            key = %record.key,
            %reason,
            "Skipping file"
        );
        return TriggerOutcome::Skipped { reason };
    }

    match trigger.trigger(record).await {
        Ok(status) => {
            info!(
                bucket = %record.bucket,
                key = %record.key,
                status,
                "Triggered build"
            );
            TriggerOutcome::Triggered { status }
        }
        Err(error) => {
            warn!(
                bucket = %record.bucket,
                key = %record.key,
                kind = %error.kind(),
                error = %error,
                "Build trigger failed"
            );
            TriggerOutcome::Failed { error }
        }
    }
}
