//! Serverless run mode: one notification per invocation.

use std::sync::Arc;

use lambda_runtime::{service_fn, LambdaEvent};
use listener::KeyEncoding;
use pipeline::{process_batch, BatchStatus, BuildTrigger, InvocationId};
use serde_json::Value;
use uuid::Uuid;

/// Runs the invocation loop until the runtime shuts the process down.
pub async fn run(trigger: Arc<dyn BuildTrigger>, encoding: KeyEncoding) -> anyhow::Result<()> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let trigger = Arc::clone(&trigger);
        async move {
            let (payload, context) = event.into_parts();
            let invocation_id = Uuid::parse_str(&context.request_id)
                .map(InvocationId::from_uuid)
                .unwrap_or_else(|_| InvocationId::new_random());
            handle(invocation_id, payload, trigger.as_ref(), encoding).await
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("serverless runtime failed: {e}"))
}

/// Processes one invocation payload.
///
/// Fails only when the payload is not a notification; per-record failures are
/// logged and the batch is still acknowledged.
pub async fn handle(
    invocation_id: InvocationId,
    payload: Value,
    trigger: &dyn BuildTrigger,
    encoding: KeyEncoding,
) -> Result<BatchStatus, lambda_runtime::Error> {
    let batch = listener::decode_notification(payload, encoding)?;
    let report = process_batch(invocation_id, &batch, trigger).await;
    Ok(report.status())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pipeline::{EventRecord, TriggerError};
    use serde_json::json;

    use super::*;

    struct FailSecond;

    #[async_trait]
    impl BuildTrigger for FailSecond {
        async fn trigger(&self, record: &EventRecord) -> Result<u16, TriggerError> {
            if record.key.as_str().starts_with("second") {
                Err(TriggerError::Network {
                    reason: "connection refused".into(),
                })
            } else {
                Ok(201)
            }
        }
    }

    fn entry(key: &str) -> Value {
        json!({ "s3": { "bucket": { "name": "b1" }, "object": { "key": key } } })
    }

    #[tokio::test]
    async fn acknowledges_batch_with_failed_records() {
        let payload = json!({
            "Records": [
                entry("first_output_1.json"),
                entry("second_output_2.json"),
                entry("third_output_3.json")
            ]
        });

        let status = handle(InvocationId::new_random(), payload, &FailSecond, KeyEncoding::Raw)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(status).unwrap(),
            json!({ "status": "done" })
        );
    }

    #[tokio::test]
    async fn rejects_payload_that_is_not_a_notification() {
        let result = handle(
            InvocationId::new_random(),
            json!({ "hello": "world" }),
            &FailSecond,
            KeyEncoding::Raw,
        )
        .await;
        assert!(result.is_err());
    }
}
