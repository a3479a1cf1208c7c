//! Object-storage notification decoding.
//!
//! Only the fields the handler needs are read:
//!
//! ```json
//! { "Records": [ { "s3": { "bucket": { "name": "b1" }, "object": { "key": "u_output_42.json" } } } ] }
//! ```
//!
//! Everything else in the notification (event name, sizes, request ids) is
//! ignored.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use pipeline::{BucketName, EventBatch, EventRecord, ObjectKey};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// The payload is not an object-storage notification at all.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Malformed notification: {0}")]
    MalformedNotification(#[from] serde_json::Error),
}

/// How object keys arrive in the notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyEncoding {
    /// Use keys exactly as delivered.
    #[default]
    Raw,
    /// Keys are form-URL-encoded (`+` for space, `%XX` escapes) and are
    /// decoded before use.
    UrlEncoded,
}

#[derive(Deserialize)]
struct Notification {
    #[serde(rename = "Records")]
    records: Vec<Value>,
}

#[derive(Deserialize)]
struct NotificationRecord {
    s3: S3Entity,
}

#[derive(Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Deserialize)]
struct S3Object {
    key: String,
}

/// Decodes a notification payload into an [`EventBatch`], preserving order.
///
/// A payload without a `Records` array is rejected as a whole. Individual
/// entries missing a bucket name or object key are logged and left out of the
/// batch; the remaining entries are still returned.
pub fn decode_notification(
    payload: Value,
    encoding: KeyEncoding,
) -> Result<EventBatch, ListenerError> {
    let notification: Notification = serde_json::from_value(payload)?;

    let batch = notification
        .records
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match decode_record(entry, encoding) {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!(index, %reason, "Dropping malformed notification record");
                None
            }
        })
        .collect();

    Ok(batch)
}

/// Parses raw bytes and decodes them with [`decode_notification`].
pub fn decode_notification_slice(
    bytes: &[u8],
    encoding: KeyEncoding,
) -> Result<EventBatch, ListenerError> {
    let payload: Value = serde_json::from_slice(bytes)?;
    decode_notification(payload, encoding)
}

fn decode_record(entry: Value, encoding: KeyEncoding) -> Result<EventRecord, String> {
    let record: NotificationRecord = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    let bucket =
        BucketName::new(record.s3.bucket.name).ok_or_else(|| "empty bucket name".to_string())?;
    let key = match encoding {
        KeyEncoding::Raw => record.s3.object.key,
        KeyEncoding::UrlEncoded => decode_key(&record.s3.object.key).into_owned(),
    };
    Ok(EventRecord::new(bucket, ObjectKey::new(key)))
}

fn decode_key(key: &str) -> Cow<'_, str> {
    if !key.contains(['+', '%']) {
        return Cow::Borrowed(key);
    }
    let spaced = key.replace('+', " ");
    Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
}
