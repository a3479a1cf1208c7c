//! Shared value types for the Buildhook domain.
//!
//! Records flow through the handler as [`EventRecord`]s grouped in an
//! [`EventBatch`]; each one leaves as exactly one [`TriggerOutcome`], collected
//! in a [`BatchReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BucketName, InvocationId, ObjectKey, TriggerError, TriggerErrorKind};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One object-creation notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Container the object was created in.
    pub bucket: BucketName,
    /// Path of the created object.
    pub key: ObjectKey,
}

impl EventRecord {
    /// Creates a record from its parts.
    pub fn new(bucket: BucketName, key: ObjectKey) -> Self {
        Self { bucket, key }
    }
}

// ---------------------------------------------------------------------------

/// The records delivered in one invocation, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch {
    records: Vec<EventRecord>,
}

impl EventBatch {
    /// Creates a batch from an ordered list of records.
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in delivery order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<EventRecord> for EventBatch {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a record was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The object key does not follow the `<id>_output_<digits>.json` convention.
    PatternMismatch,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatternMismatch => f.write_str("does not match pattern"),
        }
    }
}

// ---------------------------------------------------------------------------

/// Terminal state of one record.
///
/// `Received → {Skipped | Dispatching → {Triggered | Failed}}`; there is no
/// transition out of any of these variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The record was filtered out and no call was made.
    Skipped {
        /// Why the record was filtered out.
        reason: SkipReason,
    },
    /// The CI server accepted the trigger.
    Triggered {
        /// 2xx status returned by the CI server.
        status: u16,
    },
    /// The trigger call was made (or attempted) and failed.
    Failed {
        /// Classified failure.
        error: TriggerError,
    },
}

impl TriggerOutcome {
    /// Returns the failure classification, if this outcome is a failure.
    pub fn error_kind(&self) -> Option<TriggerErrorKind> {
        match self {
            Self::Failed { error } => Some(error.kind()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------

/// Outcome of one record, tagged with the location it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReport {
    pub bucket: BucketName,
    pub key: ObjectKey,
    #[serde(flatten)]
    pub outcome: TriggerOutcome,
}

// ---------------------------------------------------------------------------

/// Per-record results of one handler invocation, in input order.
///
/// `records.len()` always equals the number of records in the batch that was
/// processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub invocation_id: InvocationId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    /// Number of records the CI server accepted.
    pub fn triggered(&self) -> usize {
        self.count(|o| matches!(o, TriggerOutcome::Triggered { .. }))
    }

    /// Number of records filtered out.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TriggerOutcome::Skipped { .. }))
    }

    /// Number of records whose trigger failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TriggerOutcome::Failed { .. }))
    }

    /// The coarse acknowledgment returned to the invoking environment.
    ///
    /// Always "done", whatever the per-record results were.
    pub fn status(&self) -> BatchStatus {
        BatchStatus::done()
    }

    fn count(&self, pred: impl Fn(&TriggerOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

// ---------------------------------------------------------------------------

/// Processing state carried in a [`BatchStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Every record in the batch reached a terminal outcome.
    Done,
}

/// Invocation response: `{"status": "done"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatus {
    pub status: BatchState,
}

impl BatchStatus {
    /// The acknowledgment for a fully processed batch.
    pub fn done() -> Self {
        Self {
            status: BatchState::Done,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<TriggerOutcome>) -> BatchReport {
        let records = outcomes
            .into_iter()
            .map(|outcome| RecordReport {
                bucket: BucketName::new("b1").unwrap(),
                key: ObjectKey::new("u_output_1.json"),
                outcome,
            })
            .collect();
        BatchReport {
            invocation_id: InvocationId::new_random(),
            started_at: Timestamp::now(),
            finished_at: Timestamp::now(),
            records,
        }
    }

    #[test]
    fn counts_each_outcome() {
        let r = report(vec![
            TriggerOutcome::Triggered { status: 201 },
            TriggerOutcome::Skipped {
                reason: SkipReason::PatternMismatch,
            },
            TriggerOutcome::Failed {
                error: TriggerError::Network {
                    reason: "refused".into(),
                },
            },
            TriggerOutcome::Triggered { status: 200 },
        ]);
        assert_eq!(r.triggered(), 2);
        assert_eq!(r.skipped(), 1);
        assert_eq!(r.failed(), 1);
    }

    #[test]
    fn status_is_done_even_when_everything_failed() {
        let r = report(vec![TriggerOutcome::Failed {
            error: TriggerError::Unknown {
                description: "x".into(),
            },
        }]);
        let json = serde_json::to_value(r.status()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "done" }));
    }

    #[test]
    fn timestamp_displays_as_rfc3339() {
        let ts = Timestamp::now();
        let rendered = ts.to_string();
        assert!(chrono::DateTime::parse_from_rfc3339(&rendered).is_ok(), "{rendered}");
    }

    #[test]
    fn record_report_flattens_outcome() {
        let r = RecordReport {
            bucket: BucketName::new("b1").unwrap(),
            key: ObjectKey::new("k"),
            outcome: TriggerOutcome::Triggered { status: 201 },
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"], "triggered");
        assert_eq!(json["status"], 201);
        assert_eq!(json["bucket"], "b1");
    }
}
