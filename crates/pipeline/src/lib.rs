//! Core domain for Buildhook.
//!
//! Buildhook reacts to object-creation notifications: every record whose key
//! follows the `<identifier>_output_<digits>.json` convention starts one CI
//! build; everything else is skipped. This crate holds the record and outcome
//! types, the key filter, the [`BuildTrigger`] port, and the batch handler.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it
//! (`jenkins` implements [`BuildTrigger`], `listener` produces [`EventBatch`]es).
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`BucketName`, `ObjectKey`, `JobName`, `InvocationId`) |
//! | [`types`] | Records, batches, outcomes, and the batch report |
//! | [`errors`] | Per-record trigger errors and startup configuration errors |
//! | [`filter`] | Object-key naming convention |
//! | [`dispatch`] | The [`BuildTrigger`] port |
//! | [`handler`] | Sequential batch processing |

pub mod dispatch;
pub mod errors;
pub mod filter;
pub mod handler;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use dispatch::BuildTrigger;
pub use errors::{ConfigurationError, TriggerError, TriggerErrorKind};
pub use filter::{check_key, is_output_key};
pub use handler::process_batch;
pub use identifiers::{BucketName, InvocationId, JobName, ObjectKey};
pub use types::{
    BatchReport, BatchState, BatchStatus, EventBatch, EventRecord, RecordReport, SkipReason,
    Timestamp, TriggerOutcome,
};
