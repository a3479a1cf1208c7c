//! Port for starting a build from an accepted record.
//!
//! The domain only knows that a build can be triggered for a record and that
//! the attempt either succeeds with a 2xx status or fails with a classified
//! [`TriggerError`]. Transport, URL layout, and credentials belong to the
//! implementing infrastructure crate.

use async_trait::async_trait;

use crate::{EventRecord, TriggerError};

/// Starts one CI build for one accepted record.
///
/// Implementations make exactly one outbound attempt per call and never retry.
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    /// Triggers the build for `record`.
    ///
    /// Returns the 2xx status code the CI server answered with.
    async fn trigger(&self, record: &EventRecord) -> Result<u16, TriggerError>;
}
