//! Buildhook CI adapter.
//!
//! Implements the [`pipeline::BuildTrigger`] port against a Jenkins server's
//! parameterized build webhook:
//!
//! ```text
//! POST <base-url>/job/<job-name>/buildWithParameters?token=<t>&BUCKET=<b>&KEY=<k>
//! Authorization: Basic base64(<user>:<api-token>)
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL layout, query encoding, credentials, timeouts, and
//! the mapping of transport failures onto [`pipeline::TriggerError`] all live
//! here. The [`pipeline`] crate sees only [`pipeline::BuildTrigger`].
//!
//! ## Outcome classification
//!
//! | Result of the call | Returned |
//! |--------------------|----------|
//! | 2xx | `Ok(status)` |
//! | any other status (including 3xx) | `TriggerError::Http` |
//! | DNS, connect, TLS, timeout, send failure | `TriggerError::Network` |
//! | anything else | `TriggerError::Unknown` |

pub mod client;
pub mod config;
pub mod request;

pub use client::{JenkinsClient, JenkinsClientError};
pub use config::{JenkinsConfig, JenkinsSettings, Secret, DEFAULT_JOB_NAME, DEFAULT_TIMEOUT};
pub use request::TriggerRequest;
