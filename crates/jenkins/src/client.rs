//! reqwest-backed [`BuildTrigger`] implementation.

use std::error::Error as _;

use async_trait::async_trait;
use pipeline::{BuildTrigger, EventRecord, TriggerError};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{redirect, Client};
use thiserror::Error;
use tracing::debug;

use crate::{JenkinsConfig, TriggerRequest};

/// Failure to set up the HTTP client.
#[derive(Debug, Error)]
pub enum JenkinsClientError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Triggers parameterized Jenkins builds.
///
/// One instance is built at startup and shared for the lifetime of the
/// process; the underlying connection pool is reused across invocations.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: Client,
    config: JenkinsConfig,
}

impl JenkinsClient {
    /// Creates a client with the configured per-call timeout.
    ///
    /// Redirects are not followed: a 3xx from the CI server is reported like
    /// any other non-2xx status.
    pub fn new(config: JenkinsConfig) -> Result<Self, JenkinsClientError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .redirect(redirect::Policy::none())
            .user_agent(concat!("buildhook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl BuildTrigger for JenkinsClient {
    async fn trigger(&self, record: &EventRecord) -> Result<u16, TriggerError> {
        let request = TriggerRequest::new(&self.config, record);
        debug!(
            endpoint = request.redacted_url(),
            bucket = %record.bucket,
            key = %record.key,
            "Sending build trigger"
        );

        let mut authorization =
            HeaderValue::from_str(request.authorization()).map_err(|e| TriggerError::Unknown {
                description: format!("invalid authorization header: {e}"),
            })?;
        authorization.set_sensitive(true);

        let response = self
            .http
            .post(request.url())
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(TriggerError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            })
        }
    }
}

/// Maps a failed send onto the trigger error taxonomy.
///
/// The URL is stripped from the error first: it carries the trigger token.
fn classify_send_error(err: reqwest::Error) -> TriggerError {
    let err = err.without_url();
    if err.is_builder() {
        TriggerError::Unknown {
            description: describe(&err),
        }
    } else if err.is_connect() || err.is_timeout() || err.is_request() {
        TriggerError::Network {
            reason: describe(&err),
        }
    } else {
        TriggerError::Unknown {
            description: describe(&err),
        }
    }
}

/// Renders an error and its source chain as `outer: inner: root`.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
