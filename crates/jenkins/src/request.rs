//! Construction of one build-trigger call.

use base64::{prelude::BASE64_STANDARD, Engine};
use pipeline::EventRecord;
use url::form_urlencoded;

use crate::JenkinsConfig;

/// Everything needed to perform one trigger call for one record.
///
/// Built fresh per accepted record and dropped once the call completes. Holds
/// the trigger token (inside the URL) and the basic-auth credential, so its
/// `Debug` output shows only [`TriggerRequest::redacted_url`].
#[derive(Clone)]
pub struct TriggerRequest {
    endpoint: String,
    query: String,
    authorization: String,
}

impl TriggerRequest {
    /// Builds the call for `record` against the configured job.
    pub fn new(config: &JenkinsConfig, record: &EventRecord) -> Self {
        let endpoint = format!(
            "{}/job/{}/buildWithParameters",
            config.base_url(),
            config.job_name()
        );

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("token", config.trigger_token().expose())
            .append_pair("BUCKET", record.bucket.as_str())
            .append_pair("KEY", record.key.as_str())
            .finish();

        let credentials = format!("{}:{}", config.username(), config.api_token().expose());
        let authorization = format!("Basic {}", BASE64_STANDARD.encode(credentials));

        Self {
            endpoint,
            query,
            authorization,
        }
    }

    /// Full target URL including the query string. Contains the trigger token.
    pub fn url(&self) -> String {
        format!("{}?{}", self.endpoint, self.query)
    }

    /// Target URL without the query string; safe to log.
    pub fn redacted_url(&self) -> &str {
        &self.endpoint
    }

    /// Encoded `token=..&BUCKET=..&KEY=..` query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> &str {
        &self.authorization
    }
}

impl std::fmt::Debug for TriggerRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRequest")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
