//! Connection settings for the CI server.
//!
//! [`JenkinsSettings`] is the raw, unvalidated input as supplied by the
//! composition root. [`JenkinsConfig`] is the validated form: once one exists,
//! every required value is present and the base URL is usable.

use std::time::Duration;

use pipeline::{ConfigurationError, JobName};
use url::Url;

/// Job triggered when no job name is configured.
pub const DEFAULT_JOB_NAME: &str = "terraform-deploy";

/// Per-call transport bound applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A credential that must never appear in logs.
///
/// `Debug` and `Display` both print `[REDACTED]`; the value is only reachable
/// through [`Secret::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Unvalidated CI connection settings.
#[derive(Debug, Clone)]
pub struct JenkinsSettings {
    /// Base URL of the CI server (`JENKINS_URL`).
    pub base_url: String,
    /// Query-string trigger token (`JENKINS_TOKEN`).
    pub trigger_token: Secret,
    /// HTTP Basic identity (`JENKINS_USER`).
    pub username: String,
    /// HTTP Basic credential (`JENKINS_API_TOKEN`).
    pub api_token: Secret,
    /// Job to trigger (`JOB_NAME`); `None` selects [`DEFAULT_JOB_NAME`].
    pub job_name: Option<String>,
    /// Transport bound per call; `None` selects [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
}

/// Validated CI connection settings.
#[derive(Debug, Clone)]
pub struct JenkinsConfig {
    base_url: String,
    job_name: JobName,
    trigger_token: Secret,
    username: String,
    api_token: Secret,
    timeout: Duration,
}

impl JenkinsConfig {
    /// Validates `settings`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::Missing`] for any empty required value and
    /// [`ConfigurationError::Invalid`] for a base URL that is not an absolute
    /// `http`/`https` URL, a job name that is not a single path segment, or a
    /// zero timeout.
    pub fn from_settings(settings: JenkinsSettings) -> Result<Self, ConfigurationError> {
        let base_url = validate_base_url(&settings.base_url)?;

        let job_name = match settings.job_name {
            None => JobName::new(DEFAULT_JOB_NAME),
            Some(name) => JobName::new(name),
        }
        .ok_or(ConfigurationError::Missing {
            setting: "JOB_NAME",
        })?;
        validate_job_name(&job_name)?;

        if settings.trigger_token.is_empty() {
            return Err(ConfigurationError::Missing {
                setting: "JENKINS_TOKEN",
            });
        }
        if settings.username.is_empty() {
            return Err(ConfigurationError::Missing {
                setting: "JENKINS_USER",
            });
        }
        if settings.api_token.is_empty() {
            return Err(ConfigurationError::Missing {
                setting: "JENKINS_API_TOKEN",
            });
        }

        let timeout = settings.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigurationError::Invalid {
                setting: "JENKINS_TIMEOUT_SECS",
                reason: "timeout must be greater than zero".into(),
            });
        }

        Ok(Self {
            base_url,
            job_name,
            trigger_token: settings.trigger_token,
            username: settings.username,
            api_token: settings.api_token,
            timeout,
        })
    }

    /// Base URL without a trailing `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn job_name(&self) -> &JobName {
        &self.job_name
    }

    pub fn trigger_token(&self) -> &Secret {
        &self.trigger_token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn api_token(&self) -> &Secret {
        &self.api_token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// The job name is inserted as a single raw path segment, so it must not
/// contain anything that ends the segment or the path.
fn validate_job_name(job_name: &JobName) -> Result<(), ConfigurationError> {
    let name = job_name.as_str();
    match name
        .chars()
        .find(|c| matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_control())
    {
        Some(c) => Err(ConfigurationError::Invalid {
            setting: "JOB_NAME",
            reason: format!("must be a single path segment, found {c:?}"),
        }),
        None if name == "." || name == ".." => Err(ConfigurationError::Invalid {
            setting: "JOB_NAME",
            reason: "must be a single path segment".into(),
        }),
        None => Ok(()),
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigurationError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigurationError::Missing {
            setting: "JENKINS_URL",
        });
    }

    let invalid = |reason: String| ConfigurationError::Invalid {
        setting: "JENKINS_URL",
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment".into()));
    }

    Ok(trimmed.to_string())
}
