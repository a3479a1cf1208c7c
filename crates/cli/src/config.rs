//! Command-line and environment configuration.
//!
//! Every setting can be given as a flag or through the environment variable
//! named next to it; the serverless deployment uses the environment only.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jenkins::{JenkinsConfig, JenkinsSettings, Secret};
use listener::KeyEncoding;
use pipeline::ConfigurationError;

#[derive(Parser)]
#[command(
    name = "buildhook",
    version,
    about = "Starts CI builds for client output files landing in object storage"
)]
pub struct Cli {
    #[command(flatten)]
    pub jenkins: JenkinsArgs,

    /// URL-decode object keys taken from notifications before matching them.
    #[arg(long, env = "DECODE_OBJECT_KEYS")]
    pub decode_keys: bool,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn key_encoding(&self) -> KeyEncoding {
        if self.decode_keys {
            KeyEncoding::UrlEncoded
        } else {
            KeyEncoding::Raw
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run under the serverless runtime, one batch per invocation (default).
    Serve,
    /// Process one notification read from a file (or `-` for stdin) and print
    /// the per-record report.
    Invoke {
        #[arg(long, default_value = "-")]
        event: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// CI connection settings. Optional at the parser level so that every missing
/// value is reported as a [`ConfigurationError`].
#[derive(Args)]
pub struct JenkinsArgs {
    /// Base URL of the Jenkins server.
    #[arg(long, env = "JENKINS_URL")]
    pub jenkins_url: Option<String>,

    /// Trigger token passed as the `token` query parameter.
    #[arg(long, env = "JENKINS_TOKEN", hide_env_values = true)]
    pub jenkins_token: Option<String>,

    /// HTTP Basic username.
    #[arg(long, env = "JENKINS_USER")]
    pub jenkins_user: Option<String>,

    /// HTTP Basic API token.
    #[arg(long, env = "JENKINS_API_TOKEN", hide_env_values = true)]
    pub jenkins_api_token: Option<String>,

    /// Job to trigger [default: terraform-deploy].
    #[arg(long, env = "JOB_NAME")]
    pub job_name: Option<String>,

    /// Per-call timeout in seconds.
    #[arg(long, env = "JENKINS_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl JenkinsArgs {
    /// Validates the arguments into a [`JenkinsConfig`].
    pub fn into_config(self) -> Result<JenkinsConfig, ConfigurationError> {
        let settings = JenkinsSettings {
            base_url: required(self.jenkins_url, "JENKINS_URL")?,
            trigger_token: Secret::new(required(self.jenkins_token, "JENKINS_TOKEN")?),
            username: required(self.jenkins_user, "JENKINS_USER")?,
            api_token: Secret::new(required(self.jenkins_api_token, "JENKINS_API_TOKEN")?),
            job_name: self.job_name,
            timeout: Some(Duration::from_secs(self.timeout_secs)),
        };
        JenkinsConfig::from_settings(settings)
    }
}

fn required(value: Option<String>, setting: &'static str) -> Result<String, ConfigurationError> {
    value.ok_or(ConfigurationError::Missing { setting })
}
