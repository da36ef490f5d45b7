//! Configuration module
//!
//! Environment-driven configuration for the report service. The backend
//! mode is decided here, once per process: a populated
//! `FIELDPOST_REPORT_FOLDER` activates local mode (remote credentials are
//! not even looked at); an empty value or the literal `EMAIL` activates
//! remote mode, where missing bucket/credential/email settings are a hard
//! startup failure rather than a per-request one.

use std::env;
use std::path::PathBuf;

use crate::models::ReportMode;

const DEFAULT_BUCKET: &str = "usability-reports";
const DEFAULT_AWS_REGION: &str = "us-east-1";
/// 7 days, matching the default lifetime of presigned report URLs.
const DEFAULT_URL_EXPIRATION_SECS: u64 = 604_800;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_MAX_EMBED_COUNT: usize = 5;
/// 8 MiB, below the ~10 MiB hard ceiling of common email transports once
/// base64 expansion (~33%) is accounted for.
const DEFAULT_MAX_EMBED_BYTES: u64 = 8 * 1024 * 1024;
/// ~200 reports at 3 objects per report.
const DEFAULT_FETCH_CEILING: usize = 600;
const DEFAULT_MAX_RESULTS: usize = 20;
const DEFAULT_MATH_RENDER_ENDPOINT: &str = "https://latex.codecogs.com/png.image";
const DEFAULT_MATH_RENDER_TIMEOUT_SECS: u64 = 10;

/// Application configuration, constructed once at process start and passed
/// by reference into the report service. No ambient globals.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: ReportMode,
    /// Root directory for local mode. Always `Some` in local mode.
    pub report_folder: Option<PathBuf>,
    // Remote storage configuration
    pub bucket: String,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub url_expiration_secs: u64,
    // Email configuration (remote mode only)
    pub email_from: Option<String>,
    pub email_to: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    // Attachment budgeting
    pub max_embed_count: usize,
    pub max_embed_bytes: u64,
    // Search behavior
    pub fetch_ceiling: usize,
    pub max_results: usize,
    // Math rendering for notifications
    pub math_render_endpoint: String,
    pub math_render_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let folder_setting = env::var("FIELDPOST_REPORT_FOLDER").unwrap_or_default();
        let folder_setting = folder_setting.trim();
        let (mode, report_folder) = if folder_setting.is_empty() || folder_setting == "EMAIL" {
            (ReportMode::Remote, None)
        } else {
            (ReportMode::Local, Some(PathBuf::from(folder_setting)))
        };

        let config = Config {
            mode,
            report_folder,
            bucket: env::var("REPORT_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            aws_region: env::var("AWS_REGION")
                .unwrap_or_else(|_| DEFAULT_AWS_REGION.to_string()),
            aws_access_key_id: env::var("REPORT_AWS_ACCESS_KEY_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            aws_secret_access_key: env::var("REPORT_AWS_SECRET_ACCESS_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            url_expiration_secs: env::var("REPORT_URL_EXPIRATION")
                .unwrap_or_else(|_| DEFAULT_URL_EXPIRATION_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_URL_EXPIRATION_SECS),
            email_from: env::var("REPORT_EMAIL_FROM").ok().filter(|s| !s.is_empty()),
            email_to: env::var("REPORT_EMAIL_TO").ok().filter(|s| !s.is_empty()),
            smtp_host: env::var("REPORT_SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("REPORT_SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: env::var("REPORT_SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("REPORT_SMTP_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty()),
            smtp_tls: env::var("REPORT_SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            max_embed_count: env::var("REPORT_MAX_EMBED_COUNT")
                .unwrap_or_else(|_| DEFAULT_MAX_EMBED_COUNT.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_EMBED_COUNT),
            max_embed_bytes: env::var("REPORT_MAX_EMBED_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_EMBED_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_EMBED_BYTES),
            fetch_ceiling: env::var("REPORT_FETCH_CEILING")
                .unwrap_or_else(|_| DEFAULT_FETCH_CEILING.to_string())
                .parse()
                .unwrap_or(DEFAULT_FETCH_CEILING),
            max_results: env::var("REPORT_MAX_RESULTS")
                .unwrap_or_else(|_| DEFAULT_MAX_RESULTS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_RESULTS),
            math_render_endpoint: env::var("MATH_RENDER_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_MATH_RENDER_ENDPOINT.to_string()),
            math_render_timeout_secs: env::var("MATH_RENDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_MATH_RENDER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MATH_RENDER_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Mode-scoped validation; fatal at startup, never per-request.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.mode {
            ReportMode::Local => {
                // Local mode only needs the folder; remote credentials are
                // intentionally not validated here.
                if self.report_folder.is_none() {
                    return Err(anyhow::anyhow!(
                        "FIELDPOST_REPORT_FOLDER must be set for local mode"
                    ));
                }
            }
            ReportMode::Remote => {
                if self.bucket.is_empty() {
                    return Err(anyhow::anyhow!(
                        "REPORT_BUCKET must be set when using the remote backend"
                    ));
                }
                if self.aws_access_key_id.is_none() || self.aws_secret_access_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "REPORT_AWS_ACCESS_KEY_ID and REPORT_AWS_SECRET_ACCESS_KEY \
                         must be set when using the remote backend"
                    ));
                }
                if self.smtp_host.is_none() {
                    return Err(anyhow::anyhow!(
                        "REPORT_SMTP_HOST must be set when using the remote backend"
                    ));
                }
                if self.email_from.is_none() || self.email_to.is_none() {
                    return Err(anyhow::anyhow!(
                        "REPORT_EMAIL_FROM and REPORT_EMAIL_TO must be set when using \
                         the remote backend"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Construct a local-mode config rooted at the given folder, with
    /// defaults everywhere else. Used by tests and embedded callers.
    pub fn for_local_folder(folder: impl Into<PathBuf>) -> Self {
        Config {
            mode: ReportMode::Local,
            report_folder: Some(folder.into()),
            bucket: DEFAULT_BUCKET.to_string(),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            url_expiration_secs: DEFAULT_URL_EXPIRATION_SECS,
            email_from: None,
            email_to: None,
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            smtp_tls: true,
            max_embed_count: DEFAULT_MAX_EMBED_COUNT,
            max_embed_bytes: DEFAULT_MAX_EMBED_BYTES,
            fetch_ceiling: DEFAULT_FETCH_CEILING,
            max_results: DEFAULT_MAX_RESULTS,
            math_render_endpoint: DEFAULT_MATH_RENDER_ENDPOINT.to_string(),
            math_render_timeout_secs: DEFAULT_MATH_RENDER_TIMEOUT_SECS,
        }
    }
}
