//! Runtime configuration and logging setup.

use std::path::PathBuf;
use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing_subscriber::EnvFilter;
use vitals_core::{SubjectId, Time};

/// Resolved CLI configuration.
pub struct Config {
    pub data_dir: PathBuf,
    pub subject: SubjectId,
    pub log_level: String,
}

impl Config {
    pub fn from_args(data_dir: PathBuf, subject: String, log_level: String) -> Self {
        Self {
            data_dir,
            subject: SubjectId::new(subject),
            log_level,
        }
    }

    /// Log to stderr so command output stays clean. `RUST_LOG` wins over
    /// `--log-level`.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_time(s: &str) -> Result<Time> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t.and_utc());
        }
    }
    bail!("invalid time '{}': expected RFC 3339 or YYYY-MM-DD", s)
}
