//! Error types for Scout reporting

use std::io;
use thiserror::Error;

/// Lower-level cause of a failed delivery attempt.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("install id unavailable: {0}")]
    Identity(String),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector rejected report with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed collector response: {0}")]
    Decode(String),

    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

/// A single `Scout::report` call failed to deliver its report.
///
/// Display is the bare `scout report` marker; the cause is reached through
/// `source()`, so `{:#}` on an `anyhow` chain prints it once. The index
/// consumed by the failed call is not reused.
#[derive(Error, Debug)]
#[error("scout report")]
pub struct ReportDeliveryError {
    action: String,
    index: u64,
    #[source]
    source: DeliveryError,
}

impl ReportDeliveryError {
    pub(crate) fn new(action: impl Into<String>, index: u64, source: DeliveryError) -> Self {
        Self {
            action: action.into(),
            index,
            source,
        }
    }

    /// Action name of the failed report.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Sequence index the failed report carried.
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn cause(&self) -> &DeliveryError {
        &self.source
    }
}

/// Invalid `key=value` metadata pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaParseError {
    #[error("expected key=value, got '{0}'")]
    MissingEquals(String),

    #[error("empty metadata key in '{0}'")]
    EmptyKey(String),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_report_delivery_error_display() {
        let err = ReportDeliveryError::new(
            "install_started",
            3,
            DeliveryError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            },
        );
        assert_eq!(err.to_string(), "scout report");
        assert_eq!(err.action(), "install_started");
        assert_eq!(err.index(), 3);
    }

    #[test]
    fn test_report_delivery_error_exposes_source() {
        let err = ReportDeliveryError::new("a", 1, DeliveryError::Identity("gone".to_string()));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "install id unavailable: gone");
        assert!(matches!(err.cause(), DeliveryError::Identity(_)));
    }

    #[test]
    fn test_error_chain_names_cause_once() {
        let err = ReportDeliveryError::new(
            "install_started",
            1,
            DeliveryError::Rejected {
                status: 503,
                body: "down".to_string(),
            },
        );

        let mut chain = vec![err.to_string()];
        let mut current = err.source();
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        let rendered = chain.join(": ");

        assert_eq!(
            rendered,
            "scout report: collector rejected report with status 503: down"
        );
        assert_eq!(rendered.matches("status 503").count(), 1);
    }

    #[test]
    fn test_stdout_failure_is_output_error() {
        let err: DeliveryError = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, DeliveryError::Output(_)));
        assert_eq!(err.to_string(), "output error: closed");
    }

    #[test]
    fn test_meta_parse_error_display() {
        assert_eq!(
            MetaParseError::MissingEquals("novalue".to_string()).to_string(),
            "expected key=value, got 'novalue'"
        );
        assert_eq!(
            MetaParseError::EmptyKey("=x".to_string()).to_string(),
            "empty metadata key in '=x'"
        );
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeliveryError>();
        assert_send_sync::<ReportDeliveryError>();
    }
}
