//! Delivery collaborator seam.
//!
//! A [`Reporter`] transmits one composed report to a collector. Scout makes
//! exactly one `report` call per `Scout::report` and never retries.

use crate::error::DeliveryError;
use crate::metadata::{MetaValue, Metadata};
use async_trait::async_trait;
use scout_ids::InstallId;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Yields the install identity at send time.
pub trait InstallIdResolver: Send + Sync {
    fn resolve(&self) -> Result<String, DeliveryError>;
}

impl InstallIdResolver for InstallId {
    fn resolve(&self) -> Result<String, DeliveryError> {
        Ok(self.as_str().to_string())
    }
}

/// Adapts a closure into an [`InstallIdResolver`].
pub struct ResolveWith<F>(pub F);

impl<F> InstallIdResolver for ResolveWith<F>
where
    F: Fn() -> Result<String, DeliveryError> + Send + Sync,
{
    fn resolve(&self) -> Result<String, DeliveryError> {
        (self.0)()
    }
}

/// Everything a reporter needs to deliver one report.
pub struct ReportRequest<'a> {
    pub application: &'a str,
    pub version: &'a str,
    pub install_id: &'a dyn InstallIdResolver,
    pub metadata: &'a Metadata,
}

/// Wire body of a report.
#[derive(Debug, Serialize)]
pub(crate) struct ReportBody<'a> {
    pub application: &'a str,
    pub install_id: String,
    pub version: &'a str,
    pub metadata: &'a Metadata,
}

impl<'a> ReportRequest<'a> {
    pub(crate) fn body(&self) -> Result<ReportBody<'a>, DeliveryError> {
        Ok(ReportBody {
            application: self.application,
            install_id: self.install_id.resolve()?,
            version: self.version,
            metadata: self.metadata,
        })
    }
}

/// Collector reply. Every field is optional; unknown fields land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<MetaValue>,
    /// Set when no request was made because reporting is turned off.
    #[serde(skip)]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl ReportResponse {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }
}

/// Delivers composed reports to a collector.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Make one delivery attempt.
    async fn report(&self, request: ReportRequest<'_>) -> Result<ReportResponse, DeliveryError>;
}

/// Accepts every report without sending anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

#[async_trait]
impl Reporter for NoopReporter {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn report(&self, _request: ReportRequest<'_>) -> Result<ReportResponse, DeliveryError> {
        Ok(ReportResponse::disabled())
    }
}

/// Prints each report as one JSON line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[async_trait]
impl Reporter for LogReporter {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn report(&self, request: ReportRequest<'_>) -> Result<ReportResponse, DeliveryError> {
        let line = serde_json::to_string(&request.body()?)?;
        writeln!(std::io::stdout(), "{}", line)?;
        Ok(ReportResponse::default())
    }
}
