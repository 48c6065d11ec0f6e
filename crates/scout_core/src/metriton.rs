//! HTTP delivery to a Metriton-style collector.
//!
//! Each report is one `POST` of
//! `{"application", "install_id", "version", "metadata"}` as JSON. The reply
//! body, if any, is decoded into [`ReportResponse`].

use crate::config::{ReporterConfig, DISABLE_ENV};
use crate::error::DeliveryError;
use crate::reporter::{ReportRequest, ReportResponse, Reporter};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

/// Reporter that posts reports to a remote collector.
pub struct MetritonReporter {
    client: reqwest::Client,
    endpoint: String,
    disabled: bool,
}

impl MetritonReporter {
    /// Build a reporter from configuration.
    ///
    /// Disabled state is fixed here: `config.disabled` or a non-empty
    /// `SCOUT_DISABLE` turns every later `report` into a no-op.
    pub fn new(config: &ReporterConfig) -> Result<Self, DeliveryError> {
        Self::build(config, is_disabled(config, std::env::var(DISABLE_ENV).ok()))
    }

    /// Build a reporter from `config` alone, without consulting the
    /// environment. Use after [`ReporterConfig::apply_env`] has already
    /// folded `SCOUT_DISABLE` into `config.disabled`.
    pub fn from_config(config: &ReporterConfig) -> Result<Self, DeliveryError> {
        Self::build(config, config.disabled)
    }

    fn build(config: &ReporterConfig, disabled: bool) -> Result<Self, DeliveryError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("{}/{}", config.application, config.version));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        if disabled {
            info!("Scout reporting disabled; reports will not be sent");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            disabled,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Reporting is off when the config says so or `env` (the value of
/// `SCOUT_DISABLE`) is set to anything non-empty.
fn is_disabled(config: &ReporterConfig, env: Option<String>) -> bool {
    config.disabled || env.is_some_and(|v| !v.is_empty())
}

#[async_trait]
impl Reporter for MetritonReporter {
    fn name(&self) -> &'static str {
        "metriton"
    }

    async fn report(&self, request: ReportRequest<'_>) -> Result<ReportResponse, DeliveryError> {
        if self.disabled {
            return Ok(ReportResponse::disabled());
        }

        let payload = serde_json::to_vec(&request.body()?)?;
        debug!(endpoint = %self.endpoint, bytes = payload.len(), "Posting report");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // A body that fails to arrive must not mask the rejection.
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(ReportResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| DeliveryError::Decode(e.to_string()))
    }
}
