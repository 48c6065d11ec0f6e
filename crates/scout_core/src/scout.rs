//! The per-run reporting session.

use crate::config::ReporterConfig;
use crate::error::ReportDeliveryError;
use crate::metadata::{compose, keys, MetaValue, Metadata, ScoutMeta};
use crate::reporter::{ReportRequest, Reporter};
use scout_ids::{InstallId, TraceId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reports the lifecycle of one installer run.
///
/// Every report carries the run's fixed metadata (`mode`, `trace_id`), the
/// action name and an `index` counting the `report` calls made so far, so a
/// collector can group and order the events of one installation attempt.
///
/// `report` takes `&mut self`: indices are assigned in call order and never
/// repeat. Share a Scout across tasks behind a mutex held for the whole
/// call.
pub struct Scout {
    index: u64,
    mode: String,
    trace_id: TraceId,
    install_id: InstallId,
    application: String,
    version: String,
    fixed: Metadata,
    reporter: Arc<dyn Reporter>,
}

impl Scout {
    /// Create a Scout for a run in `mode` (install, update, delete, ...).
    ///
    /// Application name and version come from [`ReporterConfig::default`].
    pub fn new(
        mode: impl Into<String>,
        install_id: impl Into<InstallId>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let defaults = ReporterConfig::default();
        Self::with_identity(mode, install_id, defaults.application, defaults.version, reporter)
    }

    pub fn with_identity(
        mode: impl Into<String>,
        install_id: impl Into<InstallId>,
        application: impl Into<String>,
        version: impl Into<String>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let mode = mode.into();
        let trace_id = TraceId::new();

        let mut fixed = Metadata::new();
        fixed.insert(keys::MODE.to_string(), MetaValue::from(mode.as_str()));
        fixed.insert(keys::TRACE_ID.to_string(), MetaValue::from(trace_id.as_str()));

        Self {
            index: 0,
            mode,
            trace_id,
            install_id: install_id.into(),
            application: application.into(),
            version: version.into(),
            fixed,
            reporter,
        }
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn install_id(&self) -> &InstallId {
        &self.install_id
    }

    /// Metadata attached to every report of this Scout.
    pub fn fixed_metadata(&self) -> &Metadata {
        &self.fixed
    }

    /// Send one report for `action`.
    ///
    /// The index is incremented before delivery and is not rolled back when
    /// delivery fails; the first report carries index 1. `entries` are
    /// merged last and silently replace `mode`, `trace_id`, `action` or
    /// `index` if they reuse those keys. Exactly one delivery attempt is
    /// made; the collector's reply is discarded.
    pub async fn report<I>(&mut self, action: &str, entries: I) -> Result<(), ReportDeliveryError>
    where
        I: IntoIterator<Item = ScoutMeta>,
    {
        self.index += 1;
        let index = self.index;
        let metadata = compose(&self.fixed, action, index, entries);

        debug!(
            action,
            index,
            trace_id = %self.trace_id,
            reporter = self.reporter.name(),
            "Sending scout report"
        );

        let request = ReportRequest {
            application: &self.application,
            version: &self.version,
            install_id: &self.install_id,
            metadata: &metadata,
        };

        match self.reporter.report(request).await {
            Ok(_response) => Ok(()),
            Err(err) => {
                warn!(action, index, trace_id = %self.trace_id, "Scout report failed: {}", err);
                Err(ReportDeliveryError::new(action, index, err))
            }
        }
    }
}

impl std::fmt::Debug for Scout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scout")
            .field("mode", &self.mode)
            .field("trace_id", &self.trace_id)
            .field("install_id", &self.install_id)
            .field("reporter", &self.reporter.name())
            .finish()
    }
}
