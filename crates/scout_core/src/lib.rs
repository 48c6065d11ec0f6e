//! Scout - ordered lifecycle reports for installer runs
//!
//! A [`Scout`] is created once per installer/controller run. Every call to
//! [`Scout::report`] tags an event with the run's fixed metadata (`mode`,
//! `trace_id`), the action name and a per-run sequence `index`, then hands
//! the composed payload to a [`Reporter`] for delivery.
//!
//! ```text
//! ┌──────────────┐  report(action, meta)  ┌──────────┐  ReportRequest  ┌───────────────┐
//! │  installer   │───────────────────────▶│  Scout   │────────────────▶│   Reporter    │
//! │  controller  │◀───────────────────────│ index++  │◀────────────────│ (HTTP / noop) │
//! └──────────────┘   Ok | ReportDelivery  └──────────┘  ReportResponse └───────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Fixed metadata**: `mode` and `trace_id`, attached unmodified to every report
//! - **Index**: strictly increasing per Scout, consumed even when delivery fails
//! - **Reporter**: the delivery collaborator; [`MetritonReporter`] posts JSON over HTTP

pub mod config;
pub mod error;
pub mod metadata;
pub mod metriton;
pub mod reporter;
pub mod scout;

pub use config::ReporterConfig;
pub use error::{ConfigError, DeliveryError, MetaParseError, ReportDeliveryError};
pub use metadata::{compose, MetaValue, Metadata, ScoutMeta};
pub use metriton::MetritonReporter;
pub use reporter::{
    InstallIdResolver, LogReporter, NoopReporter, ReportRequest, ReportResponse, Reporter,
    ResolveWith,
};
pub use scout::Scout;
pub use scout_ids::{InstallId, TraceId};
