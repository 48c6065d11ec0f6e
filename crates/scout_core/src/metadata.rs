//! Report metadata model and the merge that builds each report payload.

use crate::error::MetaParseError;
use serde::Serialize;
use tracing::debug;

/// JSON-shaped metadata value.
pub type MetaValue = serde_json::Value;

/// Key/value bag sent with a report.
pub type Metadata = serde_json::Map<String, MetaValue>;

/// Reserved metadata keys.
pub mod keys {
    /// Operation class of the run (install, update, delete, ...).
    pub const MODE: &str = "mode";
    /// Correlation token shared by every report of one Scout.
    pub const TRACE_ID: &str = "trace_id";
    /// Name of the reported event.
    pub const ACTION: &str = "action";
    /// Per-run sequence number of the report.
    pub const INDEX: &str = "index";

    pub const RESERVED: [&str; 4] = [MODE, TRACE_ID, ACTION, INDEX];
}

/// A single caller-supplied metadata entry attached to one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutMeta {
    pub key: String,
    pub value: MetaValue,
}

impl ScoutMeta {
    pub fn new(key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an entry from any serializable value.
    pub fn json<T: Serialize + ?Sized>(
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_value(value)?,
        })
    }

    /// Parse a `key=value` pair.
    ///
    /// The value is decoded as JSON when it is valid JSON (`count=3`,
    /// `ok=true`, `tags=["a"]`) and kept as a plain string otherwise.
    pub fn parse_pair(pair: &str) -> Result<Self, MetaParseError> {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| MetaParseError::MissingEquals(pair.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(MetaParseError::EmptyKey(pair.to_string()));
        }
        let value = serde_json::from_str::<MetaValue>(raw)
            .unwrap_or_else(|_| MetaValue::String(raw.to_string()));
        Ok(Self::new(key, value))
    }
}

/// Compose the payload of one report.
///
/// Layers are applied in order: `fixed`, then `action` and `index`, then
/// `entries` in call order. Entries are not validated and overwrite any
/// earlier value with the same key, reserved keys included.
pub fn compose<I>(fixed: &Metadata, action: &str, index: u64, entries: I) -> Metadata
where
    I: IntoIterator<Item = ScoutMeta>,
{
    let mut metadata = fixed.clone();
    metadata.insert(keys::ACTION.to_string(), MetaValue::from(action));
    metadata.insert(keys::INDEX.to_string(), MetaValue::from(index));
    for entry in entries {
        if keys::RESERVED.contains(&entry.key.as_str()) {
            debug!(key = %entry.key, action, index, "metadata entry overrides reserved key");
        }
        metadata.insert(entry.key, entry.value);
    }
    metadata
}
