//! Identifier wrappers shared by Scout reports.
//!
//! - [`TraceId`] correlates every report emitted by one Scout session.
//! - [`InstallId`] names the installation being reported on. It is opaque
//!   and always supplied by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error returned when parsing a UUID-backed identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

/// Per-session correlation token (hyphenated UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a fresh, random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(value: &str) -> Result<Self, IdParseError> {
        let uuid = Uuid::parse_str(value)
            .map_err(|e| IdParseError::new(format!("Invalid trace ID: {}", e)))?;
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Opaque, stable identity of an installation (e.g. a cluster or resource UID).
///
/// No format is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallId(String);

impl InstallId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstallId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InstallId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for InstallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_are_unique() {
        let a = TraceId::new();
        let b = TraceId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_trace_id_parse_normalizes() {
        let parsed = TraceId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(parsed.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");

        let err = TraceId::parse("not-a-uuid").unwrap_err();
        assert!(err.to_string().starts_with("Invalid trace ID"));
    }

    #[test]
    fn test_trace_id_round_trips_through_display() {
        let id = TraceId::new();
        let again: TraceId = id.to_string().parse().unwrap();
        assert_eq!(id, again);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let install = InstallId::from("uid-123");
        assert_eq!(serde_json::to_string(&install).unwrap(), "\"uid-123\"");

        let trace = TraceId::new();
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json.as_str(), Some(trace.as_str()));
    }

    #[test]
    fn test_install_id_is_opaque() {
        let id = InstallId::new("");
        assert_eq!(id.as_str(), "");
        assert_eq!(InstallId::from(String::from("a b/c")).to_string(), "a b/c");
    }
}
