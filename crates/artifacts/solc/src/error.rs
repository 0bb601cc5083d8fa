use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// The `solc --standard-json` output error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    /// The error severity.
    pub severity: Severity,
    /// The formatted error message, including the source location.
    pub formatted_message: String,
    /// The non-formatted error message.
    #[serde(default)]
    pub message: String,
    /// The component type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// The error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// The error location data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
    /// The error type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_message)
    }
}

/// The `solc --standard-json` output error source location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// The source file path.
    pub file: String,
    /// The start location.
    pub start: i32,
    /// The end location.
    pub end: i32,
}

/// Severity of a diagnostic.
///
/// Only [`Severity::Warning`] lets a compilation succeed. Severities this crate does not know
/// about are kept as [`Severity::Other`] and treated like errors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Other(String),
}

impl Severity {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning)
    }

    /// Whether a diagnostic with this severity fails the compilation
    pub fn is_fatal(&self) -> bool {
        !self.is_warning()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Severities are matched exactly, `"Warning"` is not a warning.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "info" => Self::Info,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_severities() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("Warning".parse::<Severity>().unwrap(), Severity::Other("Warning".to_string()));
    }

    #[test]
    fn only_warnings_are_not_fatal() {
        assert!(!Severity::Warning.is_fatal());
        assert!(Severity::Error.is_fatal());
        assert!(Severity::Info.is_fatal());
        assert!(Severity::Other("notice".to_string()).is_fatal());
    }

    #[test]
    fn can_deserialize_error() {
        let raw = r#"{
            "component": "general",
            "errorCode": "2072",
            "formattedMessage": "Warning: Unused local variable.\n --> A.sol:4:9:\n",
            "message": "Unused local variable.",
            "severity": "warning",
            "sourceLocation": {"file": "A.sol", "start": 80, "end": 86},
            "type": "Warning"
        }"#;
        let err: Error = serde_json::from_str(raw).unwrap();
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.error_code.as_deref(), Some("2072"));
        assert_eq!(err.r#type.as_deref(), Some("Warning"));
        assert_eq!(err.source_location.as_ref().unwrap().file, "A.sol");
        assert_eq!(err.to_string(), "Warning: Unused local variable.\n --> A.sol:4:9:\n");
    }

    #[test]
    fn unknown_severity_round_trips() {
        let err: Error =
            serde_json::from_str(r#"{"severity": "notice", "formattedMessage": "hi"}"#).unwrap();
        assert_eq!(err.severity, Severity::Other("notice".to_string()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["severity"], "notice");
    }
}
