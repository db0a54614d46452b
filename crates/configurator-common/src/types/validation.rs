//! Rule validation types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Violation severity; only errors block a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("error") {
            Ok(Severity::Error)
        } else if s.eq_ignore_ascii_case("warning") {
            Ok(Severity::Warning)
        } else {
            Err(format!("unknown severity: {s}"))
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<Severity> for &'static str {
    fn from(severity: Severity) -> Self {
        severity.as_str()
    }
}

/// A single rule failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Stable machine-readable code, e.g. "layout.blocked"
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Rule-compliance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub configuration_id: String,

    /// Violations in constraint evaluation order
    pub violations: Vec<Violation>,

    /// At least one error-severity violation
    pub blocking: bool,

    pub latency_micros: u64,

    pub cached: bool,
}

impl ValidationResult {
    /// Build a fresh result, deriving `blocking` from the violations
    pub fn new(configuration_id: impl Into<String>, violations: Vec<Violation>) -> Self {
        let blocking = violations.iter().any(|v| v.severity.is_blocking());
        Self {
            configuration_id: configuration_id.into(),
            violations,
            blocking,
            latency_micros: 0,
            cached: false,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());

        let violation: Violation =
            serde_json::from_str(r#"{"code":"x","severity":"Error","message":"m"}"#).unwrap();
        assert_eq!(violation.severity, Severity::Error);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Violation::warning("appliance.limit", "too many")).unwrap();
        assert!(json.contains(r#""severity":"warning""#));
    }

    #[test]
    fn test_warnings_never_block() {
        let result = ValidationResult::new(
            "cfg",
            vec![
                Violation::warning("appliance.limit", "a"),
                Violation::warning("appliance.limit", "b"),
            ],
        );
        assert!(!result.blocking);
        assert!(!result.is_clean());
    }

    #[test]
    fn test_any_error_blocks() {
        let result = ValidationResult::new(
            "cfg",
            vec![
                Violation::warning("appliance.limit", "a"),
                Violation::error("layout.blocked", "b"),
            ],
        );
        assert!(result.blocking);
        assert_eq!(result.codes(), vec!["appliance.limit", "layout.blocked"]);
    }

    #[test]
    fn test_response_json_shape() {
        let result = ValidationResult::new("cfg", vec![Violation::error("layout.blocked", "m")]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["configurationId"], "cfg");
        assert_eq!(value["violations"][0]["severity"], "error");
        assert_eq!(value["blocking"], true);
        assert_eq!(value["latencyMicros"], 0);
    }
}
