use thiserror::Error;

#[derive(Debug, Error)]
pub enum IguaneError {
    #[error("Failed to read GPU data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unknown GPU: {0}")]
    UnknownGpu(String),

    #[error("Unknown figure of merit: {0}")]
    UnknownFormula(String),

    #[error("Unknown UGR version: {0}")]
    UnknownWeightVersion(String),

    #[error("Missing required field: {gpu}.{field}")]
    MissingField { gpu: String, field: String },

    #[error("Division by zero: reference {reference}.{field} is 0")]
    DivisionByZero { reference: String, field: String },

    #[error("Ratio overflow: {gpu}.{field} / {reference}.{field} is not finite")]
    RatioOverflow {
        gpu: String,
        reference: String,
        field: String,
    },
}

impl IguaneError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// A problem found in a loaded GPU table by `validate_table`.
///
/// `rule` is a stable `DATA-NNN` identifier. `location` names the GPU,
/// or the `gpu.field` pair, the finding is about.
#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

/// How a finding affects scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Some formula cannot be evaluated for any GPU.
    Error,
    /// Some GPUs will fail to score under some formula.
    Warning,
    /// Data is incomplete but every formula that needs it reports a clean error.
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
            Self::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.rule)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_error() {
        let v = Violation {
            severity: Severity::Error,
            rule: "DATA-001".to_string(),
            message: "reference missing".to_string(),
            location: Some("A100-SXM4-40GB".to_string()),
        };
        let s = v.to_string();
        assert!(s.contains("[ERROR]"));
        assert!(s.contains("DATA-001"));
        assert!(s.contains("reference missing"));
    }

    #[test]
    fn violation_display_warning() {
        let v = Violation {
            severity: Severity::Warning,
            rule: "DATA-003".to_string(),
            message: "no fp32".to_string(),
            location: None,
        };
        assert!(v.to_string().contains("[WARN]"));
    }

    #[test]
    fn violation_display_info() {
        let v = Violation {
            severity: Severity::Info,
            rule: "DATA-005".to_string(),
            message: "no fp64".to_string(),
            location: None,
        };
        assert!(v.to_string().contains("[INFO]"));
    }

    #[test]
    fn error_io() {
        let err = IguaneError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn error_parse_names_line() {
        let err = IguaneError::parse(12, "unterminated string");
        let s = err.to_string();
        assert!(s.contains("line 12"));
        assert!(s.contains("unterminated string"));
    }

    #[test]
    fn error_lookups_name_their_key() {
        assert!(IguaneError::UnknownGpu("B200".into()).to_string().contains("B200"));
        assert!(
            IguaneError::UnknownFormula("fp8".into())
                .to_string()
                .contains("figure of merit: fp8")
        );
        assert!(
            IguaneError::UnknownWeightVersion("2.0".into())
                .to_string()
                .contains("2.0")
        );
    }

    #[test]
    fn error_missing_field() {
        let err = IguaneError::MissingField {
            gpu: "K80".to_string(),
            field: "fp64".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required field: K80.fp64");
    }

    #[test]
    fn error_division_by_zero() {
        let err = IguaneError::DivisionByZero {
            reference: "A100-SXM4-80GB".to_string(),
            field: "membw".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("A100-SXM4-80GB"));
        assert!(s.contains("membw"));
    }

    #[test]
    fn error_ratio_overflow() {
        let err = IguaneError::RatioOverflow {
            gpu: "T4".to_string(),
            reference: "A100-SXM4-40GB".to_string(),
            field: "memgb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ratio overflow: T4.memgb / A100-SXM4-40GB.memgb is not finite"
        );
    }

    #[test]
    fn violation_display_names_location() {
        let v = Violation {
            severity: Severity::Error,
            rule: "DATA-002".to_string(),
            message: "reference value is 0".to_string(),
            location: Some("A100-SXM4-80GB.membw".to_string()),
        };
        assert_eq!(
            v.to_string(),
            "[ERROR] DATA-002 (A100-SXM4-80GB.membw): reference value is 0"
        );
    }
}
