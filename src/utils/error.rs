use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdmError {
    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Structural import failure: wrong header, wrong section boundary, wrong
    /// row shape. Aborts parsing immediately.
    #[error("Format error: expected {expected}, got {actual}")]
    Format { expected: String, actual: String },

    /// Semantic failure in a single row or value.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Collected reconciliation conflicts. The whole batch is aborted and
    /// nothing is written.
    #[error("reconciliation failed with {} conflict(s):\n{}", .conflicts.len(), .conflicts.join("\n"))]
    Reconciliation { conflicts: Vec<String> },
}

impl AdmError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdmError::Validation {
            message: message.into(),
        }
    }

    pub fn format(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        AdmError::Format {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_both_sides() {
        let err = AdmError::format("ID;Navn", "Navn;ID");
        assert_eq!(
            err.to_string(),
            "Format error: expected ID;Navn, got Navn;ID"
        );
    }

    #[test]
    fn test_reconciliation_error_lists_all_conflicts() {
        let err = AdmError::Reconciliation {
            conflicts: vec![
                "123: email changed".to_string(),
                "456: show changed".to_string(),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 conflict(s)"));
        assert!(text.contains("123: email changed"));
        assert!(text.contains("456: show changed"));
    }
}
