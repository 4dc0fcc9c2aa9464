//! Error types for mogrification

use thiserror::Error;

/// Errors that can occur while loading inputs or evaluating annotations
#[derive(Debug, Error)]
pub enum MogrifyError {
    /// IO error reading input files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing the name map CSV
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    /// Error parsing JSON input
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Error reported by the document tree
    #[error("Document error: {0}")]
    Document(#[from] doc_model::DocModelError),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Required column missing from the name map
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Selections input has the wrong shape
    #[error("Invalid selections: {0}")]
    InvalidSelections(String),

    /// Malformed annotation body
    #[error("Syntax error in annotation {text:?}: {message}")]
    Syntax { text: String, message: String },

    /// Operator outside the recognized set
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// Short identifier absent from the name map
    #[error("Short name not found in name map: {0}")]
    UnknownShortName(String),

    /// Unit selection matches neither sentinel
    #[error("{0:?} is not a valid unit system")]
    InvalidUnitSystem(String),
}

impl MogrifyError {
    pub(crate) fn syntax(text: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            text: text.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for mogrification operations
pub type Result<T> = std::result::Result<T, MogrifyError>;
