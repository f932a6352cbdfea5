use thiserror::Error;

use crate::error::ModelError;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file: expected {expected} sections, found {found}")]
    InvalidFile { expected: usize, found: usize },

    #[error("Invalid value in section {section}: {source}")]
    InvalidField {
        section: usize,
        #[source]
        source: FieldError,
    },

    #[error("Reserved delimiter {delimiter:?} in {field}")]
    ReservedDelimiter { field: String, delimiter: &'static str },

    #[error("Invalid save name: {0:?}")]
    InvalidName(String),

    #[error("Invalid configuration {path}: {reason}")]
    InvalidConfig { path: String, reason: String },

    #[error("Model export failed: {0}")]
    Export(String),
}

impl SaveError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::FileNotFound { .. } => true,
            SaveError::InvalidName(_) => true,
            SaveError::ReservedDelimiter { .. } => true, // User can edit the offending text
            SaveError::InvalidFile { .. } => false,
            SaveError::InvalidField { .. } => false,
            _ => false,
        }
    }

    /// Short message for the status log of the UI
    pub fn user_message(&self) -> String {
        match self {
            SaveError::FileNotFound { .. } => "Failed to load, file does not exist".to_string(),
            SaveError::InvalidFile { .. } | SaveError::InvalidField { .. } => {
                "Failed to load, invalid file".to_string()
            }
            SaveError::ReservedDelimiter { field, delimiter } => {
                format!("Failed to save, {} contains reserved text {:?}", field, delimiter)
            }
            SaveError::InvalidName(_) => "Please specify a file name".to_string(),
            SaveError::Io(e) => format!("File error: {}", e),
            other => other.to_string(),
        }
    }
}

/// Field-level failure, attached to its section by `InSection`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("invalid number {0:?}")]
    Number(String),

    #[error("invalid integer {0:?}")]
    Integer(String),

    #[error("invalid boolean {0:?}")]
    Bool(String),

    #[error("No defined_bounds or value: {0:?}")]
    MissingBoundsAndValue(String),

    #[error("expected {expected} fields, found {found} in {text:?}")]
    FieldCount { expected: usize, found: usize, text: String },

    #[error("{0}")]
    Malformed(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub trait InSection<T> {
    fn in_section(self, section: usize) -> Result<T, SaveError>;
}

impl<T> InSection<T> for Result<T, FieldError> {
    fn in_section(self, section: usize) -> Result<T, SaveError> {
        self.map_err(|source| SaveError::InvalidField { section, source })
    }
}
