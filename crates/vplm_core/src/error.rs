use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyName,
    DuplicateParameter(String),
    InvalidUpperBound { name: String, value: f64 },
    InvalidBounds { name: String, count: usize },
    InvalidThreshold(f64),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::EmptyName => write!(f, "Parameter name cannot be empty"),
            ModelError::DuplicateParameter(name) => {
                write!(f, "Duplicate parameter: {}", name)
            }
            ModelError::InvalidUpperBound { name, value } => {
                write!(f, "Invalid upper bound for {}: {} (must be finite and positive)", name, value)
            }
            ModelError::InvalidBounds { name, count } => {
                write!(f, "Invalid bounds for {}: expected 1 or 2 values, found {}", name, count)
            }
            ModelError::InvalidThreshold(value) => {
                write!(f, "Invalid dependency threshold: {} (must be within [0, 1])", value)
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
