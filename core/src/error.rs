use thiserror::Error;

#[derive(Error, Debug)]
pub enum CohortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Schema violation at row {row}: {message}")]
    Schema { row: u64, message: String },

    #[error("Schema header mismatch: expected [{expected}], got [{actual}]")]
    SchemaHeader { expected: String, actual: String },

    #[error("Invalid config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CohortResult<T> = Result<T, CohortError>;
