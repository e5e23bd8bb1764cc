use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Individual '{0}' not found in record store")]
    UnknownIndividual(String),

    #[error("Family '{0}' not found in record store")]
    UnknownFamily(String),

    #[error("Duplicate record identifier: '{0}'")]
    DuplicateRecord(String),

    #[error("Record source error: {0}")]
    Source(String),

    #[error("GEDCOM error at line {line}: {message}")]
    Gedcom { line: usize, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LineageError>;
