use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid feature dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Schema mismatch at column {index}: model expects '{expected}', schema has '{actual}'")]
    SchemaMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Unsupported label: {0}")]
    UnsupportedLabel(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Short, stable name of the error kind, safe to show to end users
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidDimension { .. } => "InvalidDimension",
            Error::ModelNotFound(_) => "ModelNotFound",
            Error::InvalidModel(_) => "InvalidModel",
            Error::SchemaMismatch { .. } => "SchemaMismatch",
            Error::UnsupportedLabel(_) => "UnsupportedLabel",
            Error::Io(_) => "Io",
            Error::Serialization(_) => "Serialization",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
