use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Record '{code}' has no numeric value in column '{column}'")]
    InvalidValue { code: String, column: String },

    #[error("Not enough distinct feature vectors: need {required}, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("Cluster {cluster} has {size} member(s); silhouette needs at least 2")]
    UndersizedCluster { cluster: usize, size: usize },

    #[error("Silhouette needs at least 2 non-empty clusters, found {found}")]
    TooFewClusters { found: usize },

    #[error("Length mismatch: {vectors} vectors, {assignments} assignments")]
    LengthMismatch { vectors: usize, assignments: usize },

    #[error("Cluster label {label} out of range for {points} points")]
    LabelOutOfRange { label: usize, points: usize },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse error classes reported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Schema,
    DataInsufficiency,
    Persistence,
    Source,
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig(_) => ErrorCategory::Configuration,
            Error::MissingColumn { .. } | Error::InvalidValue { .. } => ErrorCategory::Schema,
            Error::InsufficientData { .. }
            | Error::UndersizedCluster { .. }
            | Error::TooFewClusters { .. } => ErrorCategory::DataInsufficiency,
            Error::Persistence(_) => ErrorCategory::Persistence,
            Error::TableNotFound(_) => ErrorCategory::Source,
            Error::LengthMismatch { .. }
            | Error::LabelOutOfRange { .. }
            | Error::Io(_)
            | Error::Serialization(_) => ErrorCategory::Internal,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
