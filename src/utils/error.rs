use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrubError {
    #[error("input error: {message}")]
    Input { message: String },

    #[error("column '{column}' not found in the upload header")]
    ColumnNotFound { column: String },

    #[error("reference dataset unavailable: {message}")]
    ReferenceUnavailable { message: String },

    #[error("insufficient credit: run requires {required}, balance is {available}")]
    InsufficientCredit { required: u64, available: u64 },

    #[error("output write failed: {message}")]
    OutputWrite { message: String },

    #[error("audit persist failed: {message}")]
    AuditPersist { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ScrubError {
    /// Stable machine-readable kind, reported to callers alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrubError::Input { .. } | ScrubError::Csv(_) => "InputError",
            ScrubError::ColumnNotFound { .. } => "ColumnNotFound",
            ScrubError::ReferenceUnavailable { .. } => "ReferenceUnavailable",
            ScrubError::InsufficientCredit { .. } => "InsufficientCredit",
            ScrubError::OutputWrite { .. } => "OutputWriteError",
            ScrubError::AuditPersist { .. } => "AuditPersistError",
            ScrubError::Config { .. } => "ConfigError",
            ScrubError::Io(_) | ScrubError::Serialization(_) | ScrubError::Internal { .. } => {
                "Internal"
            }
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        ScrubError::Input {
            message: message.into(),
        }
    }

    pub fn reference_unavailable(message: impl Into<String>) -> Self {
        ScrubError::ReferenceUnavailable {
            message: message.into(),
        }
    }

    pub fn output_write(message: impl Into<String>) -> Self {
        ScrubError::OutputWrite {
            message: message.into(),
        }
    }

    pub fn audit_persist(message: impl Into<String>) -> Self {
        ScrubError::AuditPersist {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrubError>;
