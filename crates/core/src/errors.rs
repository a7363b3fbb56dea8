use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored record could not be decoded into its domain shape.
    #[error("Data error: {0}")]
    Data(String),

    /// An inbound request was malformed or failed its authenticity check.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type HealthResult<T> = Result<T, HealthError>;
