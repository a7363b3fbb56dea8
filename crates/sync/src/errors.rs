use thiserror::Error;

/// Failures reported by a record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The query needs an index the store is still building.
    #[error("index not ready: {0}")]
    IndexNotReady(String),

    #[error("subscription closed")]
    Closed,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Whether retrying the same call later can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::IndexNotReady(_) | StoreError::Closed
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("you appear to be offline")]
    Offline,

    #[error("temporary store failure: {0}")]
    Transient(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("rejected by store: {0}")]
    Rejected(String),

    #[error("sync session is not initialized")]
    NotInitialized,
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(message) => SyncError::Data(message),
            StoreError::PermissionDenied(message) => SyncError::Rejected(message),
            transient => SyncError::Transient(transient.to_string()),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
