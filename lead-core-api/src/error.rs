use thiserror::Error;
use uuid::Uuid;

use crate::domain::status::Bucket;

/// Load-time failures of the status catalogue configuration.
///
/// Any of these is fatal: a process must not serve traffic with an
/// inconsistent catalogue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("Status catalogue is empty")]
    EmptyCatalogue,

    #[error("Status '{0}' is registered more than once")]
    DuplicateStatus(String),

    #[error("Bucket {bucket} references unregistered status '{status}'")]
    UnknownBucketMember { bucket: Bucket, status: String },

    #[error("Funnel stage '{stage}' references unregistered status '{status}'")]
    UnknownFunnelStatus { stage: String, status: String },

    #[error("Initial status '{0}' is not registered")]
    UnknownInitialStatus(String),

    #[error("Invalid catalogue configuration: {0}")]
    Parse(String),

    #[error("Unable to read catalogue configuration: {0}")]
    Io(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] CatalogueError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lead {lead_id} was modified concurrently (expected version {expected_version})")]
    ConcurrentModification { lead_id: Uuid, expected_version: i64 },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
