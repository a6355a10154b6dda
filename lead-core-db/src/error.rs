use lead_core_api::ApiError;
use thiserror::Error;
use uuid::Uuid;

/// Failures converting between domain values and persistence models.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Value for field '{field}' is too long (max {max} chars)")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Failed to encode field '{field}': {message}")]
    Encoding { field: &'static str, message: String },

    #[error("{0}")]
    Hash(String),

    #[error("Status history of lead {lead_id} is broken at sequence {sequence}: {reason}")]
    BrokenHistoryChain {
        lead_id: Uuid,
        sequence: i32,
        reason: &'static str,
    },

    #[error("Lead {lead_id} is at version {version} but {entries} history entries were loaded")]
    HistoryOutOfSync {
        lead_id: Uuid,
        version: i64,
        entries: usize,
    },
}

impl From<ModelError> for ApiError {
    fn from(error: ModelError) -> Self {
        match &error {
            ModelError::FieldTooLong { .. } => ApiError::ValidationError(error.to_string()),
            _ => ApiError::InternalError(error.to_string()),
        }
    }
}
