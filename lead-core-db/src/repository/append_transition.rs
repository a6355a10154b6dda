use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;
use uuid::Uuid;

use crate::models::lead::{LeadModel, StatusHistoryModel};

/// Returned (boxed) by [`AppendTransition`] when the stored lead no longer
/// has the version the transition was computed from.
///
/// Callers can recover it with `error.downcast_ref::<TransitionConflict>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Lead {lead_id} is no longer at version {expected_version}")]
pub struct TransitionConflict {
    pub lead_id: Uuid,
    pub expected_version: i64,
}

/// Commits one status transition: the updated lead row and its new history row.
///
/// The lead row is only updated when its stored `version` and `status` still
/// equal `expected_version` and `expected_status`; otherwise nothing is written
/// and a [`TransitionConflict`] is returned.
#[async_trait]
pub trait AppendTransition<DB: Database>: Send + Sync {
    async fn append_transition(
        &self,
        expected_version: i64,
        expected_status: &str,
        lead: &LeadModel,
        entry: &StatusHistoryModel,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
