use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::catalogue::StatusCatalogue;
use crate::domain::lead::{Lead, LeadProfile, StatusHistoryEntry, StatusSnapshot};
use crate::error::{ApiError, ApiResult};
use crate::service::aggregation::{aggregate, AggregateResult};

/// Applies status transitions and aggregates populations against one catalogue.
///
/// The engine holds no state besides the shared catalogue: every operation is
/// a pure function of its inputs, and the caller supplies the clock.
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    catalogue: Arc<StatusCatalogue>,
}

impl LifecycleEngine {
    pub fn new(catalogue: Arc<StatusCatalogue>) -> Self {
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &StatusCatalogue {
        &self.catalogue
    }

    /// Intake: a lead in the catalogue's initial status, with the creation
    /// entry (`from_status: None`) already in its history.
    pub fn create_lead(
        &self,
        id: Uuid,
        profile: LeadProfile,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Lead {
        let initial = self.catalogue.initial_status().clone();
        let lead = Lead::new(id, profile, initial.clone(), now);
        lead.with_entry(StatusHistoryEntry {
            from_status: None,
            to_status: initial,
            timestamp: now,
            changed_by: actor.map(str::to_string),
            notes: None,
        })
    }

    /// Moves `lead` to `new_status`, returning the updated lead.
    ///
    /// Any catalogue status may follow any other, including the current one:
    /// a repeated status is recorded like any other transition.
    ///
    /// # Returns
    /// * `Err(ApiError::UnknownStatus)` - `new_status` is not in the catalogue
    /// * `Err(ApiError::ValidationError)` - `now` precedes the last history entry
    ///
    /// The input lead is never modified, so on error the caller still holds
    /// the unchanged lead.
    pub fn apply_transition(
        &self,
        lead: &Lead,
        new_status: &str,
        actor: Option<&str>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> ApiResult<Lead> {
        let target = self.catalogue.get(new_status)?.id.clone();

        if let Some(last) = lead.last_transition() {
            if now < last.timestamp {
                return Err(ApiError::ValidationError(format!(
                    "transition time {now} precedes the last recorded transition at {}",
                    last.timestamp
                )));
            }
        }

        tracing::debug!(
            lead_id = %lead.id,
            from = %lead.status(),
            to = %target,
            changed_by = actor.unwrap_or("system"),
            "applying status transition"
        );

        Ok(lead.with_entry(StatusHistoryEntry {
            from_status: Some(lead.status().clone()),
            to_status: target,
            timestamp: now,
            changed_by: actor.map(str::to_string),
            notes: notes.map(str::to_string),
        }))
    }

    pub fn aggregate<I>(&self, leads: I) -> AggregateResult
    where
        I: IntoIterator,
        I::Item: StatusSnapshot,
    {
        aggregate(&self.catalogue, leads)
    }
}
