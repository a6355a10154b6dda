use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::lead::{Lead, LeadProfile, StatusHistoryEntry};
use crate::error::{ApiError, ApiResult};
use crate::service::activity::{recent_activity, ActivityItem};
use crate::service::aggregation::{AggregateResult, DistributionRow};
use crate::service::engine::LifecycleEngine;
use crate::service::store::{LeadFilter, LeadStore};

/// Everything the dashboard renders for one population snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub aggregate: AggregateResult,
    /// Zero-filled, in catalogue order
    pub distribution: Vec<DistributionRow>,
    pub recent_activity: Vec<ActivityItem>,
}

/// Caller-side orchestration of the engine over a [`LeadStore`]:
/// load, apply, then commit with an optimistic version check.
pub struct LeadService<S> {
    engine: LifecycleEngine,
    store: S,
}

impl<S: LeadStore> LeadService<S> {
    pub fn new(engine: LifecycleEngine, store: S) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates the profile and stores a new lead in the initial status.
    pub async fn intake(
        &self,
        profile: LeadProfile,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> ApiResult<Lead> {
        profile.validate()?;

        let lead = self.engine.create_lead(Uuid::new_v4(), profile, actor, now);
        self.store.insert_lead(&lead).await?;

        tracing::info!(lead_id = %lead.id, status = %lead.status(), "lead created");
        Ok(lead)
    }

    /// Applies one transition and commits it.
    ///
    /// Fails without writing anything when the target status is unknown or
    /// when another transition of the same lead was committed since it was
    /// loaded (`ConcurrentModification`); the caller may reload and retry.
    pub async fn change_status(
        &self,
        lead_id: Uuid,
        new_status: &str,
        actor: Option<&str>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> ApiResult<Lead> {
        let current = self.load_existing(lead_id).await?;
        let updated = self
            .engine
            .apply_transition(&current, new_status, actor, notes, now)?;

        if let Err(error) = self.store.commit_transition(&current, &updated).await {
            tracing::warn!(lead_id = %lead_id, to = new_status, error = %error, "status change rejected");
            return Err(error);
        }

        tracing::info!(
            lead_id = %lead_id,
            from = %current.status(),
            to = %updated.status(),
            version = updated.version(),
            "lead status changed"
        );
        Ok(updated)
    }

    pub async fn history(&self, lead_id: Uuid) -> ApiResult<Vec<StatusHistoryEntry>> {
        Ok(self.load_existing(lead_id).await?.status_history().to_vec())
    }

    /// Aggregates the filtered population and collects its latest activity.
    pub async fn dashboard(&self, filter: &LeadFilter, activity_limit: usize) -> ApiResult<DashboardSnapshot> {
        let population = self.store.load_population(filter).await?;
        let aggregate = self.engine.aggregate(&population);
        let distribution = aggregate.status_distribution(self.engine.catalogue());

        Ok(DashboardSnapshot {
            recent_activity: recent_activity(&population, activity_limit),
            aggregate,
            distribution,
        })
    }

    async fn load_existing(&self, lead_id: Uuid) -> ApiResult<Lead> {
        self.store
            .load_lead(lead_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("lead {lead_id}")))
    }
}
