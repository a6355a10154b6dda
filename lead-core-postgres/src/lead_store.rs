use async_trait::async_trait;
use lead_core_api::{
    ActivityItem, ApiError, ApiResult, Lead, LeadFilter, LeadStore, StatusId,
};
use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
use lead_core_db::repository::append_transition::{AppendTransition, TransitionConflict};
use lead_core_db::repository::create_batch::CreateBatch;
use lead_core_db::repository::exist_by_ids::ExistByIds;
use lead_core_db::repository::find_leads::FindLeads;
use lead_core_db::repository::load::Load;
use lead_core_db::repository::load_batch::LoadBatch;
use lead_core_db::repository::load_history::LoadHistory;
use lead_core_db::repository::load_recent_history::LoadRecentHistory;
use lead_core_db::repository::load_status_snapshot::LoadStatusSnapshot;
use lead_core_db::repository::pagination::{Page, PageRequest};
use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::postgres_repositories::{LeadRepositories, PostgresRepositories};

/// Leads fetched per round trip when a whole population is loaded
const POPULATION_BATCH: usize = 500;

fn db_error(error: impl Display) -> ApiError {
    ApiError::DatabaseError(error.to_string())
}

fn activity_item(row: &StatusHistoryModel, lead_name: String) -> ApiResult<ActivityItem> {
    let sequence = usize::try_from(row.sequence).map_err(|_| {
        ApiError::InternalError(format!(
            "history entry {} of lead {} has negative sequence {}",
            row.id, row.lead_id, row.sequence
        ))
    })?;
    let entry = row.to_entry();
    Ok(ActivityItem {
        lead_id: row.lead_id,
        lead_name,
        sequence,
        from_status: entry.from_status,
        to_status: entry.to_status,
        timestamp: entry.timestamp,
        changed_by: entry.changed_by,
    })
}

/// [`LeadStore`] on Postgres. Every call runs in its own transaction; reads
/// run on a `REPEATABLE READ` snapshot.
pub struct PgLeadStore {
    repositories: PostgresRepositories,
}

impl PgLeadStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            repositories: PostgresRepositories::new(pool),
        }
    }

    pub async fn connect(config: &DatabaseConfig) -> ApiResult<Self> {
        let pool = config.connect().await.map_err(db_error)?;
        Ok(Self::new(Arc::new(pool)))
    }

    async fn begin(&self) -> ApiResult<LeadRepositories> {
        self.repositories
            .create_lead_repositories()
            .await
            .map_err(db_error)
    }

    /// Repositories for reads spanning several statements
    async fn begin_snapshot(&self) -> ApiResult<LeadRepositories> {
        self.repositories
            .create_lead_snapshot_repositories()
            .await
            .map_err(db_error)
    }

    async fn rebuild_leads(repos: &LeadRepositories, models: Vec<LeadModel>) -> ApiResult<Vec<Lead>> {
        let ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
        let histories = repos
            .lead_repository
            .load_history_batch(&ids)
            .await
            .map_err(db_error)?;

        models
            .into_iter()
            .zip(histories)
            .map(|(model, history)| model.into_lead(&history))
            .collect()
    }

    /// One page of the lead list, newest intake first.
    pub async fn list_leads(&self, filter: &LeadFilter, page: PageRequest) -> ApiResult<Page<Lead>> {
        let repos = self.begin_snapshot().await?;
        let models = repos
            .lead_repository
            .find_leads(filter, page)
            .await
            .map_err(db_error)?;

        let (total, limit, offset) = (models.total, models.limit, models.offset);
        let leads = Self::rebuild_leads(&repos, models.items).await?;
        repos.commit().await.map_err(db_error)?;

        Ok(Page::new(leads, total, limit, offset))
    }

    /// Current statuses of the filtered population, for aggregation without
    /// loading profiles or histories.
    pub async fn status_snapshot(&self, filter: &LeadFilter) -> ApiResult<Vec<StatusId>> {
        let repos = self.begin_snapshot().await?;
        let statuses = repos
            .lead_repository
            .load_status_snapshot(filter)
            .await
            .map_err(db_error)?;
        repos.commit().await.map_err(db_error)?;
        Ok(statuses)
    }

    /// The `limit` newest transitions across all leads, for the activity feed.
    pub async fn recent_activity(&self, limit: usize) -> ApiResult<Vec<ActivityItem>> {
        let repos = self.begin_snapshot().await?;
        let rows = repos
            .lead_repository
            .load_recent_history(limit)
            .await
            .map_err(db_error)?;

        let mut lead_ids: Vec<Uuid> = rows.iter().map(|row| row.lead_id).collect();
        lead_ids.sort();
        lead_ids.dedup();
        let names: HashMap<Uuid, String> = repos
            .lead_repository
            .load_batch(&lead_ids)
            .await
            .map_err(db_error)?
            .into_iter()
            .flatten()
            .map(|model| (model.id, format!("{} {}", model.first_name, model.last_name)))
            .collect();
        repos.commit().await.map_err(db_error)?;

        rows.iter()
            .map(|row| activity_item(row, names.get(&row.lead_id).cloned().unwrap_or_default()))
            .collect()
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn load_lead(&self, id: Uuid) -> ApiResult<Option<Lead>> {
        let repos = self.begin_snapshot().await?;
        let model = repos.lead_repository.load(id).await.map_err(db_error)?;
        let lead = match model {
            Some(model) => {
                let history = repos.lead_repository.load_history(id).await.map_err(db_error)?;
                Some(model.into_lead(&history)?)
            }
            None => None,
        };
        repos.commit().await.map_err(db_error)?;
        Ok(lead)
    }

    async fn insert_lead(&self, lead: &Lead) -> ApiResult<()> {
        let history = StatusHistoryModel::chain(lead.id, lead.status_history())?;
        let last_hash = history.last().map(|entry| entry.hash).unwrap_or(0);
        let model = LeadModel::from_lead(lead, last_hash)?;

        let repos = self.begin().await?;
        let exists = repos
            .lead_repository
            .exist_by_ids(&[lead.id])
            .await
            .map_err(db_error)?;
        if exists.iter().any(|(_, exists)| *exists) {
            return Err(ApiError::ValidationError(format!("lead {} already exists", lead.id)));
        }

        repos.lead_repository.create_batch(vec![model]).await.map_err(db_error)?;
        repos.lead_repository.create_batch(history).await.map_err(db_error)?;
        repos.commit().await.map_err(db_error)?;

        tracing::debug!(lead_id = %lead.id, "lead stored");
        Ok(())
    }

    async fn commit_transition(&self, expected: &Lead, updated: &Lead) -> ApiResult<()> {
        let entry = match updated.last_transition() {
            Some(entry) if expected.id == updated.id && updated.version() == expected.version() + 1 => entry,
            _ => {
                return Err(ApiError::InternalError(format!(
                    "lead {} update is not a single transition of the expected state",
                    expected.id
                )))
            }
        };

        let repos = self.begin().await?;
        let stored = repos
            .lead_repository
            .load(expected.id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| ApiError::NotFound(format!("lead {}", expected.id)))?;

        let conflict = ApiError::ConcurrentModification {
            lead_id: expected.id,
            expected_version: expected.version(),
        };
        if stored.version != expected.version() {
            return Err(conflict);
        }

        let entry_model = StatusHistoryModel::from_entry(
            updated.id,
            expected.version() as i32,
            entry,
            stored.last_history_hash,
        )?;
        let lead_model = LeadModel::from_lead(updated, entry_model.hash)?;

        if let Err(error) = repos
            .lead_repository
            .append_transition(expected.version(), expected.status().as_str(), &lead_model, &entry_model)
            .await
        {
            if error.downcast_ref::<TransitionConflict>().is_some() {
                return Err(conflict);
            }
            return Err(db_error(error));
        }
        repos.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn load_population(&self, filter: &LeadFilter) -> ApiResult<Vec<Lead>> {
        let repos = self.begin_snapshot().await?;
        let mut models = Vec::new();
        let mut page = PageRequest::new(POPULATION_BATCH, 0);
        loop {
            let batch = repos
                .lead_repository
                .find_leads(filter, page)
                .await
                .map_err(db_error)?;
            let has_more = batch.has_more() && !batch.items.is_empty();
            models.extend(batch.items);
            if !has_more {
                break;
            }
            page = page.next();
        }

        let mut population = Self::rebuild_leads(&repos, models).await?;
        repos.commit().await.map_err(db_error)?;

        population.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(population)
    }
}
