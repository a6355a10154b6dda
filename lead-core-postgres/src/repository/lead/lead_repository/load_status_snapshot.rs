use async_trait::async_trait;
use lead_core_api::{LeadFilter, StatusId};
use lead_core_db::repository::load_status_snapshot::LoadStatusSnapshot;
use sqlx::{Postgres, Row};
use std::error::Error;

use super::find_leads::{filter_binds, LEAD_FILTER_CLAUSE};
use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn load_status_snapshot_impl(
        repo: &LeadRepositoryImpl,
        filter: &LeadFilter,
    ) -> Result<Vec<StatusId>, Box<dyn Error + Send + Sync>> {
        let (status, search) = filter_binds(filter);
        let query = format!("SELECT status FROM lead WHERE {LEAD_FILTER_CLAUSE} ORDER BY created_at, id");

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(&query)
                .bind(status.as_deref())
                .bind(search.as_deref())
                .fetch_all(&mut **transaction)
                .await?
        };

        let mut statuses = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            statuses.push(StatusId::new(status));
        }
        Ok(statuses)
    }
}

#[async_trait]
impl LoadStatusSnapshot<Postgres> for LeadRepositoryImpl {
    async fn load_status_snapshot(
        &self,
        filter: &LeadFilter,
    ) -> Result<Vec<StatusId>, Box<dyn Error + Send + Sync>> {
        Self::load_status_snapshot_impl(self, filter).await
    }
}
