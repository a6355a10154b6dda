use async_trait::async_trait;
use lead_core_db::models::lead::StatusHistoryModel;
use lead_core_db::repository::load_recent_history::LoadRecentHistory;
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn load_recent_history_impl(
        repo: &LeadRepositoryImpl,
        limit: usize,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = r#"
            SELECT * FROM lead_status_history
            ORDER BY changed_at DESC, lead_id, sequence DESC
            LIMIT $1
        "#;
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(query).bind(limit as i64).fetch_all(&mut **transaction).await?
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(StatusHistoryModel::try_from_row(&row)?);
        }
        Ok(items)
    }
}

#[async_trait]
impl LoadRecentHistory<Postgres> for LeadRepositoryImpl {
    async fn load_recent_history(
        &self,
        limit: usize,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        Self::load_recent_history_impl(self, limit).await
    }
}
