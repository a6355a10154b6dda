use async_trait::async_trait;
use lead_core_db::models::lead::LeadModel;
use lead_core_db::repository::load_batch::LoadBatch;
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &LeadRepositoryImpl,
        ids: &[Uuid],
    ) -> Result<Vec<Option<LeadModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = r#"SELECT * FROM lead WHERE id = ANY($1)"#;
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(query).bind(ids).fetch_all(&mut **transaction).await?
        };

        let mut item_map = HashMap::with_capacity(rows.len());
        for row in rows {
            let item = LeadModel::try_from_row(&row)?;
            item_map.insert(item.id, item);
        }

        // Duplicated ids each get a copy
        Ok(ids.iter().map(|id| item_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<Postgres, LeadModel> for LeadRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<LeadModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, ids).await
    }
}
