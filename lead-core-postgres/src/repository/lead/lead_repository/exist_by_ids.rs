use async_trait::async_trait;
use lead_core_db::repository::exist_by_ids::ExistByIds;
use sqlx::{Postgres, Row};
use std::collections::HashSet;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn exist_by_ids_impl(
        repo: &LeadRepositoryImpl,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, bool)>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = r#"SELECT id FROM lead WHERE id = ANY($1)"#;
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(query).bind(ids).fetch_all(&mut **transaction).await?
        };

        let existing_ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(ids.iter().map(|&id| (id, existing_ids.contains(&id))).collect())
    }
}

#[async_trait]
impl ExistByIds<Postgres> for LeadRepositoryImpl {
    async fn exist_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, bool)>, Box<dyn Error + Send + Sync>> {
        Self::exist_by_ids_impl(self, ids).await
    }
}
