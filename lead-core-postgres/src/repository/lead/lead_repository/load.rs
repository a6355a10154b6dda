use async_trait::async_trait;
use lead_core_db::models::lead::LeadModel;
use lead_core_db::repository::load::Load;
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn load_impl(
        repo: &LeadRepositoryImpl,
        id: Uuid,
    ) -> Result<Option<LeadModel>, Box<dyn Error + Send + Sync>> {
        let query = r#"SELECT * FROM lead WHERE id = $1"#;
        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(query).bind(id).fetch_optional(&mut **transaction).await?
        };

        row.as_ref().map(LeadModel::try_from_row).transpose()
    }
}

#[async_trait]
impl Load<Postgres, LeadModel> for LeadRepositoryImpl {
    async fn load(&self, id: Uuid) -> Result<Option<LeadModel>, Box<dyn Error + Send + Sync>> {
        Self::load_impl(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use lead_core_db::repository::load::Load;

    #[tokio::test]
    #[ignore]
    async fn test_load_missing_lead() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let lead_repo = &ctx.lead_repos().lead_repository;

        assert_eq!(lead_repo.load(uuid::Uuid::new_v4()).await?, None);

        Ok(())
    }
}
