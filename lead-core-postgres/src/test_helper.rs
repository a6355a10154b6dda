//! Transaction-per-test isolation for the repository tests.
//!
//! Each context runs on its own transaction that is rolled back when the
//! context is dropped, so tests need no cleanup.

use crate::config::DatabaseConfig;
use crate::postgres_repositories::{LeadRepositories, PostgresRepositories};
use std::sync::Arc;

pub struct TestContext {
    pub lead_repos: LeadRepositories,
}

impl TestContext {
    pub fn lead_repos(&self) -> &LeadRepositories {
        &self.lead_repos
    }
}

/// Connects with `DATABASE_URL` (or its default), applies the migrations and
/// opens the transaction the returned context runs in.
pub async fn setup_test_context() -> Result<TestContext, Box<dyn std::error::Error + Send + Sync>> {
    let repos = setup_shared_repos(1).await?;
    let lead_repos = repos.create_lead_repositories().await?;
    Ok(TestContext { lead_repos })
}

/// Repositories over a migrated pool, for tests that commit across several
/// transactions (such as the `PgLeadStore` tests).
pub async fn setup_shared_repos(
    max_connections: u32,
) -> Result<PostgresRepositories, Box<dyn std::error::Error + Send + Sync>> {
    let pool = DatabaseConfig::from_env()
        .with_max_connections(max_connections)
        .connect()
        .await?;

    sqlx::migrate!().run(&pool).await?;

    Ok(PostgresRepositories::new(Arc::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::lead::lead_repository::test_utils::{
        create_test_lead, create_test_lead_models, unique_tag,
    };
    use chrono::{TimeZone, Utc};
    use lead_core_db::repository::create_batch::CreateBatch;
    use lead_core_db::repository::load::Load;

    #[tokio::test]
    #[ignore]
    async fn test_transaction_rollback() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let lead = create_test_lead(&unique_tag(), Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        {
            let ctx = setup_test_context().await?;
            let lead_repo = &ctx.lead_repos().lead_repository;
            let (model, _) = create_test_lead_models(&lead);

            lead_repo.create_batch(vec![model]).await?;

            assert!(lead_repo.load(lead.id).await?.is_some());
        } // rolled back here

        let ctx = setup_test_context().await?;
        assert!(ctx.lead_repos().lead_repository.load(lead.id).await?.is_none());

        Ok(())
    }
}
