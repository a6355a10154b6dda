use sqlx::PgPool;
use std::sync::Arc;

use crate::executor::Executor;
use crate::repository::lead::LeadRepoFactory;

pub use crate::repository::lead::LeadRepositories;

pub struct PostgresRepositories {
    pool: Arc<PgPool>,
    lead_factory: Arc<LeadRepoFactory>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            lead_factory: LeadRepoFactory::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lead repositories sharing a newly started transaction.
    ///
    /// Nothing is persisted until `commit` is called on the result;
    /// dropping it rolls the transaction back.
    pub async fn create_lead_repositories(&self) -> Result<LeadRepositories, sqlx::Error> {
        let executor = Executor::begin(&self.pool).await?;
        Ok(self.lead_factory.build_all_repos(&executor))
    }

    /// Lead repositories on a read-only `REPEATABLE READ` transaction: the row,
    /// page and history reads of one call all see the same committed state.
    pub async fn create_lead_snapshot_repositories(&self) -> Result<LeadRepositories, sqlx::Error> {
        let executor = Executor::begin_snapshot(&self.pool).await?;
        Ok(self.lead_factory.build_all_repos(&executor))
    }
}
