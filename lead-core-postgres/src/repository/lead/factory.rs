use std::error::Error;
use std::sync::Arc;

use super::LeadRepositoryImpl;
use crate::executor::Executor;

/// Factory for the lead module repositories
pub struct LeadRepoFactory {}

impl LeadRepoFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }

    pub fn build_lead_repo(&self, executor: &Executor) -> Arc<LeadRepositoryImpl> {
        Arc::new(LeadRepositoryImpl::new(executor.clone()))
    }

    /// Build all lead repositories on one executor
    pub fn build_all_repos(&self, executor: &Executor) -> LeadRepositories {
        LeadRepositories {
            executor: executor.clone(),
            lead_repository: self.build_lead_repo(executor),
        }
    }
}

/// Lead module repositories sharing one transaction
pub struct LeadRepositories {
    pub executor: Executor,
    pub lead_repository: Arc<LeadRepositoryImpl>,
}

impl LeadRepositories {
    pub async fn commit(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.executor.commit().await
    }

    pub async fn rollback(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.executor.rollback().await
    }
}
