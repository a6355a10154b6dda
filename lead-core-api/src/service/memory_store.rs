use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::lead::Lead;
use crate::error::{ApiError, ApiResult};
use crate::service::store::{LeadFilter, LeadStore};

/// Process-local [`LeadStore`].
///
/// The compare-and-swap in `commit_transition` runs under the write lock, so
/// concurrent transitions of one lead serialize and all but the first fail
/// with `ConcurrentModification`.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: RwLock<HashMap<Uuid, Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        Self {
            leads: RwLock::new(leads.into_iter().map(|lead| (lead.id, lead)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.leads.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.read().is_empty()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn load_lead(&self, id: Uuid) -> ApiResult<Option<Lead>> {
        Ok(self.leads.read().get(&id).cloned())
    }

    async fn insert_lead(&self, lead: &Lead) -> ApiResult<()> {
        let mut leads = self.leads.write();
        if leads.contains_key(&lead.id) {
            return Err(ApiError::ValidationError(format!("lead {} already exists", lead.id)));
        }
        leads.insert(lead.id, lead.clone());
        Ok(())
    }

    async fn commit_transition(&self, expected: &Lead, updated: &Lead) -> ApiResult<()> {
        if expected.id != updated.id || updated.version() != expected.version() + 1 {
            return Err(ApiError::InternalError(format!(
                "lead {} update is not a single transition of the expected state",
                expected.id
            )));
        }

        let mut leads = self.leads.write();
        let stored = leads
            .get_mut(&expected.id)
            .ok_or_else(|| ApiError::NotFound(format!("lead {}", expected.id)))?;

        if stored.version() != expected.version() || stored.status() != expected.status() {
            return Err(ApiError::ConcurrentModification {
                lead_id: expected.id,
                expected_version: expected.version(),
            });
        }

        *stored = updated.clone();
        Ok(())
    }

    async fn load_population(&self, filter: &LeadFilter) -> ApiResult<Vec<Lead>> {
        let mut population: Vec<Lead> = self
            .leads
            .read()
            .values()
            .filter(|lead| filter.matches(lead))
            .cloned()
            .collect();
        population.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(population)
    }
}
