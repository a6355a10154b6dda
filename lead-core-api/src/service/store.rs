use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lead::Lead;
use crate::domain::status::StatusId;
use crate::error::ApiResult;

/// Status value meaning "no status filter", as sent by the dashboard's selector
pub const ALL_STATUSES: &str = "All";

/// Population selection for listing and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadFilter {
    pub status: Option<StatusId>,
    /// Case-insensitive substring over first name, last name, email and phone
    pub search: Option<String>,
}

impl LeadFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<StatusId>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// The effective status filter; blank and `All` select every status.
    pub fn status_filter(&self) -> Option<&StatusId> {
        self.status
            .as_ref()
            .filter(|status| !status.as_str().trim().is_empty() && status.as_str() != ALL_STATUSES)
    }

    /// The effective search term, trimmed and lowercased.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = self.status_filter() {
            if lead.status() != status {
                return false;
            }
        }
        match self.search_term() {
            Some(term) => {
                let profile = &lead.profile;
                [&profile.first_name, &profile.last_name, &profile.email, &profile.phone]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

/// Persistence collaborator of the lead service.
///
/// Implementations own durability and must make `commit_transition` an
/// atomic compare-and-swap: at most one transition is committed per lead
/// version.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn load_lead(&self, id: Uuid) -> ApiResult<Option<Lead>>;

    async fn insert_lead(&self, lead: &Lead) -> ApiResult<()>;

    /// Replaces `expected` with `updated`.
    ///
    /// # Returns
    /// * `Err(ApiError::ConcurrentModification)` - the stored lead no longer
    ///   matches `expected` (version or status); nothing is written
    /// * `Err(ApiError::NotFound)` - the lead does not exist
    async fn commit_transition(&self, expected: &Lead, updated: &Lead) -> ApiResult<()>;

    async fn load_population(&self, filter: &LeadFilter) -> ApiResult<Vec<Lead>>;
}
