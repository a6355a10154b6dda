use async_trait::async_trait;
use lead_core_api::LeadFilter;
use sqlx::Database;

use crate::models::lead::LeadModel;
use crate::repository::pagination::{Page, PageRequest};

/// Lists leads matching a [`LeadFilter`], newest intake first.
///
/// The status filter is an exact match ("All" or blank disables it); the
/// search term matches case-insensitively against first name, last name,
/// email and phone.
///
/// # Example
/// ```ignore
/// let filter = LeadFilter::all().with_search("lovelace");
/// let page = repo.find_leads(&filter, PageRequest::for_page(10, 1)).await?;
/// ```
#[async_trait]
pub trait FindLeads<DB: Database>: Send + Sync {
    async fn find_leads(
        &self,
        filter: &LeadFilter,
        page: PageRequest,
    ) -> Result<Page<LeadModel>, Box<dyn std::error::Error + Send + Sync>>;
}
