use async_trait::async_trait;
use lead_core_api::{LeadFilter, StatusId};
use sqlx::Database;

/// Current status of every lead matching the filter, without profiles or
/// history. Enough to feed the aggregation for large populations.
#[async_trait]
pub trait LoadStatusSnapshot<DB: Database>: Send + Sync {
    async fn load_status_snapshot(
        &self,
        filter: &LeadFilter,
    ) -> Result<Vec<StatusId>, Box<dyn std::error::Error + Send + Sync>>;
}
