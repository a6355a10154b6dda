use async_trait::async_trait;
use sqlx::Database;

use crate::models::lead::StatusHistoryModel;

/// The most recent history rows across all leads.
///
/// Ordered by `changed_at` descending, then `lead_id` ascending, then
/// `sequence` descending.
#[async_trait]
pub trait LoadRecentHistory<DB: Database>: Send + Sync {
    async fn load_recent_history(
        &self,
        limit: usize,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
