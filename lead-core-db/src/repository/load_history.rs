use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

use crate::models::lead::StatusHistoryModel;
use crate::repository::pagination::{Page, PageRequest};

/// Reads status history rows, always in ascending `sequence` order
#[async_trait]
pub trait LoadHistory<DB: Database>: Send + Sync {
    /// The complete history of one lead
    async fn load_history(
        &self,
        lead_id: Uuid,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Complete histories of several leads, returned in the order of `lead_ids`
    async fn load_history_batch(
        &self,
        lead_ids: &[Uuid],
    ) -> Result<Vec<Vec<StatusHistoryModel>>, Box<dyn std::error::Error + Send + Sync>>;

    /// One page of a lead's history
    async fn load_history_page(
        &self,
        lead_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<StatusHistoryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
