use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for inserting multiple entities in a batch
///
/// All inserts run inside the repository's transaction; nothing is visible to
/// other sessions until the caller commits.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
///
/// # Example
/// ```ignore
/// let lead = LeadModel::from_lead(&lead, history.last().map(|h| h.hash).unwrap_or(0))?;
/// repo.create_batch(vec![lead]).await?;
/// repo.create_batch(history).await?;
/// ```
#[async_trait]
pub trait CreateBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Insert multiple items
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - The inserted entities
    /// * `Err` - An error if an insert failed, e.g. on a duplicate id
    async fn create_batch(&self, items: Vec<T>) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
