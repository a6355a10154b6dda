use async_trait::async_trait;
use lead_core_db::models::lead::StatusHistoryModel;
use lead_core_db::repository::load_history::LoadHistory;
use lead_core_db::repository::pagination::{Page, PageRequest};
use crate::utils::TryFromRow;
use sqlx::Postgres;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn load_history_batch_impl(
        repo: &LeadRepositoryImpl,
        lead_ids: &[Uuid],
    ) -> Result<Vec<Vec<StatusHistoryModel>>, Box<dyn Error + Send + Sync>> {
        if lead_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = r#"
            SELECT * FROM lead_status_history
            WHERE lead_id = ANY($1)
            ORDER BY lead_id, sequence
        "#;
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(query).bind(lead_ids).fetch_all(&mut **transaction).await?
        };

        let mut by_lead: HashMap<Uuid, Vec<StatusHistoryModel>> = HashMap::new();
        for row in rows {
            let entry = StatusHistoryModel::try_from_row(&row)?;
            by_lead.entry(entry.lead_id).or_default().push(entry);
        }

        Ok(lead_ids
            .iter()
            .map(|id| by_lead.get(id).cloned().unwrap_or_default())
            .collect())
    }

    pub(super) async fn load_history_page_impl(
        repo: &LeadRepositoryImpl,
        lead_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        let count_query = r#"SELECT COUNT(*) FROM lead_status_history WHERE lead_id = $1"#;
        let query = r#"
            SELECT * FROM lead_status_history
            WHERE lead_id = $1
            ORDER BY sequence
            LIMIT $2 OFFSET $3
        "#;

        let (total, rows) = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            let total: i64 = sqlx::query_scalar(count_query)
                .bind(lead_id)
                .fetch_one(&mut **transaction)
                .await?;
            let rows = sqlx::query(query)
                .bind(lead_id)
                .bind(page.limit as i64)
                .bind(page.offset as i64)
                .fetch_all(&mut **transaction)
                .await?;
            (total, rows)
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(StatusHistoryModel::try_from_row(&row)?);
        }

        Ok(Page::new(items, total as usize, page.limit, page.offset))
    }
}

#[async_trait]
impl LoadHistory<Postgres> for LeadRepositoryImpl {
    async fn load_history(
        &self,
        lead_id: Uuid,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        let mut histories = Self::load_history_batch_impl(self, &[lead_id]).await?;
        Ok(histories.pop().unwrap_or_default())
    }

    async fn load_history_batch(
        &self,
        lead_ids: &[Uuid],
    ) -> Result<Vec<Vec<StatusHistoryModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_history_batch_impl(self, lead_ids).await
    }

    async fn load_history_page(
        &self,
        lead_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        Self::load_history_page_impl(self, lead_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::lead::lead_repository::test_utils::{
        create_test_lead, create_test_lead_models, minutes_after, test_engine, unique_tag,
    };
    use crate::test_helper::setup_test_context;
    use chrono::{TimeZone, Utc};
    use lead_core_db::models::lead::verify_history_chain;
    use lead_core_db::repository::create_batch::CreateBatch;
    use lead_core_db::repository::load_history::LoadHistory;
    use lead_core_db::repository::pagination::PageRequest;

    #[tokio::test]
    #[ignore]
    async fn test_load_history_in_sequence_order() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let lead_repo = &ctx.lead_repos().lead_repository;
        let engine = test_engine();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        let mut lead = create_test_lead(&unique_tag(), start);
        for (minute, status) in ["WORKING", "CALL_BACK", "VERIFIED"].iter().enumerate() {
            lead = engine.apply_transition(&lead, status, Some("agent-1"), None, minutes_after(start, minute as i64 + 1))?;
        }
        let other = create_test_lead(&unique_tag(), start);
        for lead in [&lead, &other] {
            let (model, history) = create_test_lead_models(lead);
            lead_repo.create_batch(vec![model]).await?;
            lead_repo.create_batch(history).await?;
        }

        let history = lead_repo.load_history(lead.id).await?;
        assert_eq!(history.iter().map(|h| h.sequence).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(verify_history_chain(lead.id, &history).is_ok());

        let batch = lead_repo
            .load_history_batch(&[other.id, uuid::Uuid::new_v4(), lead.id])
            .await?;
        assert_eq!(batch.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 0, 4]);

        let page = lead_repo.load_history_page(lead.id, PageRequest::new(3, 3)).await?;
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].to_status.as_str(), "VERIFIED");

        Ok(())
    }
}
