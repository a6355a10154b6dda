use async_trait::async_trait;
use lead_core_api::LeadFilter;
use lead_core_db::models::lead::LeadModel;
use lead_core_db::repository::find_leads::FindLeads;
use lead_core_db::repository::pagination::{Page, PageRequest};
use crate::utils::{contains_pattern, TryFromRow};
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::LeadRepositoryImpl;

/// Predicate over `lead` for a [`LeadFilter`]: `$1` is the status, `$2` the
/// search pattern; either may be NULL to disable it.
pub(super) const LEAD_FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR status = $1::text)
    AND ($2::text IS NULL
         OR first_name ILIKE $2::text
         OR last_name ILIKE $2::text
         OR email ILIKE $2::text
         OR phone ILIKE $2::text)
"#;

pub(super) fn filter_binds(filter: &LeadFilter) -> (Option<String>, Option<String>) {
    (
        filter.status_filter().map(|status| status.as_str().to_string()),
        filter.search_term().map(|term| contains_pattern(&term)),
    )
}

impl LeadRepositoryImpl {
    pub(super) async fn find_leads_impl(
        repo: &LeadRepositoryImpl,
        filter: &LeadFilter,
        page: PageRequest,
    ) -> Result<Page<LeadModel>, Box<dyn Error + Send + Sync>> {
        let (status, search) = filter_binds(filter);

        let count_query = format!("SELECT COUNT(*) FROM lead WHERE {LEAD_FILTER_CLAUSE}");
        let query = format!(
            "SELECT * FROM lead WHERE {LEAD_FILTER_CLAUSE} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
        );

        let (total, rows) = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

            let total: i64 = sqlx::query_scalar(&count_query)
                .bind(status.as_deref())
                .bind(search.as_deref())
                .fetch_one(&mut **transaction)
                .await?;
            let rows = sqlx::query(&query)
                .bind(status.as_deref())
                .bind(search.as_deref())
                .bind(page.limit as i64)
                .bind(page.offset as i64)
                .fetch_all(&mut **transaction)
                .await?;
            (total, rows)
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(LeadModel::try_from_row(&row)?);
        }

        Ok(Page::new(items, total as usize, page.limit, page.offset))
    }
}

#[async_trait]
impl FindLeads<Postgres> for LeadRepositoryImpl {
    async fn find_leads(
        &self,
        filter: &LeadFilter,
        page: PageRequest,
    ) -> Result<Page<LeadModel>, Box<dyn Error + Send + Sync>> {
        Self::find_leads_impl(self, filter, page).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::lead::lead_repository::test_utils::{
        create_test_lead, create_test_lead_models, minutes_after, test_engine, unique_tag,
    };
    use crate::test_helper::setup_test_context;
    use chrono::{TimeZone, Utc};
    use lead_core_api::LeadFilter;
    use lead_core_db::repository::create_batch::CreateBatch;
    use lead_core_db::repository::find_leads::FindLeads;
    use lead_core_db::repository::pagination::PageRequest;

    #[tokio::test]
    #[ignore]
    async fn test_find_leads_filters_and_pages() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let lead_repo = &ctx.lead_repos().lead_repository;
        let tag = unique_tag();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        let mut ids = Vec::new();
        for minute in 0..3 {
            let mut lead = create_test_lead(&tag, minutes_after(start, minute));
            if minute == 1 {
                lead = test_engine().apply_transition(&lead, "WORKING", None, None, minutes_after(start, 10))?;
            }
            let (model, history) = create_test_lead_models(&lead);
            lead_repo.create_batch(vec![model]).await?;
            lead_repo.create_batch(history).await?;
            ids.push(lead.id);
        }

        let search = LeadFilter::all().with_search(tag.to_uppercase());
        let first_page = lead_repo.find_leads(&search, PageRequest::new(2, 0)).await?;
        assert_eq!(first_page.total, 3);
        assert_eq!(first_page.items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);
        assert!(first_page.has_more());

        let second_page = lead_repo.find_leads(&search, PageRequest::new(2, 2)).await?;
        assert_eq!(second_page.items.len(), 1);
        assert_eq!(second_page.items[0].id, ids[0]);

        let working = lead_repo.find_leads(&search.clone().with_status("WORKING"), PageRequest::default()).await?;
        assert_eq!(working.total, 1);
        assert_eq!(working.items[0].id, ids[1]);

        let everything = lead_repo.find_leads(&search.with_status("All"), PageRequest::default()).await?;
        assert_eq!(everything.total, 3);

        Ok(())
    }
}
