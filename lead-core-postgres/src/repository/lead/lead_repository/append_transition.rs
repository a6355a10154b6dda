use async_trait::async_trait;
use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
use lead_core_db::repository::append_transition::{AppendTransition, TransitionConflict};
use sqlx::Postgres;
use std::error::Error;

use super::create_batch::insert_history_row;
use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn append_transition_impl(
        repo: &LeadRepositoryImpl,
        expected_version: i64,
        expected_status: &str,
        lead: &LeadModel,
        entry: &StatusHistoryModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if entry.lead_id != lead.id
            || lead.version != expected_version + 1
            || i64::from(entry.sequence) != expected_version
            || entry.hash != lead.last_history_hash
        {
            return Err(format!(
                "history entry {} is not the next transition of lead {} at version {expected_version}",
                entry.id, lead.id
            )
            .into());
        }

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        // Compare-and-set: the row lock taken here serializes concurrent
        // commits of the same lead; the loser sees the new version and matches nothing.
        let updated = sqlx::query(
            r#"
            UPDATE lead SET
                status = $2,
                version = $3,
                last_history_hash = $4,
                updated_at = $5
            WHERE id = $1
              AND version = $6
              AND status = $7
            "#,
        )
        .bind(lead.id)
        .bind(lead.status.as_str())
        .bind(lead.version)
        .bind(lead.last_history_hash)
        .bind(lead.updated_at)
        .bind(expected_version)
        .bind(expected_status)
        .execute(&mut **transaction)
        .await?;

        if updated.rows_affected() == 0 {
            tracing::debug!(lead_id = %lead.id, expected_version, "transition lost the version check");
            return Err(TransitionConflict {
                lead_id: lead.id,
                expected_version,
            }
            .into());
        }

        insert_history_row(entry).execute(&mut **transaction).await?;
        Ok(())
    }
}

#[async_trait]
impl AppendTransition<Postgres> for LeadRepositoryImpl {
    async fn append_transition(
        &self,
        expected_version: i64,
        expected_status: &str,
        lead: &LeadModel,
        entry: &StatusHistoryModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::append_transition_impl(self, expected_version, expected_status, lead, entry).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::lead::lead_repository::test_utils::{
        create_test_lead, create_test_lead_models, minutes_after, test_engine, unique_tag,
    };
    use crate::test_helper::setup_test_context;
    use chrono::{TimeZone, Utc};
    use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
    use lead_core_db::repository::append_transition::{AppendTransition, TransitionConflict};
    use lead_core_db::repository::create_batch::CreateBatch;
    use lead_core_db::repository::load::Load;
    use lead_core_db::repository::load_history::LoadHistory;

    #[tokio::test]
    #[ignore]
    async fn test_append_transition_and_conflict() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let lead_repo = &ctx.lead_repos().lead_repository;
        let engine = test_engine();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        let lead = create_test_lead(&unique_tag(), start);
        let (model, history) = create_test_lead_models(&lead);
        lead_repo.create_batch(vec![model.clone()]).await?;
        lead_repo.create_batch(history).await?;

        let working = engine.apply_transition(&lead, "WORKING", Some("agent-1"), None, minutes_after(start, 1))?;
        let entry = StatusHistoryModel::from_entry(
            lead.id,
            1,
            working.last_transition().ok_or("missing entry")?,
            model.last_history_hash,
        )?;
        let working_model = LeadModel::from_lead(&working, entry.hash)?;
        lead_repo.append_transition(1, "PENDING", &working_model, &entry).await?;

        let stored_history = lead_repo.load_history(lead.id).await?;
        let stored = lead_repo.load(lead.id).await?.ok_or("lead vanished")?;
        assert_eq!(stored.version, 2);
        assert_eq!(stored.clone().into_lead(&stored_history)?, working);

        // A second transition computed from the stale PENDING state must lose
        let paid = engine.apply_transition(&lead, "PAID", Some("agent-2"), None, minutes_after(start, 2))?;
        let stale_entry = StatusHistoryModel::from_entry(
            lead.id,
            1,
            paid.last_transition().ok_or("missing entry")?,
            model.last_history_hash,
        )?;
        let paid_model = LeadModel::from_lead(&paid, stale_entry.hash)?;
        let error = lead_repo
            .append_transition(1, "PENDING", &paid_model, &stale_entry)
            .await
            .expect_err("stale transition must be rejected");

        assert_eq!(
            error.downcast_ref::<TransitionConflict>(),
            Some(&TransitionConflict { lead_id: lead.id, expected_version: 1 })
        );
        assert_eq!(lead_repo.load_history(lead.id).await?.len(), 2);

        Ok(())
    }
}
