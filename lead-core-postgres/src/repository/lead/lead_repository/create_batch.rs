use async_trait::async_trait;
use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
use lead_core_db::repository::create_batch::CreateBatch;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::LeadRepositoryImpl;

impl LeadRepositoryImpl {
    pub(super) async fn create_leads_impl(
        repo: &LeadRepositoryImpl,
        items: Vec<LeadModel>,
    ) -> Result<Vec<LeadModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO lead
                (id, first_name, last_name, email, phone, date_of_birth, address, application_type,
                 fields, status, version, last_history_hash, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(item.id)
            .bind(item.first_name.as_str())
            .bind(item.last_name.as_str())
            .bind(item.email.as_str())
            .bind(item.phone.as_str())
            .bind(item.date_of_birth)
            .bind(item.address.as_deref())
            .bind(item.application_type.as_deref())
            .bind(item.fields.clone())
            .bind(item.status.as_str())
            .bind(item.version)
            .bind(item.last_history_hash)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut **transaction)
            .await?;
        }

        Ok(items)
    }

    pub(super) async fn create_history_impl(
        repo: &LeadRepositoryImpl,
        items: Vec<StatusHistoryModel>,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        for item in &items {
            insert_history_row(item).execute(&mut **transaction).await?;
        }

        Ok(items)
    }
}

/// The insert shared by batch creation and transition commits.
pub(super) fn insert_history_row(
    item: &StatusHistoryModel,
) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO lead_status_history
        (id, lead_id, sequence, from_status, to_status, changed_at, changed_by, notes, antecedent_hash, hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(item.id)
    .bind(item.lead_id)
    .bind(item.sequence)
    .bind(item.from_status.as_deref())
    .bind(item.to_status.as_str())
    .bind(item.changed_at)
    .bind(item.changed_by.as_deref())
    .bind(item.notes.as_deref())
    .bind(item.antecedent_hash)
    .bind(item.hash)
}

#[async_trait]
impl CreateBatch<Postgres, LeadModel> for LeadRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<LeadModel>,
    ) -> Result<Vec<LeadModel>, Box<dyn Error + Send + Sync>> {
        Self::create_leads_impl(self, items).await
    }
}

#[async_trait]
impl CreateBatch<Postgres, StatusHistoryModel> for LeadRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<StatusHistoryModel>,
    ) -> Result<Vec<StatusHistoryModel>, Box<dyn Error + Send + Sync>> {
        Self::create_history_impl(self, items).await
    }
}
