use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};
use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

/// Repository over the `lead` and `lead_status_history` tables.
///
/// Every statement runs in the executor's transaction.
pub struct LeadRepositoryImpl {
    pub executor: Executor,
}

impl LeadRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for LeadModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(LeadModel {
            id: row.try_get("id")?,
            first_name: get_heapless_string(row, "first_name")?,
            last_name: get_heapless_string(row, "last_name")?,
            email: get_heapless_string(row, "email")?,
            phone: get_heapless_string(row, "phone")?,
            date_of_birth: row.try_get("date_of_birth")?,
            address: get_optional_heapless_string(row, "address")?,
            application_type: get_optional_heapless_string(row, "application_type")?,
            fields: row.try_get("fields")?,
            status: get_heapless_string(row, "status")?,
            version: row.try_get("version")?,
            last_history_hash: row.try_get("last_history_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for StatusHistoryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(StatusHistoryModel {
            id: row.try_get("id")?,
            lead_id: row.try_get("lead_id")?,
            sequence: row.try_get("sequence")?,
            from_status: get_optional_heapless_string(row, "from_status")?,
            to_status: get_heapless_string(row, "to_status")?,
            changed_at: row.try_get("changed_at")?,
            changed_by: get_optional_heapless_string(row, "changed_by")?,
            notes: row.try_get("notes")?,
            antecedent_hash: row.try_get("antecedent_hash")?,
            hash: row.try_get("hash")?,
        })
    }
}
