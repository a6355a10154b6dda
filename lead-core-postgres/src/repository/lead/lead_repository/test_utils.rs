use chrono::{DateTime, Duration, Utc};
use lead_core_api::{CatalogueConfig, Lead, LeadProfile, LifecycleEngine};
use lead_core_db::models::lead::{LeadModel, StatusHistoryModel};
use std::sync::Arc;
use uuid::Uuid;

pub fn test_engine() -> LifecycleEngine {
    LifecycleEngine::new(Arc::new(
        CatalogueConfig::default().into_catalogue().unwrap(),
    ))
}

/// A profile whose email carries `tag`, so searches can isolate rows of one test
pub fn create_test_profile(tag: &str) -> LeadProfile {
    LeadProfile::new("Test", "Lead", format!("lead-{tag}@example.com"), "5550001234")
}

pub fn create_test_lead(tag: &str, created_at: DateTime<Utc>) -> Lead {
    test_engine().create_lead(Uuid::new_v4(), create_test_profile(tag), Some("test"), created_at)
}

/// Lead row and history rows ready for `create_batch`
pub fn create_test_lead_models(lead: &Lead) -> (LeadModel, Vec<StatusHistoryModel>) {
    let history = StatusHistoryModel::chain(lead.id, lead.status_history()).unwrap();
    let last_hash = history.last().map(|entry| entry.hash).unwrap_or(0);
    (LeadModel::from_lead(lead, last_hash).unwrap(), history)
}

pub fn minutes_after(start: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    start + Duration::minutes(minutes)
}

pub fn unique_tag() -> String {
    Uuid::new_v4().simple().to_string()
}
