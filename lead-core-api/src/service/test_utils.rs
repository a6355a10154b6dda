use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::domain::catalogue::StatusCatalogue;
use crate::domain::config::CatalogueConfig;
use crate::domain::lead::LeadProfile;
use crate::domain::status::{Bucket, StatusDefinition, StatusId};

/// PENDING, WORKING, VERIFIED, PAID with PIPELINE={WORKING} and
/// CONVERSION={VERIFIED, PAID}; RISK is left empty.
pub fn scenario_catalogue() -> StatusCatalogue {
    let mut buckets = BTreeMap::new();
    buckets.insert(Bucket::Pipeline, vec![StatusId::new("WORKING")]);
    buckets.insert(
        Bucket::Conversion,
        vec![StatusId::new("VERIFIED"), StatusId::new("PAID")],
    );

    CatalogueConfig {
        statuses: vec![
            StatusDefinition::new("PENDING", "#f59e0b", "Awaiting initial system review"),
            StatusDefinition::new("WORKING", "#3b82f6", "Active pipeline progression"),
            StatusDefinition::new("VERIFIED", "#10b981", "Data points fully validated"),
            StatusDefinition::new("PAID", "#8b5cf6", "Revenue transaction complete"),
        ],
        buckets,
        initial_status: None,
        funnel: vec![],
    }
    .into_catalogue()
    .expect("scenario catalogue is valid")
}

pub fn test_profile() -> LeadProfile {
    LeadProfile::new("Ada", "Lovelace", "ada@example.com", "5551234567")
}

/// Seconds after a fixed epoch
pub fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::seconds(seconds)
}
