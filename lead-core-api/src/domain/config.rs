use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::catalogue::{FunnelSelector, FunnelStageDefinition, StatusCatalogue};
use crate::domain::status::{Bucket, StatusDefinition, StatusId};
use crate::error::CatalogueError;

/// Environment variable naming a JSON catalogue file
pub const CATALOGUE_PATH_ENV: &str = "LEAD_STATUS_CATALOGUE";

/// Serialized form of the status catalogue.
///
/// ```json
/// {
///   "statuses": [{ "id": "PENDING", "color_token": "#f59e0b", "description": "..." }],
///   "buckets": { "PIPELINE": ["WORKING"] },
///   "initial_status": "PENDING",
///   "funnel": [{ "name": "Total Ingested", "selector": "total" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueConfig {
    pub statuses: Vec<StatusDefinition>,
    #[serde(default)]
    pub buckets: BTreeMap<Bucket, Vec<StatusId>>,
    #[serde(default)]
    pub initial_status: Option<StatusId>,
    #[serde(default)]
    pub funnel: Vec<FunnelStageDefinition>,
}

impl CatalogueConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        serde_json::from_str(json).map_err(|e| CatalogueError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CatalogueError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Reads the file named by `LEAD_STATUS_CATALOGUE`, or falls back to the
    /// built-in dashboard catalogue when the variable is unset.
    pub fn from_env() -> Result<Self, CatalogueError> {
        match std::env::var(CATALOGUE_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "loading status catalogue from file");
                Self::from_path(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Validates the configuration and builds the catalogue.
    pub fn into_catalogue(self) -> Result<StatusCatalogue, CatalogueError> {
        StatusCatalogue::new(self.statuses, self.buckets, self.initial_status, self.funnel)
    }
}

const DEFAULT_STATUSES: [(&str, &str, &str); 23] = [
    ("PENDING", "#f59e0b", "Awaiting initial system review"),
    ("REJECTED", "#ef4444", "Disqualified lead parameters"),
    ("VERIFIED", "#10b981", "Data points fully validated"),
    ("REJECTED_BY_CLIENT", "#f97316", "External client rejection"),
    ("PAID", "#8b5cf6", "Revenue transaction complete"),
    ("DUPLICATE", "#a855f7", "Redundant entry detected"),
    ("NOT_RESPONDING", "#737373", "Communication attempts failed"),
    ("FELONY", "#dc2626", "Legal eligibility restriction"),
    ("DEAD_LEAD", "#404040", "Lead non-conversion state"),
    ("WORKING", "#3b82f6", "Active pipeline progression"),
    ("CALL_BACK", "#06b6d4", "Scheduled follow-up sequence"),
    ("ATTEMPT_1", "#6366f1", "Initial outreach attempt"),
    ("ATTEMPT_2", "#4f46e5", "Secondary contact phase"),
    ("ATTEMPT_3", "#4338ca", "Tertiary contact phase"),
    ("ATTEMPT_4", "#3730a3", "Final outreach protocol"),
    ("CHARGEBACK", "#be123c", "Financial reversal alert"),
    ("WAITING_ID", "#d97706", "Pending identity documents"),
    ("SENT_CLIENT", "#059669", "Transferred to client portal"),
    ("QC", "#7c3aed", "Quality assurance evaluation"),
    ("ID_VERIFIED", "#16a34a", "Confirmed identity status"),
    ("BILLABLE", "#10b981", "Validated for invoicing"),
    ("CAMPAIGN_PAUSED", "#737373", "Active campaign on hold"),
    ("SENT_TO_LAW_FIRM", "#8b5cf6", "Transferred to legal council"),
];

const PIPELINE_STATUSES: [&str; 7] = [
    "WORKING", "QC", "ATTEMPT_1", "ATTEMPT_2", "ATTEMPT_3", "ATTEMPT_4", "CALL_BACK",
];

const CONVERSION_STATUSES: [&str; 6] = [
    "VERIFIED", "ID_VERIFIED", "SENT_CLIENT", "PAID", "BILLABLE", "SENT_TO_LAW_FIRM",
];

const RISK_STATUSES: [&str; 7] = [
    "REJECTED", "REJECTED_BY_CLIENT", "DUPLICATE", "NOT_RESPONDING", "FELONY", "DEAD_LEAD", "CHARGEBACK",
];

fn status_ids(ids: &[&str]) -> Vec<StatusId> {
    ids.iter().map(|id| StatusId::new(*id)).collect()
}

impl Default for CatalogueConfig {
    /// The dashboard's built-in registry
    fn default() -> Self {
        let statuses = DEFAULT_STATUSES
            .iter()
            .map(|(id, color, description)| StatusDefinition::new(*id, *color, *description))
            .collect();

        let mut buckets = BTreeMap::new();
        buckets.insert(Bucket::Pipeline, status_ids(&PIPELINE_STATUSES));
        buckets.insert(Bucket::Conversion, status_ids(&CONVERSION_STATUSES));
        buckets.insert(Bucket::Risk, status_ids(&RISK_STATUSES));

        let funnel = vec![
            FunnelStageDefinition::new("Total Ingested", FunnelSelector::Total),
            FunnelStageDefinition::new("In Pipeline", FunnelSelector::Bucket(Bucket::Pipeline)),
            FunnelStageDefinition::new("Verified", FunnelSelector::Status(StatusId::new("VERIFIED"))),
            FunnelStageDefinition::new("Paid Closures", FunnelSelector::Status(StatusId::new("PAID"))),
        ];

        Self {
            statuses,
            buckets,
            initial_status: Some(StatusId::new("PENDING")),
            funnel,
        }
    }
}
