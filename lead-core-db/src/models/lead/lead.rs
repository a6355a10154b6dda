use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use heapless::String as HeaplessString;
use lead_core_api::{ApiResult, Lead, LeadProfile, StatusId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ModelError;
use crate::models::identifiable::Identifiable;
use crate::models::lead::status_history::{
    verify_history_chain, StatusHistoryModel, STATUS_ID_MAX, TIMESTAMP_PRECISION,
};
use crate::utils::{to_char_bounded, to_heapless, to_optional_char_bounded, utf8_capacity};

/// Character limits of the `lead` profile columns
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const PHONE_MAX_CHARS: usize = 20;
pub const ADDRESS_MAX_CHARS: usize = 200;
pub const APPLICATION_TYPE_MAX_CHARS: usize = 50;

/// Database model for a lead
/// - `status` always equals the `to_status` of the newest history row.
/// - `version` counts the history rows; transitions update the row only when
///   the version they were computed from is still current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadModel {
    pub id: Uuid,
    pub first_name: HeaplessString<{ utf8_capacity(NAME_MAX_CHARS) }>,
    pub last_name: HeaplessString<{ utf8_capacity(NAME_MAX_CHARS) }>,
    pub email: HeaplessString<{ utf8_capacity(EMAIL_MAX_CHARS) }>,
    pub phone: HeaplessString<{ utf8_capacity(PHONE_MAX_CHARS) }>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<HeaplessString<{ utf8_capacity(ADDRESS_MAX_CHARS) }>>,
    pub application_type: Option<HeaplessString<{ utf8_capacity(APPLICATION_TYPE_MAX_CHARS) }>>,

    /// Dynamic intake answers as a JSON object
    pub fields: serde_json::Value,

    pub status: HeaplessString<STATUS_ID_MAX>,
    pub version: i64,

    /// Hash of the newest history row (0 while the lead has none)
    pub last_history_hash: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeadModel {
    pub fn from_lead(lead: &Lead, last_history_hash: i64) -> Result<Self, ModelError> {
        let profile = &lead.profile;
        let fields = serde_json::to_value(&profile.fields).map_err(|e| ModelError::Encoding {
            field: "fields",
            message: e.to_string(),
        })?;

        Ok(Self {
            id: lead.id,
            first_name: to_char_bounded(&profile.first_name, "first_name", NAME_MAX_CHARS)?,
            last_name: to_char_bounded(&profile.last_name, "last_name", NAME_MAX_CHARS)?,
            email: to_char_bounded(&profile.email, "email", EMAIL_MAX_CHARS)?,
            phone: to_char_bounded(&profile.phone, "phone", PHONE_MAX_CHARS)?,
            date_of_birth: profile.date_of_birth,
            address: to_optional_char_bounded(profile.address.as_deref(), "address", ADDRESS_MAX_CHARS)?,
            application_type: to_optional_char_bounded(
                profile.application_type.as_deref(),
                "application_type",
                APPLICATION_TYPE_MAX_CHARS,
            )?,
            fields,
            status: to_heapless(lead.status().as_str(), "status")?,
            version: lead.version(),
            last_history_hash,
            created_at: lead.created_at.trunc_subsecs(TIMESTAMP_PRECISION),
            updated_at: lead.updated_at.trunc_subsecs(TIMESTAMP_PRECISION),
        })
    }

    pub fn to_profile(&self) -> Result<LeadProfile, ModelError> {
        let fields: BTreeMap<String, String> = if self.fields.is_null() {
            BTreeMap::new()
        } else {
            serde_json::from_value(self.fields.clone()).map_err(|e| ModelError::Encoding {
                field: "fields",
                message: e.to_string(),
            })?
        };

        Ok(LeadProfile {
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            email: self.email.to_string(),
            phone: self.phone.to_string(),
            date_of_birth: self.date_of_birth,
            address: self.address.as_deref().map(str::to_string),
            application_type: self.application_type.as_deref().map(str::to_string),
            fields,
        })
    }

    /// Rebuilds the domain lead from this row and its complete history.
    ///
    /// The history must verify as an unbroken chain ending in
    /// `last_history_hash`, with one row per version.
    pub fn into_lead(self, history: &[StatusHistoryModel]) -> ApiResult<Lead> {
        verify_history_chain(self.id, history)?;

        let newest_hash = history.last().map(|entry| entry.hash).unwrap_or(0);
        if history.len() as i64 != self.version || newest_hash != self.last_history_hash {
            return Err(ModelError::HistoryOutOfSync {
                lead_id: self.id,
                version: self.version,
                entries: history.len(),
            }
            .into());
        }

        let profile = self.to_profile()?;
        Lead::from_parts(
            self.id,
            profile,
            StatusId::from(self.status.as_str()),
            history.iter().map(StatusHistoryModel::to_entry).collect(),
            self.created_at,
            self.updated_at,
        )
    }
}

impl Identifiable for LeadModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lead_core_api::{ApiError, CatalogueConfig, LifecycleEngine};
    use std::sync::Arc;

    fn engine() -> LifecycleEngine {
        LifecycleEngine::new(Arc::new(CatalogueConfig::default().into_catalogue().unwrap()))
    }

    fn sample_lead() -> Lead {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut profile = LeadProfile::new("Grace", "Hopper", "grace@example.com", "5550001111");
        profile.application_type = Some("Personal Injury".to_string());
        profile.fields.insert("incident_date".to_string(), "2024-04-02".to_string());

        let engine = engine();
        let lead = engine.create_lead(Uuid::new_v4(), profile, Some("intake-form"), t0);
        engine
            .apply_transition(&lead, "WORKING", Some("agent-3"), Some("first call"), t0 + chrono::Duration::hours(1))
            .unwrap()
    }

    #[test]
    fn test_lead_survives_persistence_shape() {
        let lead = sample_lead();
        let history = StatusHistoryModel::chain(lead.id, lead.status_history()).unwrap();
        let model = LeadModel::from_lead(&lead, history.last().unwrap().hash).unwrap();

        assert_eq!(model.version, 2);
        assert_eq!(model.status.as_str(), "WORKING");
        assert_eq!(model.into_lead(&history).unwrap(), lead);
    }

    #[test]
    fn test_history_behind_version_is_rejected() {
        let lead = sample_lead();
        let history = StatusHistoryModel::chain(lead.id, lead.status_history()).unwrap();
        let model = LeadModel::from_lead(&lead, history[0].hash).unwrap();

        let result = model.into_lead(&history[..1]);

        assert!(matches!(result, Err(ApiError::InternalError(_))));
    }

    #[test]
    fn test_overlong_phone_is_a_validation_error() {
        let mut lead = sample_lead();
        lead.profile.phone = "5".repeat(21);

        let result: ApiResult<LeadModel> = LeadModel::from_lead(&lead, 0).map_err(ApiError::from);

        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_non_ascii_names_fit_their_columns() {
        let mut lead = sample_lead();
        lead.profile.first_name = "é".repeat(30);
        lead.profile.last_name = "Ñúñez".repeat(10);
        assert!(validator::Validate::validate(&lead.profile).is_ok());

        let history = StatusHistoryModel::chain(lead.id, lead.status_history()).unwrap();
        let model = LeadModel::from_lead(&lead, history.last().unwrap().hash).unwrap();

        assert_eq!(model.first_name.chars().count(), 30);
        assert_eq!(model.into_lead(&history).unwrap(), lead);

        lead.profile.first_name = "é".repeat(51);
        assert_eq!(
            LeadModel::from_lead(&lead, 0),
            Err(ModelError::FieldTooLong { field: "first_name", max: 50 })
        );
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let lead = sample_lead();
        let mut model = LeadModel::from_lead(&lead, 0).unwrap();
        model.fields = serde_json::Value::Null;

        assert!(model.to_profile().unwrap().fields.is_empty());
    }
}
