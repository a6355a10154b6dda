use chrono::{DateTime, SubsecRound, Utc};
use heapless::String as HeaplessString;
use lead_core_api::{StatusHistoryEntry, StatusId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;
use crate::models::identifiable::Identifiable;
use crate::utils::{hash_as_i64, to_heapless, to_optional_heapless};

/// Upper bound of a stored status identifier
pub const STATUS_ID_MAX: usize = 50;

/// Fractional-second digits kept by Postgres `TIMESTAMPTZ`; hashed timestamps
/// are truncated to it so a hash recomputed after a reload still matches.
pub const TIMESTAMP_PRECISION: u16 = 6;

/// # Documentation
/// One row of `lead_status_history`.
/// - Rows are only ever inserted; `sequence` is the zero-based position in the lead's history.
/// - Each row carries the hash of its predecessor, so any edit or reordering of stored
///   history breaks the chain and is reported by [`verify_history_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryModel {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub sequence: i32,

    /// `None` only for the entry written at intake
    pub from_status: Option<HeaplessString<STATUS_ID_MAX>>,
    pub to_status: HeaplessString<STATUS_ID_MAX>,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<HeaplessString<100>>,
    pub notes: Option<String>,

    /// Hash of the previous entry of the same lead (0 for the first entry)
    pub antecedent_hash: i64,

    /// Hash of the entry with hash field set to 0
    pub hash: i64,
}

impl StatusHistoryModel {
    /// Builds the row for `entry` at `sequence`, linked to `antecedent_hash`.
    pub fn from_entry(
        lead_id: Uuid,
        sequence: i32,
        entry: &StatusHistoryEntry,
        antecedent_hash: i64,
    ) -> Result<Self, ModelError> {
        let mut model = Self {
            id: Uuid::new_v4(),
            lead_id,
            sequence,
            from_status: to_optional_heapless(
                entry.from_status.as_ref().map(StatusId::as_str),
                "from_status",
            )?,
            to_status: to_heapless(entry.to_status.as_str(), "to_status")?,
            changed_at: entry.timestamp.trunc_subsecs(TIMESTAMP_PRECISION),
            changed_by: to_optional_heapless(entry.changed_by.as_deref(), "changed_by")?,
            notes: entry.notes.clone(),
            antecedent_hash,
            hash: 0,
        };
        model.hash = model.compute_hash()?;
        Ok(model)
    }

    /// Rows for a complete history, starting a fresh chain.
    pub fn chain(lead_id: Uuid, entries: &[StatusHistoryEntry]) -> Result<Vec<Self>, ModelError> {
        let mut models = Vec::with_capacity(entries.len());
        let mut antecedent_hash = 0;
        for (sequence, entry) in entries.iter().enumerate() {
            let model = Self::from_entry(lead_id, sequence as i32, entry, antecedent_hash)?;
            antecedent_hash = model.hash;
            models.push(model);
        }
        Ok(models)
    }

    pub fn compute_hash(&self) -> Result<i64, ModelError> {
        let mut for_hashing = self.clone();
        for_hashing.hash = 0;
        hash_as_i64(&for_hashing).map_err(ModelError::Hash)
    }

    pub fn to_entry(&self) -> StatusHistoryEntry {
        StatusHistoryEntry {
            from_status: self.from_status.as_deref().map(StatusId::from),
            to_status: StatusId::from(self.to_status.as_str()),
            timestamp: self.changed_at,
            changed_by: self.changed_by.as_deref().map(str::to_string),
            notes: self.notes.clone(),
        }
    }
}

impl Identifiable for StatusHistoryModel {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// Checks that `history` is the complete, untampered history of `lead_id`,
/// ordered by sequence.
pub fn verify_history_chain(lead_id: Uuid, history: &[StatusHistoryModel]) -> Result<(), ModelError> {
    let mut antecedent_hash = 0;
    for (index, entry) in history.iter().enumerate() {
        let broken = |reason| ModelError::BrokenHistoryChain {
            lead_id,
            sequence: entry.sequence,
            reason,
        };

        if entry.lead_id != lead_id {
            return Err(broken("entry belongs to another lead"));
        }
        if entry.sequence != index as i32 {
            return Err(broken("sequence has a gap"));
        }
        if entry.antecedent_hash != antecedent_hash {
            return Err(broken("antecedent hash does not match the previous entry"));
        }
        if entry.compute_hash()? != entry.hash {
            return Err(broken("entry content does not match its hash"));
        }
        antecedent_hash = entry.hash;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entries() -> Vec<StatusHistoryEntry> {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        vec![
            StatusHistoryEntry {
                from_status: None,
                to_status: StatusId::new("PENDING"),
                timestamp: t0,
                changed_by: Some("intake-form".to_string()),
                notes: None,
            },
            StatusHistoryEntry {
                from_status: Some(StatusId::new("PENDING")),
                to_status: StatusId::new("WORKING"),
                timestamp: t0 + chrono::Duration::minutes(5),
                changed_by: Some("agent-7".to_string()),
                notes: Some("called back".to_string()),
            },
        ]
    }

    #[test]
    fn test_chain_links_entries() {
        let lead_id = Uuid::new_v4();

        let chain = StatusHistoryModel::chain(lead_id, &entries()).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].antecedent_hash, 0);
        assert_eq!(chain[1].antecedent_hash, chain[0].hash);
        assert_eq!(chain[1].sequence, 1);
        assert!(verify_history_chain(lead_id, &chain).is_ok());
        assert_eq!(
            chain.iter().map(StatusHistoryModel::to_entry).collect::<Vec<_>>(),
            entries()
        );
    }

    #[test]
    fn test_tampered_notes_are_detected() {
        let lead_id = Uuid::new_v4();
        let mut chain = StatusHistoryModel::chain(lead_id, &entries()).unwrap();
        chain[1].notes = Some("never called".to_string());

        let result = verify_history_chain(lead_id, &chain);

        assert!(matches!(
            result,
            Err(ModelError::BrokenHistoryChain { sequence: 1, reason: "entry content does not match its hash", .. })
        ));
    }

    #[test]
    fn test_missing_entry_is_detected() {
        let lead_id = Uuid::new_v4();
        let chain = StatusHistoryModel::chain(lead_id, &entries()).unwrap();

        let result = verify_history_chain(lead_id, &chain[1..]);

        assert!(matches!(result, Err(ModelError::BrokenHistoryChain { reason: "sequence has a gap", .. })));
    }

    #[test]
    fn test_changed_at_is_stored_at_microsecond_precision() {
        let mut entry = entries().remove(0);
        entry.timestamp = entry.timestamp + chrono::Duration::nanoseconds(1_234_567);

        let model = StatusHistoryModel::from_entry(Uuid::new_v4(), 0, &entry, 0).unwrap();

        assert_eq!(model.changed_at.timestamp_subsec_nanos(), 1_234_000);
    }

    #[test]
    fn test_overlong_actor_is_rejected() {
        let mut entry = entries().remove(0);
        entry.changed_by = Some("x".repeat(101));

        let result = StatusHistoryModel::from_entry(Uuid::new_v4(), 0, &entry, 0);

        assert_eq!(result, Err(ModelError::FieldTooLong { field: "changed_by", max: 100 }));
    }
}
