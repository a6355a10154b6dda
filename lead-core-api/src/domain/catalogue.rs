use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::status::{Bucket, StatusDefinition, StatusId};
use crate::error::{ApiError, ApiResult, CatalogueError};

/// What a funnel stage counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelSelector {
    /// Every lead of the population (the entry stage)
    Total,
    /// Leads whose status belongs to the bucket
    Bucket(Bucket),
    /// Leads currently in exactly this status
    Status(StatusId),
}

/// A named funnel stage, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStageDefinition {
    pub name: String,
    pub selector: FunnelSelector,
}

impl FunnelStageDefinition {
    pub fn new(name: impl Into<String>, selector: FunnelSelector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }
}

/// Funnel used when a configuration declares none. Only refers to buckets,
/// so it is valid for every catalogue.
pub fn fallback_funnel_stages() -> Vec<FunnelStageDefinition> {
    vec![
        FunnelStageDefinition::new("Total Ingested", FunnelSelector::Total),
        FunnelStageDefinition::new("In Pipeline", FunnelSelector::Bucket(Bucket::Pipeline)),
        FunnelStageDefinition::new("Converted", FunnelSelector::Bucket(Bucket::Conversion)),
    ]
}

/// Validated, read-only registry of lead statuses and their bucket membership.
///
/// Built once at startup and shared (typically behind an `Arc`) by every
/// engine instance. There is no way to mutate a catalogue after construction.
#[derive(Debug, Clone)]
pub struct StatusCatalogue {
    definitions: Vec<StatusDefinition>,
    positions: HashMap<StatusId, usize>,
    bucket_members: BTreeMap<Bucket, Vec<StatusId>>,
    /// Reverse index, aligned with `definitions`
    buckets_by_position: Vec<BTreeSet<Bucket>>,
    initial_status: StatusId,
    funnel_stages: Vec<FunnelStageDefinition>,
}

impl StatusCatalogue {
    /// Validates the tables and builds the lookup indices.
    ///
    /// # Arguments
    /// * `definitions` - Statuses in registration order
    /// * `buckets` - Bucket membership; members are deduplicated within a bucket
    /// * `initial_status` - Status for new leads, defaults to the first definition
    /// * `funnel_stages` - Declared funnel; empty means [`fallback_funnel_stages`]
    ///
    /// # Returns
    /// * `Err(CatalogueError)` - on an empty catalogue, a duplicate id, or any
    ///   reference (bucket member, initial status, funnel stage) to an unregistered id
    pub fn new(
        definitions: Vec<StatusDefinition>,
        buckets: BTreeMap<Bucket, Vec<StatusId>>,
        initial_status: Option<StatusId>,
        funnel_stages: Vec<FunnelStageDefinition>,
    ) -> Result<Self, CatalogueError> {
        if definitions.is_empty() {
            return Err(CatalogueError::EmptyCatalogue);
        }

        let mut positions = HashMap::with_capacity(definitions.len());
        for (position, definition) in definitions.iter().enumerate() {
            if positions.insert(definition.id.clone(), position).is_some() {
                return Err(CatalogueError::DuplicateStatus(definition.id.to_string()));
            }
        }

        let mut buckets_by_position = vec![BTreeSet::new(); definitions.len()];
        let mut bucket_members = BTreeMap::new();
        for (bucket, members) in buckets {
            let mut unique: Vec<StatusId> = Vec::with_capacity(members.len());
            for status in members {
                let position = *positions.get(&status).ok_or_else(|| {
                    CatalogueError::UnknownBucketMember {
                        bucket,
                        status: status.to_string(),
                    }
                })?;
                if buckets_by_position[position].insert(bucket) {
                    unique.push(status);
                }
            }
            bucket_members.insert(bucket, unique);
        }

        let initial_status = match initial_status {
            Some(status) if positions.contains_key(&status) => status,
            Some(status) => return Err(CatalogueError::UnknownInitialStatus(status.to_string())),
            None => definitions[0].id.clone(),
        };

        let funnel_stages = if funnel_stages.is_empty() {
            fallback_funnel_stages()
        } else {
            funnel_stages
        };
        for stage in &funnel_stages {
            if let FunnelSelector::Status(status) = &stage.selector {
                if !positions.contains_key(status) {
                    return Err(CatalogueError::UnknownFunnelStatus {
                        stage: stage.name.clone(),
                        status: status.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            definitions,
            positions,
            bucket_members,
            buckets_by_position,
            initial_status,
            funnel_stages,
        })
    }

    pub fn get(&self, id: &str) -> ApiResult<&StatusDefinition> {
        self.position(id)
            .map(|position| &self.definitions[position])
            .ok_or_else(|| ApiError::UnknownStatus(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Registration-order position of a status
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// All ids in registration order
    pub fn all_ids(&self) -> impl ExactSizeIterator<Item = &StatusId> + '_ {
        self.definitions.iter().map(|definition| &definition.id)
    }

    pub fn definitions(&self) -> &[StatusDefinition] {
        &self.definitions
    }

    /// Every bucket containing `id`; the set is empty for unbucketed statuses.
    pub fn bucket_of(&self, id: &str) -> ApiResult<&BTreeSet<Bucket>> {
        self.position(id)
            .map(|position| &self.buckets_by_position[position])
            .ok_or_else(|| ApiError::UnknownStatus(id.to_string()))
    }

    pub(crate) fn buckets_at(&self, position: usize) -> &BTreeSet<Bucket> {
        &self.buckets_by_position[position]
    }

    /// Members of `bucket` in configuration order
    pub fn bucket_members(&self, bucket: Bucket) -> &[StatusId] {
        self.bucket_members
            .get(&bucket)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn initial_status(&self) -> &StatusId {
        &self.initial_status
    }

    pub fn funnel_stages(&self) -> &[FunnelStageDefinition] {
        &self.funnel_stages
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions(ids: &[&str]) -> Vec<StatusDefinition> {
        ids.iter()
            .map(|id| StatusDefinition::new(*id, "#737373", format!("{id} status")))
            .collect()
    }

    fn buckets(entries: &[(Bucket, &[&str])]) -> BTreeMap<Bucket, Vec<StatusId>> {
        entries
            .iter()
            .map(|(bucket, ids)| (*bucket, ids.iter().map(|id| StatusId::new(*id)).collect()))
            .collect()
    }

    #[test]
    fn test_get_and_all_ids_follow_registration_order() {
        let catalogue = StatusCatalogue::new(
            definitions(&["PENDING", "WORKING", "PAID"]),
            BTreeMap::new(),
            None,
            vec![],
        )
        .unwrap();

        let ids: Vec<&str> = catalogue.all_ids().map(StatusId::as_str).collect();
        assert_eq!(ids, vec!["PENDING", "WORKING", "PAID"]);
        assert_eq!(catalogue.get("WORKING").unwrap().description, "WORKING status");
        assert_eq!(catalogue.initial_status(), "PENDING");
        assert_eq!(
            catalogue.get("NOT_A_STATUS"),
            Err(ApiError::UnknownStatus("NOT_A_STATUS".to_string()))
        );
    }

    #[test]
    fn test_bucket_of_uses_reverse_index() {
        let catalogue = StatusCatalogue::new(
            definitions(&["PENDING", "WORKING", "PAID", "ODD"]),
            buckets(&[
                (Bucket::Pipeline, &["WORKING", "ODD"][..]),
                (Bucket::Risk, &["ODD"][..]),
                (Bucket::Conversion, &["PAID"][..]),
            ]),
            None,
            vec![],
        )
        .unwrap();

        assert!(catalogue.bucket_of("PENDING").unwrap().is_empty());
        assert_eq!(
            catalogue.bucket_of("ODD").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![Bucket::Pipeline, Bucket::Risk]
        );
        assert!(matches!(catalogue.bucket_of("GONE"), Err(ApiError::UnknownStatus(_))));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let result = StatusCatalogue::new(
            definitions(&["PENDING", "PAID", "PENDING"]),
            BTreeMap::new(),
            None,
            vec![],
        );
        assert_eq!(result.unwrap_err(), CatalogueError::DuplicateStatus("PENDING".to_string()));
    }

    #[test]
    fn test_bucket_with_unregistered_member_is_rejected() {
        let result = StatusCatalogue::new(
            definitions(&["PENDING"]),
            buckets(&[(Bucket::Conversion, &["PAID"][..])]),
            None,
            vec![],
        );
        assert_eq!(
            result.unwrap_err(),
            CatalogueError::UnknownBucketMember {
                bucket: Bucket::Conversion,
                status: "PAID".to_string()
            }
        );
    }

    #[test]
    fn test_empty_catalogue_is_rejected() {
        let result = StatusCatalogue::new(vec![], BTreeMap::new(), None, vec![]);
        assert_eq!(result.unwrap_err(), CatalogueError::EmptyCatalogue);
    }

    #[test]
    fn test_initial_status_must_be_registered() {
        let result = StatusCatalogue::new(
            definitions(&["PENDING"]),
            BTreeMap::new(),
            Some(StatusId::new("NEW")),
            vec![],
        );
        assert_eq!(result.unwrap_err(), CatalogueError::UnknownInitialStatus("NEW".to_string()));
    }

    #[test]
    fn test_funnel_status_stage_must_be_registered() {
        let result = StatusCatalogue::new(
            definitions(&["PENDING"]),
            BTreeMap::new(),
            None,
            vec![FunnelStageDefinition::new("Paid", FunnelSelector::Status(StatusId::new("PAID")))],
        );
        assert!(matches!(result, Err(CatalogueError::UnknownFunnelStatus { .. })));
    }

    #[test]
    fn test_bucket_members_are_deduplicated() {
        let catalogue = StatusCatalogue::new(
            definitions(&["WORKING", "QC"]),
            buckets(&[(Bucket::Pipeline, &["WORKING", "QC", "WORKING"][..])]),
            None,
            vec![],
        )
        .unwrap();

        assert_eq!(catalogue.bucket_members(Bucket::Pipeline).len(), 2);
        assert!(catalogue.bucket_members(Bucket::Risk).is_empty());
        assert_eq!(catalogue.funnel_stages(), fallback_funnel_stages().as_slice());
    }
}
