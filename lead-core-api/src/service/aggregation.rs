use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::catalogue::{FunnelSelector, StatusCatalogue};
use crate::domain::lead::StatusSnapshot;
use crate::domain::status::{Bucket, StatusId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: StatusId,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub name: String,
    pub value: usize,
}

/// Non-fatal diagnostic: leads whose status is not in the catalogue.
///
/// Such leads count toward `total_count` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownStatusEncountered {
    pub status: String,
    pub occurrences: usize,
}

/// Bucketed view of one population snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_count: usize,

    /// Statuses with at least one lead, in catalogue registration order.
    /// Zero counts are omitted; see [`AggregateResult::status_distribution`]
    /// for the zero-filled view.
    pub per_status_count: Vec<StatusCount>,

    /// Always holds all three buckets
    pub per_bucket_count: BTreeMap<Bucket, usize>,

    pub funnel: Vec<FunnelStage>,

    /// Conversion count over total count, `0.0` for an empty population
    pub success_rate: f64,

    /// Unknown statuses in first-seen order
    pub diagnostics: Vec<UnknownStatusEncountered>,
}

/// One row per catalogue status, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub status: StatusId,
    pub color_token: String,
    pub count: usize,
    /// Fraction of `total_count`, in `[0, 1]`
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketShare {
    pub bucket: Bucket,
    pub count: usize,
    pub share: f64,
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

impl AggregateResult {
    pub fn status_count(&self, status: &str) -> usize {
        self.per_status_count
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }

    pub fn bucket_count(&self, bucket: Bucket) -> usize {
        self.per_bucket_count.get(&bucket).copied().unwrap_or(0)
    }

    /// Leads whose status resolved in the catalogue
    pub fn classified_count(&self) -> usize {
        self.per_status_count.iter().map(|entry| entry.count).sum()
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Every catalogue status in registration order, including those no lead
    /// is currently in.
    pub fn status_distribution(&self, catalogue: &StatusCatalogue) -> Vec<DistributionRow> {
        catalogue
            .definitions()
            .iter()
            .map(|definition| {
                let count = self.status_count(definition.id.as_str());
                DistributionRow {
                    status: definition.id.clone(),
                    color_token: definition.color_token.clone(),
                    count,
                    share: ratio(count, self.total_count),
                }
            })
            .collect()
    }

    /// [`status_distribution`](Self::status_distribution) sorted by count,
    /// largest first. Equal counts keep registration order.
    pub fn ranked_distribution(&self, catalogue: &StatusCatalogue) -> Vec<DistributionRow> {
        let mut rows = self.status_distribution(catalogue);
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    pub fn bucket_shares(&self) -> Vec<BucketShare> {
        Bucket::ALL
            .iter()
            .map(|bucket| {
                let count = self.bucket_count(*bucket);
                BucketShare {
                    bucket: *bucket,
                    count,
                    share: ratio(count, self.total_count),
                }
            })
            .collect()
    }
}

/// Counts a population snapshot by status, bucket and funnel stage.
///
/// Only the current status of each lead is read. The result is rebuilt from
/// scratch on every call.
pub fn aggregate<I>(catalogue: &StatusCatalogue, leads: I) -> AggregateResult
where
    I: IntoIterator,
    I::Item: StatusSnapshot,
{
    let mut counts = vec![0usize; catalogue.len()];
    let mut unknown: Vec<UnknownStatusEncountered> = Vec::new();
    let mut unknown_index: HashMap<String, usize> = HashMap::new();
    let mut total_count = 0usize;

    for lead in leads {
        total_count += 1;
        let status = lead.current_status();
        match catalogue.position(status) {
            Some(position) => counts[position] += 1,
            None => match unknown_index.get(status) {
                Some(&index) => unknown[index].occurrences += 1,
                None => {
                    unknown_index.insert(status.to_string(), unknown.len());
                    unknown.push(UnknownStatusEncountered {
                        status: status.to_string(),
                        occurrences: 1,
                    });
                }
            },
        }
    }

    let mut per_bucket_count: BTreeMap<Bucket, usize> =
        Bucket::ALL.iter().map(|bucket| (*bucket, 0)).collect();
    let mut per_status_count = Vec::new();
    for (position, (&count, status)) in counts.iter().zip(catalogue.all_ids()).enumerate() {
        if count == 0 {
            continue;
        }
        for bucket in catalogue.buckets_at(position) {
            *per_bucket_count.entry(*bucket).or_insert(0) += count;
        }
        per_status_count.push(StatusCount {
            status: status.clone(),
            count,
        });
    }

    let funnel = catalogue
        .funnel_stages()
        .iter()
        .map(|stage| FunnelStage {
            name: stage.name.clone(),
            value: match &stage.selector {
                FunnelSelector::Total => total_count,
                FunnelSelector::Bucket(bucket) => per_bucket_count.get(bucket).copied().unwrap_or(0),
                FunnelSelector::Status(status) => catalogue
                    .position(status.as_str())
                    .map_or(0, |position| counts[position]),
            },
        })
        .collect();

    let success_rate = ratio(
        per_bucket_count.get(&Bucket::Conversion).copied().unwrap_or(0),
        total_count,
    );

    for diagnostic in &unknown {
        tracing::warn!(
            status = %diagnostic.status,
            occurrences = diagnostic.occurrences,
            "lead status not found in catalogue; excluded from bucket metrics"
        );
    }

    AggregateResult {
        total_count,
        per_status_count,
        per_bucket_count,
        funnel,
        success_rate,
        diagnostics: unknown,
    }
}
