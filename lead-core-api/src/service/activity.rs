use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lead::Lead;
use crate::domain::status::StatusId;

/// A history entry lifted out of its lead for the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub lead_id: Uuid,
    pub lead_name: String,
    /// Position of the entry in the lead's history
    pub sequence: usize,
    pub from_status: Option<StatusId>,
    pub to_status: StatusId,
    pub timestamp: DateTime<Utc>,
    pub changed_by: Option<String>,
}

/// The `limit` most recent transitions across `leads`, newest first.
///
/// Entries with the same timestamp are ordered by lead id, then by their
/// position in the lead's history (later first), so the feed is stable.
pub fn recent_activity<'a, I>(leads: I, limit: usize) -> Vec<ActivityItem>
where
    I: IntoIterator<Item = &'a Lead>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut items: Vec<ActivityItem> = leads
        .into_iter()
        .flat_map(|lead| {
            let lead_name = lead.profile.display_name();
            lead.status_history()
                .iter()
                .enumerate()
                .map(move |(sequence, entry)| ActivityItem {
                    lead_id: lead.id,
                    lead_name: lead_name.clone(),
                    sequence,
                    from_status: entry.from_status.clone(),
                    to_status: entry.to_status.clone(),
                    timestamp: entry.timestamp,
                    changed_by: entry.changed_by.clone(),
                })
        })
        .collect();

    items.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.lead_id.cmp(&b.lead_id))
            .then_with(|| b.sequence.cmp(&a.sequence))
    });
    items.truncate(limit);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::engine::LifecycleEngine;
    use crate::service::test_utils::{scenario_catalogue, test_profile, ts};
    use std::sync::Arc;

    #[test]
    fn test_recent_activity_is_newest_first_and_limited() {
        let engine = LifecycleEngine::new(Arc::new(scenario_catalogue()));
        let first = engine.create_lead(Uuid::new_v4(), test_profile(), None, ts(0));
        let first = engine.apply_transition(&first, "WORKING", Some("agent-1"), None, ts(30)).unwrap();
        let second = engine.create_lead(Uuid::new_v4(), test_profile(), None, ts(10));
        let second = engine.apply_transition(&second, "PAID", Some("agent-2"), None, ts(20)).unwrap();

        let feed = recent_activity([&first, &second], 3);

        let view: Vec<(&str, DateTime<Utc>)> = feed
            .iter()
            .map(|item| (item.to_status.as_str(), item.timestamp))
            .collect();
        assert_eq!(view, vec![("WORKING", ts(30)), ("PAID", ts(20)), ("PENDING", ts(10))]);
        assert_eq!(feed[0].changed_by.as_deref(), Some("agent-1"));
        assert_eq!(feed[0].lead_name, "Ada Lovelace");
    }

    #[test]
    fn test_same_instant_entries_prefer_later_sequence() {
        let engine = LifecycleEngine::new(Arc::new(scenario_catalogue()));
        let lead = engine.create_lead(Uuid::new_v4(), test_profile(), None, ts(0));
        let lead = engine.apply_transition(&lead, "WORKING", None, None, ts(0)).unwrap();

        let feed = recent_activity([&lead], 10);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].sequence, 1);
        assert_eq!(feed[1].sequence, 0);
    }

    #[test]
    fn test_zero_limit_yields_nothing() {
        let engine = LifecycleEngine::new(Arc::new(scenario_catalogue()));
        let lead = engine.create_lead(Uuid::new_v4(), test_profile(), None, ts(0));

        assert!(recent_activity([&lead], 0).is_empty());
    }
}
