use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::domain::status::StatusId;
use crate::error::{ApiError, ApiResult};

/// Contact and case details captured at intake.
///
/// The lifecycle engine never reads these fields; they travel with the lead
/// so the persistence and presentation layers have a single aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LeadProfile {
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"), length(max = 100))]
    pub email: String,

    #[validate(length(min = 10, max = 20, message = "Phone number must be at least 10 digits"))]
    pub phone: String,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 200))]
    pub address: Option<String>,

    /// Case category selecting which dynamic fields apply
    #[validate(length(max = 50))]
    pub application_type: Option<String>,

    /// Free-form answers keyed by dynamic field name
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl LeadProfile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            date_of_birth: None,
            address: None,
            application_type: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One applied transition. Written once and never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// `None` only for the entry seeded at creation
    pub from_status: Option<StatusId>,
    pub to_status: StatusId,
    pub timestamp: DateTime<Utc>,
    /// Actor identifier; `None` means the system
    pub changed_by: Option<String>,
    pub notes: Option<String>,
}

/// A lead and its append-only status history.
///
/// `status` and `status_history` are only reachable through accessors: the
/// lifecycle engine is the one place that produces a lead with a new status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub profile: LeadProfile,
    status: StatusId,
    status_history: Vec<StatusHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// A lead in `status` with no recorded history yet.
    pub fn new(id: Uuid, profile: LeadProfile, status: StatusId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            profile,
            status,
            status_history: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Rehydrates a stored lead, checking the history is ordered and agrees
    /// with the current status.
    pub fn from_parts(
        id: Uuid,
        profile: LeadProfile,
        status: StatusId,
        status_history: Vec<StatusHistoryEntry>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> ApiResult<Self> {
        if let Some(last) = status_history.last() {
            if last.to_status != status {
                return Err(ApiError::InternalError(format!(
                    "lead {id} has status {status} but its history ends in {}",
                    last.to_status
                )));
            }
        }
        if status_history
            .windows(2)
            .any(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ApiError::InternalError(format!(
                "lead {id} has a history that is not in chronological order"
            )));
        }

        Ok(Self {
            id,
            profile,
            status,
            status_history,
            created_at,
            updated_at,
        })
    }

    pub fn status(&self) -> &StatusId {
        &self.status
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry] {
        &self.status_history
    }

    pub fn last_transition(&self) -> Option<&StatusHistoryEntry> {
        self.status_history.last()
    }

    /// Number of recorded transitions, used as the optimistic concurrency token
    pub fn version(&self) -> i64 {
        self.status_history.len() as i64
    }

    /// Returns a copy with `entry` appended and the status moved to its target.
    pub(crate) fn with_entry(&self, entry: StatusHistoryEntry) -> Self {
        let mut next = self.clone();
        next.status = entry.to_status.clone();
        next.updated_at = entry.timestamp;
        next.status_history.push(entry);
        next
    }
}

/// Anything the aggregation can read a current status from.
pub trait StatusSnapshot {
    fn current_status(&self) -> &str;
}

impl StatusSnapshot for Lead {
    fn current_status(&self) -> &str {
        self.status.as_str()
    }
}

impl StatusSnapshot for StatusId {
    fn current_status(&self) -> &str {
        self.as_str()
    }
}

impl StatusSnapshot for str {
    fn current_status(&self) -> &str {
        self
    }
}

impl StatusSnapshot for String {
    fn current_status(&self) -> &str {
        self.as_str()
    }
}

impl<T: StatusSnapshot + ?Sized> StatusSnapshot for &T {
    fn current_status(&self) -> &str {
        (**self).current_status()
    }
}
