//! Reminder sweep results and the events handed to the notification sink.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{GroupId, UserId};

/// A member who has not logged a run on the sweep date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonCompliantUser {
    pub id: UserId,
    /// May be empty; the transport decides how to mention such users.
    pub display_name: String,
}

/// Compliance of one group on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOutcome {
    pub all_compliant: bool,
    pub non_compliant_users: Vec<NonCompliantUser>,
}

impl ReminderOutcome {
    pub fn from_non_compliant(non_compliant_users: Vec<NonCompliantUser>) -> Self {
        Self {
            all_compliant: non_compliant_users.is_empty(),
            non_compliant_users,
        }
    }
}

/// Event delivered to the notification sink for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub group_id: GroupId,
    /// Trigger instant that produced this event (local time)
    pub fired_at: NaiveDateTime,
    #[serde(flatten)]
    pub outcome: ReminderOutcome,
}
