use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an attendee record sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeStatus {
    /// Invited by the organizer, not yet answered.
    Pending,
    Accepted,
    Declined,
    /// Asked to join, awaiting the organizer's answer.
    Requested,
}

impl AttendeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendeeStatus::Pending => "pending",
            AttendeeStatus::Accepted => "accepted",
            AttendeeStatus::Declined => "declined",
            AttendeeStatus::Requested => "requested",
        }
    }

    /// A record is resolved once the invitation or request has been answered.
    pub fn is_resolved(&self) -> bool {
        matches!(self, AttendeeStatus::Accepted | AttendeeStatus::Declined)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub user_id: Uuid,
    pub status: AttendeeStatus,
}
