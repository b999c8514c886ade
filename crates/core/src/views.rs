//! Read-only projections over the attendee, appointment, and profile sets.
//!
//! Each aggregator is a deterministic pure function: given the same input
//! sets it yields the same output, sorted by appointment date, start time,
//! and record id. Records whose appointment is missing from the input are
//! skipped, so projections stay total while a cascade delete is still
//! propagating through the change feed. A missing profile joins as `None`.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::Appointment;
use crate::models::attendee::{AttendeeRecord, AttendeeStatus};
use crate::models::profile::Profile;
use crate::participation::is_organizer;

/// Display subset of a profile joined into a projection entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub full_name: String,
    pub avatar: Option<String>,
}

impl ProfileSummary {
    fn lookup(profiles: &HashMap<Uuid, &Profile>, id: Uuid) -> Option<Self> {
        profiles.get(&id).map(|p| ProfileSummary {
            id: p.id,
            full_name: p.full_name.clone(),
            avatar: p.avatar.clone(),
        })
    }
}

/// An invitation waiting for my answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationEntry {
    pub record_id: Uuid,
    pub appointment_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub organizer: Option<ProfileSummary>,
}

/// A join request waiting for my answer as organizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalEntry {
    pub record_id: Uuid,
    pub appointment_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub requester: Option<ProfileSummary>,
}

/// A join request I sent that is still unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentRequestEntry {
    pub record_id: Uuid,
    pub appointment_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub organizer: Option<ProfileSummary>,
}

/// An invitation I sent as organizer that is still unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentInvitationEntry {
    pub record_id: Uuid,
    pub appointment_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub invitee: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentItems {
    pub requests: Vec<SentRequestEntry>,
    pub invitations: Vec<SentInvitationEntry>,
}

/// A resolved record I was a party to, either side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub record_id: Uuid,
    pub appointment_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AttendeeStatus,
    /// Selects the display phrasing: true when I organized the appointment,
    /// false when I was the participant.
    pub i_am_organizer: bool,
    /// The other party: the participant for organizers, the organizer for
    /// participants.
    pub counterpart: Option<ProfileSummary>,
}

fn appointment_index(appointments: &[Appointment]) -> HashMap<Uuid, &Appointment> {
    appointments.iter().map(|a| (a.id, a)).collect()
}

fn profile_index(profiles: &[Profile]) -> HashMap<Uuid, &Profile> {
    profiles.iter().map(|p| (p.id, p)).collect()
}

/// Invitations-to-me: my `pending` records.
pub fn invitations_for(
    me: Uuid,
    attendees: &[AttendeeRecord],
    appointments: &[Appointment],
    profiles: &[Profile],
) -> Vec<InvitationEntry> {
    let appts = appointment_index(appointments);
    let profs = profile_index(profiles);
    let mut entries: Vec<InvitationEntry> = attendees
        .iter()
        .filter(|r| r.user_id == me && r.status == AttendeeStatus::Pending)
        .filter_map(|r| {
            let appt = appts.get(&r.appointment_id)?;
            Some(InvitationEntry {
                record_id: r.id,
                appointment_id: appt.id,
                title: appt.title.clone(),
                date: appt.date,
                start_time: appt.start_time,
                organizer: ProfileSummary::lookup(&profs, appt.created_by),
            })
        })
        .collect();
    entries.sort_by_key(|e| (e.date, e.start_time, e.record_id));
    entries
}

/// Requests-to-approve: `requested` records on appointments I organize.
pub fn requests_to_approve(
    me: Uuid,
    attendees: &[AttendeeRecord],
    appointments: &[Appointment],
    profiles: &[Profile],
) -> Vec<ApprovalEntry> {
    let appts = appointment_index(appointments);
    let profs = profile_index(profiles);
    let mut entries: Vec<ApprovalEntry> = attendees
        .iter()
        .filter(|r| r.status == AttendeeStatus::Requested)
        .filter_map(|r| {
            let appt = appts.get(&r.appointment_id)?;
            if !is_organizer(appt, me) {
                return None;
            }
            Some(ApprovalEntry {
                record_id: r.id,
                appointment_id: appt.id,
                title: appt.title.clone(),
                date: appt.date,
                start_time: appt.start_time,
                requester: ProfileSummary::lookup(&profs, r.user_id),
            })
        })
        .collect();
    entries.sort_by_key(|e| (e.date, e.start_time, e.record_id));
    entries
}

/// Sent-by-me: my outgoing join requests plus the unanswered invitations on
/// appointments I organize.
pub fn sent_by(
    me: Uuid,
    attendees: &[AttendeeRecord],
    appointments: &[Appointment],
    profiles: &[Profile],
) -> SentItems {
    let appts = appointment_index(appointments);
    let profs = profile_index(profiles);

    let mut requests: Vec<SentRequestEntry> = attendees
        .iter()
        .filter(|r| r.user_id == me && r.status == AttendeeStatus::Requested)
        .filter_map(|r| {
            let appt = appts.get(&r.appointment_id)?;
            Some(SentRequestEntry {
                record_id: r.id,
                appointment_id: appt.id,
                title: appt.title.clone(),
                date: appt.date,
                start_time: appt.start_time,
                organizer: ProfileSummary::lookup(&profs, appt.created_by),
            })
        })
        .collect();
    requests.sort_by_key(|e| (e.date, e.start_time, e.record_id));

    let mut invitations: Vec<SentInvitationEntry> = attendees
        .iter()
        .filter(|r| r.status == AttendeeStatus::Pending)
        .filter_map(|r| {
            let appt = appts.get(&r.appointment_id)?;
            if !is_organizer(appt, me) {
                return None;
            }
            Some(SentInvitationEntry {
                record_id: r.id,
                appointment_id: appt.id,
                title: appt.title.clone(),
                date: appt.date,
                start_time: appt.start_time,
                invitee: ProfileSummary::lookup(&profs, r.user_id),
            })
        })
        .collect();
    invitations.sort_by_key(|e| (e.date, e.start_time, e.record_id));

    SentItems {
        requests,
        invitations,
    }
}

/// History: resolved records where I was the participant or the organizer.
pub fn history_for(
    me: Uuid,
    attendees: &[AttendeeRecord],
    appointments: &[Appointment],
    profiles: &[Profile],
) -> Vec<HistoryEntry> {
    let appts = appointment_index(appointments);
    let profs = profile_index(profiles);
    let mut entries: Vec<HistoryEntry> = attendees
        .iter()
        .filter(|r| r.status.is_resolved())
        .filter_map(|r| {
            let appt = appts.get(&r.appointment_id)?;
            let i_am_organizer = is_organizer(appt, me);
            if !i_am_organizer && r.user_id != me {
                return None;
            }
            let counterpart = if i_am_organizer {
                ProfileSummary::lookup(&profs, r.user_id)
            } else {
                ProfileSummary::lookup(&profs, appt.created_by)
            };
            Some(HistoryEntry {
                record_id: r.id,
                appointment_id: appt.id,
                title: appt.title.clone(),
                date: appt.date,
                start_time: appt.start_time,
                status: r.status,
                i_am_organizer,
                counterpart,
            })
        })
        .collect();
    entries.sort_by_key(|e| (e.date, e.start_time, e.record_id));
    entries
}
