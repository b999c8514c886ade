//! Participation state machine for appointments.
//!
//! Every attendee-facing operation is planned here as a pure function of the
//! appointment, the acting identity, and the existing attendee record for
//! the target user. The returned plan names the store effect to execute;
//! illegal actions come back as typed errors before any store call is made.
//!
//! At most one attendee record exists per (appointment, user) pair, and the
//! organizer never holds a record at all: organizer status is derived from
//! `appointment.created_by` through [`is_organizer`].

use std::collections::HashSet;

use uuid::Uuid;

use crate::errors::{MeetError, MeetResult};
use crate::models::appointment::Appointment;
use crate::models::attendee::{AttendeeRecord, AttendeeStatus};
use crate::models::user::CurrentUser;

/// Derived participation state for one (appointment, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    Organizer,
    None,
    Invited,
    Requested,
    Member,
    Declined,
}

/// The one organizer predicate used everywhere authorization is checked.
pub fn is_organizer(appointment: &Appointment, user_id: Uuid) -> bool {
    appointment.created_by == user_id
}

/// Whether the actor carries organizer authority on this appointment.
/// Administrators act with organizer authority on organizer-side operations.
pub fn can_manage(appointment: &Appointment, actor: &CurrentUser) -> bool {
    actor.admin || is_organizer(appointment, actor.id)
}

pub fn participation_of(
    appointment: &Appointment,
    user_id: Uuid,
    record: Option<&AttendeeRecord>,
) -> Participation {
    if is_organizer(appointment, user_id) {
        return Participation::Organizer;
    }
    match record.map(|r| r.status) {
        Option::None => Participation::None,
        Some(AttendeeStatus::Pending) => Participation::Invited,
        Some(AttendeeStatus::Requested) => Participation::Requested,
        Some(AttendeeStatus::Accepted) => Participation::Member,
        Some(AttendeeStatus::Declined) => Participation::Declined,
    }
}

/// Store effect planned for an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitePlan {
    /// No record exists; create one in `pending`.
    Create,
    /// A declined record exists; reset it to `pending` in place.
    Reinstate(Uuid),
}

pub fn plan_invite(
    appointment: &Appointment,
    actor: &CurrentUser,
    invitee: Uuid,
    existing: Option<&AttendeeRecord>,
) -> MeetResult<InvitePlan> {
    if !can_manage(appointment, actor) {
        return Err(MeetError::UnauthorizedTransition(
            "only the organizer may invite attendees".to_string(),
        ));
    }
    if is_organizer(appointment, invitee) {
        return Err(MeetError::Validation(
            "the organizer cannot be an attendee".to_string(),
        ));
    }
    match existing {
        None => Ok(InvitePlan::Create),
        Some(record) if record.status == AttendeeStatus::Declined => {
            Ok(InvitePlan::Reinstate(record.id))
        }
        Some(record) => Err(MeetError::DuplicateParticipation(format!(
            "user {} already has a {} record for this appointment",
            invitee,
            record.status.as_str()
        ))),
    }
}

/// Plans a join request by a non-invited user. Succeeding means the service
/// may create a `requested` record for the actor.
pub fn plan_join_request(
    appointment: &Appointment,
    actor: &CurrentUser,
    existing: Option<&AttendeeRecord>,
) -> MeetResult<()> {
    if is_organizer(appointment, actor.id) {
        return Err(MeetError::UnauthorizedTransition(
            "the organizer cannot request to join their own appointment".to_string(),
        ));
    }
    if let Some(record) = existing {
        return Err(MeetError::DuplicateParticipation(format!(
            "user {} already has a {} record for this appointment",
            actor.id,
            record.status.as_str()
        )));
    }
    if appointment.organizer_only {
        return Err(MeetError::UnauthorizedTransition(
            "appointment is restricted to invited attendees".to_string(),
        ));
    }
    Ok(())
}

/// Store effect planned for resolving a record to accepted or declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPlan {
    Apply(AttendeeStatus),
    /// The record already carries this resolution; nothing to write.
    AlreadyApplied,
}

/// Plans a resolution. A `pending` record is answered by the invited user; a
/// `requested` record is answered by the organizer. Re-applying the
/// resolution a record already carries is a no-op, so concurrent duplicate
/// answers resolved by last-write-wins stay harmless.
pub fn plan_resolution(
    appointment: &Appointment,
    record: &AttendeeRecord,
    actor: &CurrentUser,
    resolution: AttendeeStatus,
) -> MeetResult<ResolutionPlan> {
    if !resolution.is_resolved() {
        return Err(MeetError::Validation(
            "a record can only be resolved to accepted or declined".to_string(),
        ));
    }
    match record.status {
        AttendeeStatus::Pending => {
            if actor.id != record.user_id {
                return Err(MeetError::UnauthorizedTransition(
                    "only the invited user may answer an invitation".to_string(),
                ));
            }
            Ok(ResolutionPlan::Apply(resolution))
        }
        AttendeeStatus::Requested => {
            if !can_manage(appointment, actor) {
                return Err(MeetError::UnauthorizedTransition(
                    "only the organizer may resolve a join request".to_string(),
                ));
            }
            Ok(ResolutionPlan::Apply(resolution))
        }
        status if status == resolution => {
            if actor.id == record.user_id || can_manage(appointment, actor) {
                Ok(ResolutionPlan::AlreadyApplied)
            } else {
                Err(MeetError::UnauthorizedTransition(
                    "actor is not a party to this record".to_string(),
                ))
            }
        }
        status => Err(MeetError::UnauthorizedTransition(format!(
            "record is already {}",
            status.as_str()
        ))),
    }
}

/// Plans withdrawal of an unresolved record by its creator: the organizer
/// for invitations, the requesting user for join requests.
pub fn plan_withdrawal(
    appointment: &Appointment,
    record: &AttendeeRecord,
    actor: &CurrentUser,
) -> MeetResult<()> {
    match record.status {
        AttendeeStatus::Pending => {
            if !can_manage(appointment, actor) {
                return Err(MeetError::UnauthorizedTransition(
                    "only the organizer may withdraw an invitation".to_string(),
                ));
            }
            Ok(())
        }
        AttendeeStatus::Requested => {
            if actor.id != record.user_id {
                return Err(MeetError::UnauthorizedTransition(
                    "only the requesting user may withdraw a join request".to_string(),
                ));
            }
            Ok(())
        }
        status => Err(MeetError::UnauthorizedTransition(format!(
            "a {} record can no longer be withdrawn",
            status.as_str()
        ))),
    }
}

/// Difference between the organizer's new selection and the stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeDiff {
    /// User ids to insert as new `pending` records.
    pub to_invite: Vec<Uuid>,
    /// Record ids to delete.
    pub to_remove: Vec<Uuid>,
}

impl AttendeeDiff {
    pub fn is_empty(&self) -> bool {
        self.to_invite.is_empty() && self.to_remove.is_empty()
    }
}

/// Plans a bulk edit of the attendee list. Ids present in both the selection
/// and the stored records are untouched, so their status survives the edit;
/// submitting the same selection twice plans nothing the second time. The
/// organizer's own id and duplicate ids are dropped from the selection.
pub fn diff_attendees(
    appointment: &Appointment,
    selected: &[Uuid],
    existing: &[AttendeeRecord],
) -> AttendeeDiff {
    let selected: HashSet<Uuid> = selected
        .iter()
        .copied()
        .filter(|id| !is_organizer(appointment, *id))
        .collect();
    let current: HashSet<Uuid> = existing.iter().map(|r| r.user_id).collect();

    let mut to_invite: Vec<Uuid> = selected.difference(&current).copied().collect();
    to_invite.sort();
    let mut to_remove: Vec<Uuid> = existing
        .iter()
        .filter(|r| !selected.contains(&r.user_id))
        .map(|r| r.id)
        .collect();
    to_remove.sort();

    AttendeeDiff {
        to_invite,
        to_remove,
    }
}
