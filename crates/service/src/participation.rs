//! The validated write path.
//!
//! Every operation loads the state the participation machine needs, asks it
//! for a plan, and executes the plan through the typed adapters. A rejected
//! plan returns the typed error before any store write happens.

use std::sync::Arc;

use uuid::Uuid;

use meetsync_core::errors::{MeetError, MeetResult};
use meetsync_core::models::appointment::{
    Appointment, CreateAppointmentRequest, UpdateAppointmentRequest, resolve_times,
};
use meetsync_core::models::attendee::{AttendeeRecord, AttendeeStatus};
use meetsync_core::models::user::CurrentUser;
use meetsync_core::participation::{
    InvitePlan, Participation, ResolutionPlan, can_manage, diff_attendees, participation_of,
    plan_invite, plan_join_request, plan_resolution, plan_withdrawal,
};
use meetsync_store::RecordStore;
use meetsync_store::adapters::{AppointmentStore, AttendeeStore};

pub struct ParticipationService {
    appointments: AppointmentStore,
    attendees: AttendeeStore,
}

impl ParticipationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            appointments: AppointmentStore::new(store.clone()),
            attendees: AttendeeStore::new(store),
        }
    }

    async fn load_appointment(&self, id: Uuid) -> MeetResult<Appointment> {
        self.appointments
            .get(id)
            .await?
            .ok_or_else(|| MeetError::NotFound(format!("Appointment with ID {} not found", id)))
    }

    async fn load_record(&self, id: Uuid) -> MeetResult<AttendeeRecord> {
        self.attendees
            .get(id)
            .await?
            .ok_or_else(|| MeetError::NotFound(format!("Attendee record with ID {} not found", id)))
    }

    /// Creates an appointment with the actor as organizer and a `pending`
    /// record per distinct invitee.
    pub async fn create_appointment(
        &self,
        actor: &CurrentUser,
        request: CreateAppointmentRequest,
    ) -> MeetResult<Appointment> {
        if request.title.trim().is_empty() {
            return Err(MeetError::Validation("title required".to_string()));
        }
        let (start_time, end_time) = resolve_times(request.start_time, request.end_time)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            title: request.title,
            date: request.date,
            start_time,
            end_time,
            kind: request.kind,
            description: request.description,
            created_by: actor.id,
            location: request.location,
            organizer_only: request.organizer_only,
        };
        let appointment = self.appointments.insert(&appointment).await?;
        tracing::info!(
            "Appointment created: id={}, organizer={}",
            appointment.id,
            actor.id
        );

        // The diff against an empty record set dedups the invitee list and
        // drops the organizer.
        let diff = diff_attendees(&appointment, &request.invitees, &[]);
        for user_id in diff.to_invite {
            self.attendees
                .create(appointment.id, user_id, AttendeeStatus::Pending)
                .await?;
        }

        Ok(appointment)
    }

    /// Applies field changes, re-deriving the end time when only a start is
    /// supplied, and reconciles the attendee list when the request carries
    /// a selection.
    pub async fn update_appointment(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> MeetResult<Appointment> {
        let mut appointment = self.load_appointment(id).await?;
        if !can_manage(&appointment, actor) {
            return Err(MeetError::UnauthorizedTransition(
                "only the organizer may edit an appointment".to_string(),
            ));
        }

        if let Some(title) = request.title {
            if title.trim().is_empty() {
                return Err(MeetError::Validation("title required".to_string()));
            }
            appointment.title = title;
        }
        if let Some(date) = request.date {
            appointment.date = date;
        }
        if request.start_time.is_some() || request.end_time.is_some() {
            let start = request.start_time.unwrap_or(appointment.start_time);
            let (start_time, end_time) = resolve_times(Some(start), request.end_time)?;
            appointment.start_time = start_time;
            appointment.end_time = end_time;
        }
        if let Some(kind) = request.kind {
            appointment.kind = kind;
        }
        if let Some(description) = request.description {
            appointment.description = description;
        }
        if let Some(location) = request.location {
            appointment.location = location;
        }
        if let Some(organizer_only) = request.organizer_only {
            appointment.organizer_only = organizer_only;
        }

        self.appointments.save(&appointment).await?;

        if let Some(selection) = request.attendees {
            self.reconcile_attendees(&appointment, &selection).await?;
        }

        Ok(appointment)
    }

    /// Deletes an appointment. Attendee cleanup is issued first; the store
    /// has no cascades of its own.
    pub async fn delete_appointment(&self, actor: &CurrentUser, id: Uuid) -> MeetResult<()> {
        let appointment = self.load_appointment(id).await?;
        if !can_manage(&appointment, actor) {
            return Err(MeetError::UnauthorizedTransition(
                "only the organizer may delete an appointment".to_string(),
            ));
        }
        self.attendees.remove_for_appointment(id).await?;
        self.appointments.remove(id).await?;
        tracing::info!("Appointment deleted: id={}", id);
        Ok(())
    }

    /// Bulk edit of the attendee list: new ids are invited as `pending`,
    /// deselected records are deleted, ids in both sets keep their status.
    pub async fn set_attendees(
        &self,
        actor: &CurrentUser,
        appointment_id: Uuid,
        user_ids: &[Uuid],
    ) -> MeetResult<()> {
        let appointment = self.load_appointment(appointment_id).await?;
        if !can_manage(&appointment, actor) {
            return Err(MeetError::UnauthorizedTransition(
                "only the organizer may edit the attendee list".to_string(),
            ));
        }
        self.reconcile_attendees(&appointment, user_ids).await
    }

    async fn reconcile_attendees(
        &self,
        appointment: &Appointment,
        selection: &[Uuid],
    ) -> MeetResult<()> {
        let existing = self.attendees.find_for_appointment(appointment.id).await?;
        let diff = diff_attendees(appointment, selection, &existing);
        if diff.is_empty() {
            return Ok(());
        }
        tracing::info!(
            "Reconciling attendees: appointment_id={}, inviting={}, removing={}",
            appointment.id,
            diff.to_invite.len(),
            diff.to_remove.len()
        );
        for user_id in diff.to_invite {
            self.attendees
                .create(appointment.id, user_id, AttendeeStatus::Pending)
                .await?;
        }
        for record_id in diff.to_remove {
            self.attendees.remove(record_id).await?;
        }
        Ok(())
    }

    /// Invites a user, creating a `pending` record or reinstating a
    /// `declined` one in place.
    pub async fn invite(
        &self,
        actor: &CurrentUser,
        appointment_id: Uuid,
        user_id: Uuid,
    ) -> MeetResult<AttendeeRecord> {
        let appointment = self.load_appointment(appointment_id).await?;
        let existing = self.attendees.find_record(appointment_id, user_id).await?;
        match plan_invite(&appointment, actor, user_id, existing.as_ref())? {
            InvitePlan::Create => {
                let record = self
                    .attendees
                    .create(appointment_id, user_id, AttendeeStatus::Pending)
                    .await?;
                Ok(record)
            }
            InvitePlan::Reinstate(record_id) => {
                self.attendees
                    .set_status(record_id, AttendeeStatus::Pending)
                    .await?;
                self.load_record(record_id).await
            }
        }
    }

    /// A non-invited user asks to join an open appointment.
    pub async fn request_to_join(
        &self,
        actor: &CurrentUser,
        appointment_id: Uuid,
    ) -> MeetResult<AttendeeRecord> {
        let appointment = self.load_appointment(appointment_id).await?;
        let existing = self.attendees.find_record(appointment_id, actor.id).await?;
        plan_join_request(&appointment, actor, existing.as_ref())?;
        let record = self
            .attendees
            .create(appointment_id, actor.id, AttendeeStatus::Requested)
            .await?;
        Ok(record)
    }

    /// The invited user accepts their `pending` invitation.
    pub async fn accept_invitation(&self, actor: &CurrentUser, record_id: Uuid) -> MeetResult<()> {
        self.resolve(actor, record_id, AttendeeStatus::Accepted).await
    }

    /// The invited user declines their `pending` invitation.
    pub async fn decline_invitation(&self, actor: &CurrentUser, record_id: Uuid) -> MeetResult<()> {
        self.resolve(actor, record_id, AttendeeStatus::Declined).await
    }

    /// The organizer approves a `requested` record.
    pub async fn approve_request(&self, actor: &CurrentUser, record_id: Uuid) -> MeetResult<()> {
        self.resolve(actor, record_id, AttendeeStatus::Accepted).await
    }

    /// The organizer denies a `requested` record.
    pub async fn deny_request(&self, actor: &CurrentUser, record_id: Uuid) -> MeetResult<()> {
        self.resolve(actor, record_id, AttendeeStatus::Declined).await
    }

    async fn resolve(
        &self,
        actor: &CurrentUser,
        record_id: Uuid,
        resolution: AttendeeStatus,
    ) -> MeetResult<()> {
        let record = self.load_record(record_id).await?;
        let appointment = self.load_appointment(record.appointment_id).await?;
        match plan_resolution(&appointment, &record, actor, resolution)? {
            ResolutionPlan::Apply(status) => {
                self.attendees.set_status(record.id, status).await?;
                tracing::info!(
                    "Attendee record resolved: id={}, status={}",
                    record.id,
                    status.as_str()
                );
                Ok(())
            }
            ResolutionPlan::AlreadyApplied => Ok(()),
        }
    }

    /// The creator withdraws an unresolved invitation or request.
    pub async fn withdraw(&self, actor: &CurrentUser, record_id: Uuid) -> MeetResult<()> {
        let record = self.load_record(record_id).await?;
        let appointment = self.load_appointment(record.appointment_id).await?;
        plan_withdrawal(&appointment, &record, actor)?;
        self.attendees.remove(record.id).await?;
        tracing::info!("Attendee record withdrawn: id={}", record.id);
        Ok(())
    }

    /// Derived participation state for one (appointment, user) pair.
    pub async fn participation(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
    ) -> MeetResult<Participation> {
        let appointment = self.load_appointment(appointment_id).await?;
        let record = self.attendees.find_record(appointment_id, user_id).await?;
        Ok(participation_of(&appointment, user_id, record.as_ref()))
    }
}
