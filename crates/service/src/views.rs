//! The projection read path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meetsync_core::errors::MeetResult;
use meetsync_core::models::appointment::Appointment;
use meetsync_core::models::attendee::AttendeeRecord;
use meetsync_core::models::profile::Profile;
use meetsync_core::views::{
    ApprovalEntry, HistoryEntry, InvitationEntry, SentItems, history_for, invitations_for,
    requests_to_approve, sent_by,
};
use meetsync_store::RecordStore;
use meetsync_store::adapters::{AppointmentStore, AttendeeStore, ProfileStore};

/// All four projections for one user, computed from the same store
/// snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub invitations: Vec<InvitationEntry>,
    pub approvals: Vec<ApprovalEntry>,
    pub sent: SentItems,
    pub history: Vec<HistoryEntry>,
}

/// Fetches the entity sets through the typed adapters and runs the pure
/// aggregators over them.
#[derive(Clone)]
pub struct ViewService {
    appointments: AppointmentStore,
    attendees: AttendeeStore,
    profiles: ProfileStore,
}

impl ViewService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            appointments: AppointmentStore::new(store.clone()),
            attendees: AttendeeStore::new(store.clone()),
            profiles: ProfileStore::new(store),
        }
    }

    pub async fn invitations(&self, me: Uuid) -> MeetResult<Vec<InvitationEntry>> {
        let (attendees, appointments, profiles) = self.fetch_sets().await?;
        Ok(invitations_for(me, &attendees, &appointments, &profiles))
    }

    pub async fn approvals(&self, me: Uuid) -> MeetResult<Vec<ApprovalEntry>> {
        let (attendees, appointments, profiles) = self.fetch_sets().await?;
        Ok(requests_to_approve(me, &attendees, &appointments, &profiles))
    }

    pub async fn sent(&self, me: Uuid) -> MeetResult<SentItems> {
        let (attendees, appointments, profiles) = self.fetch_sets().await?;
        Ok(sent_by(me, &attendees, &appointments, &profiles))
    }

    pub async fn history(&self, me: Uuid) -> MeetResult<Vec<HistoryEntry>> {
        let (attendees, appointments, profiles) = self.fetch_sets().await?;
        Ok(history_for(me, &attendees, &appointments, &profiles))
    }

    /// All four projections from one snapshot.
    pub async fn dashboard(&self, me: Uuid) -> MeetResult<Dashboard> {
        let (attendees, appointments, profiles) = self.fetch_sets().await?;
        Ok(Dashboard {
            invitations: invitations_for(me, &attendees, &appointments, &profiles),
            approvals: requests_to_approve(me, &attendees, &appointments, &profiles),
            sent: sent_by(me, &attendees, &appointments, &profiles),
            history: history_for(me, &attendees, &appointments, &profiles),
        })
    }

    async fn fetch_sets(
        &self,
    ) -> MeetResult<(Vec<AttendeeRecord>, Vec<Appointment>, Vec<Profile>)> {
        let attendees = self.attendees.list().await?;
        let appointments = self.appointments.list().await?;
        let profiles = self.profiles.list().await?;
        Ok((attendees, appointments, profiles))
    }
}
