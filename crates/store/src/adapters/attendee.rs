use std::sync::Arc;

use eyre::Result;
use serde_json::Value;
use uuid::Uuid;

use meetsync_core::models::attendee::{AttendeeRecord, AttendeeStatus};

use super::{from_record, to_record};
use crate::{Entity, Filter, Patch, RecordStore};

/// Typed operations on the `attendee` entity.
#[derive(Clone)]
pub struct AttendeeStore {
    store: Arc<dyn RecordStore>,
}

impl AttendeeStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
        status: AttendeeStatus,
    ) -> Result<AttendeeRecord> {
        let record = AttendeeRecord {
            id: Uuid::new_v4(),
            appointment_id,
            user_id,
            status,
        };
        tracing::debug!(
            "Creating attendee record: id={}, appointment_id={}, user_id={}, status={}",
            record.id,
            appointment_id,
            user_id,
            status.as_str()
        );
        let stored = self.store.insert(Entity::Attendee, to_record(&record)?).await?;
        from_record(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<AttendeeRecord>> {
        let records = self
            .store
            .find(Entity::Attendee, Filter::new().eq("id", id.to_string()))
            .await?;
        records.into_iter().next().map(from_record).transpose()
    }

    pub async fn list(&self) -> Result<Vec<AttendeeRecord>> {
        let records = self.store.find(Entity::Attendee, Filter::new()).await?;
        records.into_iter().map(from_record).collect()
    }

    pub async fn find_for_appointment(&self, appointment_id: Uuid) -> Result<Vec<AttendeeRecord>> {
        let filter = Filter::new().eq("appointment_id", appointment_id.to_string());
        let records = self.store.find(Entity::Attendee, filter).await?;
        records.into_iter().map(from_record).collect()
    }

    /// The at-most-one record for a (appointment, user) pair.
    pub async fn find_record(
        &self,
        appointment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AttendeeRecord>> {
        let filter = Filter::new()
            .eq("appointment_id", appointment_id.to_string())
            .eq("user_id", user_id.to_string());
        let records = self.store.find(Entity::Attendee, filter).await?;
        records.into_iter().next().map(from_record).transpose()
    }

    pub async fn set_status(&self, id: Uuid, status: AttendeeStatus) -> Result<()> {
        tracing::debug!(
            "Updating attendee record: id={}, status={}",
            id,
            status.as_str()
        );
        let mut patch = Patch::new();
        patch.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );
        self.store.update(Entity::Attendee, id, patch).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        tracing::debug!("Deleting attendee record: id={}", id);
        self.store
            .delete(Entity::Attendee, Filter::new().eq("id", id.to_string()))
            .await
    }

    /// Cascade helper: removes every record of one appointment.
    pub async fn remove_for_appointment(&self, appointment_id: Uuid) -> Result<()> {
        tracing::debug!(
            "Deleting attendee records for appointment: appointment_id={}",
            appointment_id
        );
        let filter = Filter::new().eq("appointment_id", appointment_id.to_string());
        self.store.delete(Entity::Attendee, filter).await
    }
}
