use std::sync::Arc;

use eyre::Result;
use uuid::Uuid;

use meetsync_core::models::appointment::Appointment;

use super::{from_record, to_record};
use crate::{Entity, Filter, RecordStore};

/// Typed operations on the `appointment` entity.
#[derive(Clone)]
pub struct AppointmentStore {
    store: Arc<dyn RecordStore>,
}

impl AppointmentStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, appointment: &Appointment) -> Result<Appointment> {
        tracing::debug!(
            "Creating appointment: id={}, title={}",
            appointment.id,
            appointment.title
        );
        let record = to_record(appointment)?;
        let stored = self.store.insert(Entity::Appointment, record).await?;
        from_record(stored)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Appointment>> {
        let records = self
            .store
            .find(Entity::Appointment, Filter::new().eq("id", id.to_string()))
            .await?;
        records.into_iter().next().map(from_record).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Appointment>> {
        let records = self.store.find(Entity::Appointment, Filter::new()).await?;
        records.into_iter().map(from_record).collect()
    }

    /// Writes the appointment's current fields over the stored record.
    pub async fn save(&self, appointment: &Appointment) -> Result<()> {
        tracing::debug!("Updating appointment: id={}", appointment.id);
        let record = to_record(appointment)?;
        self.store
            .update(Entity::Appointment, appointment.id, record.fields)
            .await
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        tracing::debug!("Deleting appointment: id={}", id);
        self.store
            .delete(Entity::Appointment, Filter::new().eq("id", id.to_string()))
            .await
    }
}
