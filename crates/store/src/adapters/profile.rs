use std::sync::Arc;

use eyre::Result;
use uuid::Uuid;

use meetsync_core::models::profile::Profile;

use super::from_record;
use crate::{Entity, Filter, RecordStore};

/// Read-only access to the `profile` entity. Profiles are owned by the
/// identity layer and never written by this core.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<dyn RecordStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Profile>> {
        let records = self
            .store
            .find(Entity::Profile, Filter::new().eq("id", id.to_string()))
            .await?;
        records.into_iter().next().map(from_record).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Profile>> {
        let records = self.store.find(Entity::Profile, Filter::new()).await?;
        records.into_iter().map(from_record).collect()
    }
}
