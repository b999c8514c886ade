use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use eyre::{Result, eyre};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{ChangeEvent, ChangeKind, Entity, Filter, Patch, Record, RecordStore, Subscription};

/// Capacity of each per-entity change channel when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// In-memory reference implementation of [`RecordStore`].
///
/// Tables live behind a lock, updates are last-write-wins, and every write
/// is published on the entity's broadcast channel. Cross-entity cascades are
/// the caller's job, as with the external store this stands in for.
pub struct MemoryStore {
    tables: RwLock<HashMap<Entity, HashMap<Uuid, Record>>>,
    channels: HashMap<Entity, broadcast::Sender<ChangeEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(event_capacity: usize) -> Self {
        let mut tables = HashMap::new();
        let mut channels = HashMap::new();
        for entity in Entity::ALL {
            tables.insert(entity, HashMap::new());
            let (sender, _) = broadcast::channel(event_capacity);
            channels.insert(entity, sender);
        }
        Self {
            tables: RwLock::new(tables),
            channels,
        }
    }

    fn publish(&self, entity: Entity, kind: ChangeKind, record: Record) {
        // send only fails when nobody is subscribed, which is fine.
        let _ = self.channels[&entity].send(ChangeEvent {
            entity,
            kind,
            record,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, entity: Entity, filter: Filter) -> Result<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| eyre!("store lock poisoned"))?;
        let mut records: Vec<Record> = tables[&entity]
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn insert(&self, entity: Entity, record: Record) -> Result<Record> {
        {
            let mut tables = self
                .tables
                .write()
                .map_err(|_| eyre!("store lock poisoned"))?;
            let table = tables.entry(entity).or_default();
            if table.contains_key(&record.id) {
                return Err(eyre!("duplicate {} id {}", entity.as_str(), record.id));
            }
            table.insert(record.id, record.clone());
        }
        tracing::debug!("Inserted {} record: id={}", entity.as_str(), record.id);
        self.publish(entity, ChangeKind::Created, record.clone());
        Ok(record)
    }

    async fn update(&self, entity: Entity, id: Uuid, patch: Patch) -> Result<()> {
        let updated = {
            let mut tables = self
                .tables
                .write()
                .map_err(|_| eyre!("store lock poisoned"))?;
            let table = tables.entry(entity).or_default();
            let record = table
                .get_mut(&id)
                .ok_or_else(|| eyre!("{} record {} not found", entity.as_str(), id))?;
            for (field, value) in patch {
                record.fields.insert(field, value);
            }
            record.clone()
        };
        tracing::debug!("Updated {} record: id={}", entity.as_str(), id);
        self.publish(entity, ChangeKind::Updated, updated);
        Ok(())
    }

    async fn delete(&self, entity: Entity, filter: Filter) -> Result<()> {
        let removed: Vec<Record> = {
            let mut tables = self
                .tables
                .write()
                .map_err(|_| eyre!("store lock poisoned"))?;
            let table = tables.entry(entity).or_default();
            let ids: Vec<Uuid> = table
                .values()
                .filter(|record| filter.matches(record))
                .map(|record| record.id)
                .collect();
            ids.iter().filter_map(|id| table.remove(id)).collect()
        };
        tracing::debug!("Deleted {} {} records", removed.len(), entity.as_str());
        for record in removed {
            self.publish(entity, ChangeKind::Deleted, record);
        }
        Ok(())
    }

    fn subscribe(&self, entity: Entity, filter: Option<Filter>) -> Subscription {
        Subscription::new(self.channels[&entity].subscribe(), filter)
    }
}
