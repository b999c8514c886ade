//! # Meetsync Store
//!
//! The record-store abstraction the scheduling core is written against.
//!
//! The external data store is schemaless from the core's point of view: it
//! holds records (an id plus a JSON field map) in named entities, answers
//! equality-filtered reads, and publishes a change event for every write.
//! [`RecordStore`] captures that contract; [`memory::MemoryStore`] is the
//! in-repo reference implementation backing tests and embeddings without an
//! external store; the [`adapters`] module layers typed per-entity
//! operations on top.

/// Typed per-entity wrappers over a [`RecordStore`]
pub mod adapters;
/// In-memory reference store
pub mod memory;
/// Mock store for tests
pub mod mock;

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// The entities this core reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Appointment,
    Attendee,
    /// Read-only join source owned by the identity layer.
    Profile,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Appointment, Entity::Attendee, Entity::Profile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Appointment => "appointment",
            Entity::Attendee => "attendee",
            Entity::Profile => "profile",
        }
    }
}

/// A record as the external store sees it: an id plus a JSON field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Field map merged into a record's fields on update.
pub type Patch = serde_json::Map<String, Value>;

/// A conjunction of field-equality tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|(field, value)| {
            if field == "id" {
                value.as_str() == Some(record.id.to_string().as_str())
            } else {
                record.fields.get(field) == Some(value)
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One write observed on an entity's change feed.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub entity: Entity,
    pub kind: ChangeKind,
    /// Snapshot of the record at the time of the change; the last stored
    /// state for deletions.
    pub record: Record,
}

/// A live handle on an entity's change feed.
///
/// Dropping the subscription releases the store-side listener; holders tear
/// it down by letting it go out of scope when the consuming view does.
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    filter: Option<Filter>,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<ChangeEvent>, filter: Option<Filter>) -> Self {
        Self { receiver, filter }
    }

    /// The next matching change event, or `None` once the store side has
    /// closed the feed. A lagged subscriber skips to the oldest event still
    /// buffered.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    let matches = self
                        .filter
                        .as_ref()
                        .is_none_or(|filter| filter.matches(&event.record));
                    if matches {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!("change feed lagged, skipped {} events", missed);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The store contract consumed by the scheduling core.
///
/// Single-entity writes are atomic; there are no cross-entity transactions
/// and no cascades. Updates are last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, entity: Entity, filter: Filter) -> Result<Vec<Record>>;

    /// Inserts a record. Fails when the id is already present.
    async fn insert(&self, entity: Entity, record: Record) -> Result<Record>;

    /// Merges the patch into the record's fields. Fails when the id is
    /// absent.
    async fn update(&self, entity: Entity, id: Uuid, patch: Patch) -> Result<()>;

    /// Deletes every record matching the filter. Deleting nothing is not an
    /// error.
    async fn delete(&self, entity: Entity, filter: Filter) -> Result<()>;

    /// Opens a change feed on the entity, optionally narrowed by a filter
    /// over the changed record's fields.
    fn subscribe(&self, entity: Entity, filter: Option<Filter>) -> Subscription;
}
