use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;

use crate::{Entity, Filter, Patch, Record, RecordStore, Subscription};

// Mock store for testing the service layer against store failures.
mock! {
    pub Store {}

    #[async_trait]
    impl RecordStore for Store {
        async fn find(&self, entity: Entity, filter: Filter) -> eyre::Result<Vec<Record>>;

        async fn insert(&self, entity: Entity, record: Record) -> eyre::Result<Record>;

        async fn update(&self, entity: Entity, id: Uuid, patch: Patch) -> eyre::Result<()>;

        async fn delete(&self, entity: Entity, filter: Filter) -> eyre::Result<()>;

        fn subscribe(&self, entity: Entity, filter: Option<Filter>) -> Subscription;
    }
}
