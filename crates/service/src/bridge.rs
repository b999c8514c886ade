//! Live synchronization bridge.
//!
//! One store subscription per entity, fanned out to the consuming
//! projections: every observed change re-runs the aggregation in full and
//! publishes the fresh dashboard. No incremental patching.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use meetsync_core::errors::MeetResult;
use meetsync_store::{Entity, RecordStore};

use crate::views::{Dashboard, ViewService};

pub struct SyncBridge {
    store: Arc<dyn RecordStore>,
    views: ViewService,
}

impl SyncBridge {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            views: ViewService::new(store.clone()),
            store,
        }
    }

    /// Computes the initial dashboard for `me` and spawns the refresh task
    /// listening on the appointment and attendee change feeds.
    pub async fn open_dashboard(&self, me: Uuid) -> MeetResult<LiveDashboard> {
        let initial = self.views.dashboard(me).await?;
        let (sender, receiver) = watch::channel(initial);

        let mut appointments = self.store.subscribe(Entity::Appointment, None);
        let mut attendees = self.store.subscribe(Entity::Attendee, None);
        let views = self.views.clone();

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    event = appointments.next() => event,
                    event = attendees.next() => event,
                };
                let Some(event) = event else {
                    break;
                };
                tracing::debug!(
                    "Change event on {}: recomputing dashboard",
                    event.entity.as_str()
                );
                match views.dashboard(me).await {
                    Ok(dashboard) => {
                        if sender.send(dashboard).is_err() {
                            // Every consumer handle is gone.
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!("Dashboard recompute failed: {}", error);
                    }
                }
            }
        });

        Ok(LiveDashboard {
            receiver,
            task: Some(task),
        })
    }
}

/// A live view of one user's dashboard.
///
/// Holding the handle keeps the store subscriptions alive; [`close`] (or
/// dropping the handle) tears the refresh task down and releases them.
/// Writes still in flight at teardown apply to the store regardless; they
/// are simply no longer observed here.
///
/// [`close`]: LiveDashboard::close
pub struct LiveDashboard {
    receiver: watch::Receiver<Dashboard>,
    task: Option<JoinHandle<()>>,
}

impl LiveDashboard {
    /// The most recently published dashboard.
    pub fn latest(&self) -> Dashboard {
        self.receiver.borrow().clone()
    }

    /// Waits until a newer dashboard has been published. Returns `false`
    /// once the refresh task has stopped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Stops the refresh task and releases the store subscriptions.
    pub async fn close(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for LiveDashboard {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
