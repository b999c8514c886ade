//! # Meetsync Service
//!
//! The consuming layer of the meetsync scheduling core.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture over `meetsync-core` and
//! `meetsync-store`:
//!
//! - **Participation**: the validated write path; every mutation is planned
//!   by the pure state machine before it reaches the store
//! - **Views**: the projection read path building the four user-facing
//!   projections from one store snapshot
//! - **Bridge**: the live synchronization bridge re-running the projections
//!   on store change events
//! - **Config**: environment-driven configuration
//!
//! All store operations are asynchronous, non-blocking calls; the crate
//! adds no locks or version checks of its own and relies on the store's
//! last-write-wins update semantics.

/// Live synchronization bridge
pub mod bridge;
/// Environment and application configuration
pub mod config;
/// The validated write path
pub mod participation;
/// The projection read path
pub mod views;

use eyre::Result;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global fmt subscriber at the given level. Call once at
/// startup; embedding applications that bring their own subscriber skip
/// this.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
