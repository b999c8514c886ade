//! Typed per-entity wrappers over a [`RecordStore`](crate::RecordStore).
//!
//! The adapters convert between the core models and the store's JSON
//! records; they add no rules of their own. Authorization and uniqueness
//! are the participation state machine's job, one layer up.

mod appointment;
mod attendee;
mod profile;

pub use appointment::AppointmentStore;
pub use attendee::AttendeeStore;
pub use profile::ProfileStore;

use eyre::{Result, WrapErr};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Record;

fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    let value = serde_json::to_value(value).wrap_err("failed to serialize record")?;
    serde_json::from_value(value).wrap_err("record is missing an id")
}

fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    let value = serde_json::to_value(record).wrap_err("failed to serialize record")?;
    serde_json::from_value(value).wrap_err("failed to decode record")
}
