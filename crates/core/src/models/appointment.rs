use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{MeetError, MeetResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub created_by: Uuid,
    #[serde(flatten)]
    pub location: Location,
    pub organizer_only: bool,
}

/// Where an appointment takes place: a registered place or free text.
/// Serializes as a flat `location_id` or `location_text` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Place { location_id: Uuid },
    Text { location_text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub location: Location,
    #[serde(default)]
    pub organizer_only: bool,
    #[serde(default)]
    pub invitees: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub organizer_only: Option<bool>,
    pub attendees: Option<Vec<Uuid>>,
}

/// Resolves the stored (start, end) pair from what the caller supplied.
/// A missing end time falls back to one hour after the start, wrapping past
/// midnight.
pub fn resolve_times(
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
) -> MeetResult<(NaiveTime, NaiveTime)> {
    let start = match (start_time, end_time) {
        (Some(start), _) => start,
        (None, None) => return Err(MeetError::Validation("end time required".to_string())),
        (None, Some(_)) => return Err(MeetError::Validation("start time required".to_string())),
    };
    let end = end_time.unwrap_or_else(|| start + Duration::hours(1));
    Ok((start, end))
}
