use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Pending,
    Available,
    Frozen,
    Booked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "PENDING",
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Frozen => "FROZEN",
            SlotStatus::Booked => "BOOKED",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookable (practitioner, date, time) unit. `time` is an opaque label
/// such as "09:00" that sorts lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new_pending(practitioner_id: Uuid, date: NaiveDate, time: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            practitioner_id,
            date,
            time: time.into(),
            status: SlotStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn matches(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> bool {
        self.practitioner_id == practitioner_id && self.date == date && self.time == time
    }
}

/// The confirmed link between one patient and one practitioner. Its existence
/// is what grants the practitioner access to the patient's record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub patient_id: Uuid,
    /// `None` when booked against unmanaged availability.
    pub slot_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub patient_name: String,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn occupies(&self, practitioner_id: Uuid, date: NaiveDate, time: &str) -> bool {
        self.practitioner_id == practitioner_id && self.date == date && self.time == time
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub practitioner_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn accepts(&self, appointment: &Appointment) -> bool {
        self.practitioner_id.map_or(true, |id| appointment.practitioner_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.date.map_or(true, |date| appointment.date == date)
    }
}

/// Result of the atomic slot-reservation unit.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingCommit {
    Booked(Appointment),
    /// The slot was no longer AVAILABLE, or the triple is already occupied.
    Unavailable,
}
