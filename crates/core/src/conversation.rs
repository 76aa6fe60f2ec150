//! Per-session booking conversation state

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ClinicError;

/// Date format accepted for the date slot (`15-03-2025`)
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Time format accepted for the time slot (`14:30`, 24-hour)
pub const TIME_FORMAT: &str = "%H:%M";

/// Booking fields, in the order they are asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Location,
    Date,
    Time,
}

/// Slots collected so far for the booking in progress
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingAppointment {
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl PendingAppointment {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.date.is_none() && self.time.is_none()
    }
}

/// Conversation state owned by one session.
///
/// Passed into every turn and returned updated; the default value is the
/// idle state (no booking in progress, every slot empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationState {
    pub booking_in_progress: bool,
    pub pending: PendingAppointment,
}

impl ConversationState {
    /// State right after a booking was started: in progress, nothing collected
    pub fn booking_started() -> Self {
        Self {
            booking_in_progress: true,
            pending: PendingAppointment::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.booking_in_progress && self.pending.is_empty()
    }
}

/// Parse the date slot. Input is trimmed; anything but `DD-MM-YYYY` is rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate, ClinicError> {
    let trimmed = input.trim();
    // chrono's %Y takes a signed year ("+2025", "-2025"); every field must be bare digits
    let fields: Vec<&str> = trimmed.split('-').collect();
    if fields.len() != 3
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ClinicError::DateFormat(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ClinicError::DateFormat(trimmed.to_string()))
}

/// Parse the time slot. Input is trimmed; anything but 24-hour `HH:MM` is rejected.
pub fn parse_time(input: &str) -> Result<NaiveTime, ClinicError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| ClinicError::TimeFormat(trimmed.to_string()))
}
