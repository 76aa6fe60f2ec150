//! Appointment records as stored and listed

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ClinicError;

/// Triage status of an appointment, set from the doctor dashboard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl AppointmentStatus {
    /// Map a dashboard action (`approve`, `reject`, `pending`, `complete`) to a status
    pub fn from_action(action: &str) -> Result<Self, ClinicError> {
        match action {
            "approve" => Ok(Self::Approved),
            "reject" => Ok(Self::Rejected),
            "pending" => Ok(Self::Pending),
            "complete" => Ok(Self::Completed),
            other => Err(ClinicError::InvalidStatus(other.to_string())),
        }
    }

    /// Value stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            "Completed" => Ok(Self::Completed),
            other => Err(ClinicError::InvalidStatus(other.to_string())),
        }
    }
}

/// Booking produced by a completed chat conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAppointment {
    pub user: String,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// One line of a patient's appointment listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentSummary {
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl fmt::Display for AppointmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Location: {}, Date: {}, Time: {}",
            self.location, self.date, self.time
        )
    }
}

/// Appointment as seen on the doctor dashboard, joined with patient identifiers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    pub id: i32,
    pub username: String,
    pub bruhims: Option<String>,
    pub ic: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
}
