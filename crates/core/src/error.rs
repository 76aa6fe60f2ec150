use thiserror::Error;

/// Clinic assistant error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClinicError {
    #[error("Invalid date, expected DD-MM-YYYY: {0}")]
    DateFormat(String),

    #[error("Invalid time, expected HH:MM: {0}")]
    TimeFormat(String),

    #[error("{0}")]
    Persistence(String),

    #[error("Responder unavailable: {0}")]
    Responder(String),

    #[error("Unknown appointment status: {0}")]
    InvalidStatus(String),
}

impl ClinicError {
    /// Short machine-readable code, recorded as the `code` field of log lines
    pub fn code(&self) -> &'static str {
        match self {
            ClinicError::DateFormat(_) => "date-format",
            ClinicError::TimeFormat(_) => "time-format",
            ClinicError::Persistence(_) => "persistence",
            ClinicError::Responder(_) => "responder",
            ClinicError::InvalidStatus(_) => "invalid-status",
        }
    }
}
