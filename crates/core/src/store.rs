//! Collaborators the dialogue controller delegates to

use async_trait::async_trait;

use crate::appointment::{AppointmentSummary, NewAppointment};
use crate::error::ClinicError;

/// Persistent appointment storage used by the chat path
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert one booking. Errors are reported as [`ClinicError::Persistence`].
    async fn insert(&self, appointment: &NewAppointment) -> Result<(), ClinicError>;

    /// All bookings of `user`, newest date first
    async fn list_by_user(&self, user: &str) -> Result<Vec<AppointmentSummary>, ClinicError>;
}

/// Open-domain conversational model answering everything that is not a command.
///
/// Implementations keep their own conversation history; the controller only
/// passes the utterance in and reads the text back.
#[async_trait]
pub trait Responder: Send {
    async fn send(&mut self, utterance: &str) -> Result<String, ClinicError>;
}
