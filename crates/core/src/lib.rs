//! clinic-core: booking dialogue and shared clinic types
//!
//! This crate holds the chat-driven booking controller, the conversation
//! state it threads between turns, and the appointment, identity and
//! medication types shared with the HTTP server.

pub mod appointment;
pub mod conversation;
pub mod dialogue;
pub mod error;
pub mod identity;
pub mod medication;
pub mod outcome;
pub mod store;

pub use appointment::{Appointment, AppointmentStatus, AppointmentSummary, NewAppointment};
pub use conversation::{ConversationState, PendingAppointment, Slot, parse_date, parse_time};
pub use dialogue::{BookingDialogue, TurnKind, TurnOutcome, cancel_current_booking};
pub use error::ClinicError;
pub use identity::{Identity, Role};
pub use medication::MedicationRecord;
pub use outcome::{IssueSeverity, IssueType, Outcome};
pub use store::{AppointmentStore, Responder};
